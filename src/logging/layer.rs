//! `tracing` bridge - routes `tracing` events into a [`LogChannel`]

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use super::channel::{LogChannel, PROPAGATED_TARGET};

/// Layer forwarding every event to a [`LogChannel`] under the event target.
///
/// ```rust,no_run
/// use elasticnet_runlog::logging::LogChannel;
/// use tracing_subscriber::prelude::*;
///
/// let channel = LogChannel::builder("logs").build();
/// tracing_subscriber::registry().with(channel.layer()).init();
/// ```
#[derive(Debug, Clone)]
pub struct ChannelLayer {
    channel: LogChannel,
}

impl ChannelLayer {
    /// Wrap `channel`.
    #[must_use]
    pub const fn new(channel: LogChannel) -> Self {
        Self { channel }
    }
}

impl LogChannel {
    /// Build a [`ChannelLayer`] writing into this channel.
    #[must_use]
    pub fn layer(&self) -> ChannelLayer {
        ChannelLayer::new(self.clone())
    }
}

impl<S> Layer<S> for ChannelLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        // records the channel itself re-emitted
        if metadata.target() == PROPAGATED_TARGET {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.channel
            .dispatch(metadata.target(), *metadata.level(), &visitor.finish());
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields
        } else {
            format!("{} {}", self.message, self.fields)
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_layer_routes_events_into_current_file() {
        let dir = tempfile::tempdir().unwrap();
        let channel = LogChannel::builder(dir.path())
            .console(Box::new(std::io::sink()))
            .build();
        channel.initialize(tracing::Level::INFO).unwrap();
        channel.retarget("feedbeef", tracing::Level::INFO).unwrap();

        let subscriber = tracing_subscriber::registry().with(channel.layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "http_client", rows = 12, "fetched dataset");
            tracing::debug!(target: "http_client", "below threshold");
        });

        let content =
            std::fs::read_to_string(dir.path().join("run_feedbeef.log")).unwrap();
        assert!(content.contains("http_client - INFO - fetched dataset rows=12"));
        assert!(!content.contains("below threshold"));
    }

    #[test]
    fn test_propagated_records_are_not_looped_back() {
        let dir = tempfile::tempdir().unwrap();
        // uninitialized: dispatch propagates to tracing, the layer must skip it
        let channel = LogChannel::builder(dir.path())
            .console(Box::new(std::io::sink()))
            .build();

        let subscriber = tracing_subscriber::registry().with(channel.layer());
        tracing::subscriber::with_default(subscriber, || {
            channel.info("before initialization");
        });

        assert_eq!(channel.file_sink_count(), 0);
    }
}
