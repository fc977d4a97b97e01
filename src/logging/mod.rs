//! Run-scoped logging
//!
//! One shared [`LogChannel`] per process, passed explicitly to whatever needs
//! to log. It owns a console sink and a single file sink. Until a tracking run
//! exists the file is named after the process start time; once the run
//! identifier is known the file sink is retargeted to `run_<identifier>.log`.
//!
//! ```text
//! Uninitialized ──initialize──> Initialized ──retarget──> Retargeted(id) ─┐
//!       │                                                       ^          │
//!       └──────────────retarget (self-initializing)─────────────┘<─retarget┘
//! ```
//!
//! Child channels from [`LogChannel::get_named_channel`] own no sinks and
//! always write through the shared channel's current sinks.

mod channel;
mod layer;
mod record;
mod sink;

pub use channel::{
    ChannelState, LogChannel, LogChannelBuilder, NamedChannel, DEFAULT_CHANNEL_NAME,
    DEFAULT_LOG_DIR, PROPAGATED_TARGET,
};
pub use layer::ChannelLayer;
pub use record::{admits, LogRecord, LINE_TIMESTAMP_FORMAT};
pub use sink::{ConsoleSink, FileSink, Sink, SinkKind};
