//! Log Record - one formatted line as written by every sink

use chrono::{DateTime, Local};
use tracing::Level;

/// Timestamp layout used inside log lines.
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Returns `true` if a record at `level` passes a `threshold` filter.
///
/// `tracing::Level` orders more verbose levels as greater
/// (`TRACE > DEBUG > INFO > WARN > ERROR`).
#[must_use]
pub fn admits(threshold: Level, level: Level) -> bool {
    level <= threshold
}

/// A single log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    timestamp: DateTime<Local>,
    channel: String,
    level: Level,
    message: String,
}

impl LogRecord {
    /// Create a record stamped with the current local time.
    #[must_use]
    pub fn new(channel: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            channel: channel.into(),
            level,
            message: message.into(),
        }
    }

    /// Override the timestamp (useful for deterministic formatting tests).
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Get the record timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Get the emitting channel name.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Get the severity.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Get the message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Render as `<timestamp> - <channel> - <LEVEL> - <message>`.
    #[must_use]
    pub fn format_line(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.timestamp.format(LINE_TIMESTAMP_FORMAT),
            self.channel,
            self.level,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let record = LogRecord::new("runlog.model", Level::INFO, "fitted").with_timestamp(ts);
        assert_eq!(
            record.format_line(),
            "2024-03-09 14:05:07 - runlog.model - INFO - fitted"
        );
    }

    #[test]
    fn test_admits_threshold() {
        assert!(admits(Level::INFO, Level::ERROR));
        assert!(admits(Level::INFO, Level::INFO));
        assert!(!admits(Level::INFO, Level::DEBUG));
        assert!(admits(Level::TRACE, Level::DEBUG));
    }
}
