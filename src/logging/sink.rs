//! Sinks - console and file destinations for log records

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::Level;

use super::record::{admits, LogRecord};

/// Destination category of a sink.
///
/// Retargeting only ever touches `File` sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Console stream (stderr by default)
    Console,
    /// Append-mode file
    File,
}

/// A log destination with its own severity filter.
pub trait Sink: Send {
    /// Destination category.
    fn kind(&self) -> SinkKind;

    /// Minimum severity written by this sink.
    fn level(&self) -> Level;

    /// File path, for file sinks.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Write one formatted record.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    fn write_record(&mut self, record: &LogRecord) -> io::Result<()>;

    /// Flush and release the destination.
    ///
    /// # Errors
    ///
    /// Returns the flush error; the handle is released either way.
    fn close(self: Box<Self>) -> io::Result<()>;

    /// Whether a record at `level` passes this sink's filter.
    fn accepts(&self, level: Level) -> bool {
        admits(self.level(), level)
    }
}

/// Console sink over any writer (stderr in production).
pub struct ConsoleSink {
    writer: Box<dyn Write + Send>,
    level: Level,
}

impl ConsoleSink {
    /// Console sink writing to the process stderr.
    #[must_use]
    pub fn stderr(level: Level) -> Self {
        Self::new(Box::new(io::stderr()), level)
    }

    /// Console sink writing to an arbitrary stream.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, level: Level) -> Self {
        Self { writer, level }
    }
}

impl Sink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn level(&self) -> Level {
        self.level
    }

    fn write_record(&mut self, record: &LogRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record.format_line())?;
        self.writer.flush()
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        self.writer.flush()
    }
}

/// File sink appending to a log file, flushed after every record.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    level: Level,
}

impl FileSink {
    /// Open (or create) `path` in append mode.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened.
    pub fn open(path: impl Into<PathBuf>, level: Level) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            level,
        })
    }
}

impl Sink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn level(&self) -> Level {
        self.level
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn write_record(&mut self, record: &LogRecord) -> io::Result<()> {
        writeln!(self.writer, "{}", record.format_line())?;
        self.writer.flush()
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let file = self.writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_a.log");

        let mut first = FileSink::open(&path, Level::INFO).unwrap();
        first
            .write_record(&LogRecord::new("runlog", Level::INFO, "one"))
            .unwrap();
        Box::new(first).close().unwrap();

        let mut second = FileSink::open(&path, Level::INFO).unwrap();
        second
            .write_record(&LogRecord::new("runlog", Level::INFO, "two"))
            .unwrap();
        Box::new(second).close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("one"));
        assert!(content.contains("two"));
    }

    #[test]
    fn test_sink_filter() {
        let sink = ConsoleSink::new(Box::new(io::sink()), Level::WARN);
        assert!(sink.accepts(Level::ERROR));
        assert!(!sink.accepts(Level::INFO));
        assert_eq!(sink.kind(), SinkKind::Console);
        assert!(sink.path().is_none());
    }
}
