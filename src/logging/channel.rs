//! Log Channel - the shared logging context with a replaceable file sink

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use tracing::Level;

use super::record::{admits, LogRecord};
use super::sink::{ConsoleSink, FileSink, Sink, SinkKind};
use crate::{Error, Result};

/// Default name of the shared channel.
pub const DEFAULT_CHANNEL_NAME: &str = "runlog";

/// Default directory for log files.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// `tracing` target used when a channel re-emits its records to the
/// process-wide dispatcher. The [`ChannelLayer`](super::ChannelLayer)
/// ignores this target.
pub const PROPAGATED_TARGET: &str = "runlog::propagated";

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Lifecycle state of a [`LogChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelState {
    /// No sinks attached yet.
    Uninitialized,
    /// Console sink and the timestamp-named file sink attached.
    Initialized,
    /// File sink points at the file for the given run identifier.
    Retargeted(String),
}

struct Inner {
    name: String,
    log_dir: PathBuf,
    started_at: DateTime<Local>,
    level: Level,
    state: ChannelState,
    propagate: bool,
    pending_console: Option<Box<dyn Write + Send>>,
    sinks: Vec<Box<dyn Sink>>,
}

impl Inner {
    fn initial_file_path(&self) -> PathBuf {
        self.log_dir.join(format!(
            "run_{}.log",
            self.started_at.format(FILE_TIMESTAMP_FORMAT)
        ))
    }

    fn run_file_path(&self, run_id: &str) -> PathBuf {
        self.log_dir.join(format!("run_{run_id}.log"))
    }

    fn initialize(&mut self, level: Level) -> Result<()> {
        if self.state != ChannelState::Uninitialized || !self.sinks.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.log_dir)?;
        let path = self.initial_file_path();
        let file = FileSink::open(&path, level)?;
        let console = match self.pending_console.take() {
            Some(writer) => ConsoleSink::new(writer, level),
            None => ConsoleSink::stderr(level),
        };

        self.level = level;
        self.sinks.push(Box::new(console));
        self.sinks.push(Box::new(file));
        self.propagate = false;
        self.state = ChannelState::Initialized;

        let name = self.name.clone();
        self.emit(
            &name,
            Level::INFO,
            &format!("Root logger initialized. File: {}", path.display()),
        );
        Ok(())
    }

    fn emit(&mut self, channel: &str, level: Level, message: &str) {
        if !admits(self.level, level) {
            return;
        }
        let record = LogRecord::new(channel, level, message);
        for sink in self.sinks.iter_mut().filter(|s| s.accepts(level)) {
            if let Err(e) = sink.write_record(&record) {
                eprintln!("log sink write failed: {e}");
            }
        }
    }

    fn count(&self, kind: SinkKind) -> usize {
        self.sinks.iter().filter(|s| s.kind() == kind).count()
    }
}

/// Shared logging context.
///
/// Owns exactly one console sink and at most one file sink. The file sink can
/// be swapped with [`retarget`](Self::retarget) once a run identifier is
/// known; the console sink stays attached for the lifetime of the channel.
///
/// Cloning is cheap and every clone refers to the same sinks.
///
/// ## Example
///
/// ```rust,no_run
/// use elasticnet_runlog::logging::LogChannel;
/// use tracing::Level;
///
/// let channel = LogChannel::builder("logs").build();
/// channel.initialize(Level::INFO)?;
///
/// let log = channel.get_named_channel("main")?;
/// log.info("Starting pipeline");
///
/// channel.retarget("0a1b2c", Level::INFO)?; // now writing logs/run_0a1b2c.log
/// # Ok::<(), elasticnet_runlog::Error>(())
/// ```
#[derive(Clone)]
pub struct LogChannel {
    inner: Arc<Mutex<Inner>>,
}

impl LogChannel {
    /// Create a builder for a channel writing its files under `log_dir`.
    #[must_use]
    pub fn builder(log_dir: impl Into<PathBuf>) -> LogChannelBuilder {
        LogChannelBuilder::new(log_dir)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach the console sink and a timestamp-named file sink.
    ///
    /// No-op if the channel already has sinks.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory or file cannot be created.
    pub fn initialize(&self, level: Level) -> Result<()> {
        self.lock().initialize(level)
    }

    /// Replace the file sink with one writing `run_<run_id>.log`.
    ///
    /// Initializes the channel first if needed. Close failures of the
    /// detached file sinks are discarded.
    ///
    /// # Errors
    ///
    /// Returns error if `run_id` is empty or contains a path separator, or if
    /// the new file cannot be opened. On error the previous file sink stays
    /// attached.
    pub fn retarget(&self, run_id: &str, level: Level) -> Result<()> {
        if run_id.is_empty() || run_id.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!(
                "run identifier '{run_id}' cannot name a log file"
            )));
        }

        let mut inner = self.lock();
        if inner.sinks.is_empty() {
            inner.initialize(level)?;
        }

        let path = inner.run_file_path(run_id);
        let replacement = FileSink::open(&path, level)?;

        let (files, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut inner.sinks)
            .into_iter()
            .partition(|s| s.kind() == SinkKind::File);
        inner.sinks = kept;
        for sink in files {
            let _ = sink.close();
        }

        inner.sinks.push(Box::new(replacement));
        inner.state = ChannelState::Retargeted(run_id.to_string());

        let name = inner.name.clone();
        inner.emit(
            &name,
            Level::INFO,
            &format!("Switched logging to run-specific file: {}", path.display()),
        );
        Ok(())
    }

    /// Get a child channel named `<root>.<name>`.
    ///
    /// The child has no sinks; its records are written by this channel's
    /// current sinks.
    ///
    /// # Errors
    ///
    /// Returns error if the channel had to be initialized and that failed.
    pub fn get_named_channel(&self, name: &str) -> Result<NamedChannel> {
        let mut inner = self.lock();
        if inner.sinks.is_empty() {
            let level = inner.level;
            inner.initialize(level)?;
        }
        Ok(NamedChannel {
            name: format!("{}.{name}", inner.name),
            level: inner.level,
            propagate: true,
            root: self.clone(),
        })
    }

    /// Write a record through every sink that accepts it.
    ///
    /// When propagation is enabled (only before initialization) the record is
    /// also re-emitted to the `tracing` dispatcher, after the lock is released.
    pub fn dispatch(&self, channel: &str, level: Level, message: &str) {
        let propagate = {
            let mut inner = self.lock();
            if !admits(inner.level, level) {
                return;
            }
            inner.emit(channel, level, message);
            inner.propagate
        };
        if propagate {
            propagate_to_tracing(channel, level, message);
        }
    }

    /// Log under the channel's own name.
    pub fn log(&self, level: Level, message: &str) {
        let name = self.name();
        self.dispatch(&name, level, message);
    }

    /// Log at INFO under the channel's own name.
    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    /// Minimum severity.
    #[must_use]
    pub fn level(&self) -> Level {
        self.lock().level
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.lock().state.clone()
    }

    /// Whether records are re-emitted to the `tracing` dispatcher.
    #[must_use]
    pub fn propagates(&self) -> bool {
        self.lock().propagate
    }

    /// Path of the attached file sink, if any.
    #[must_use]
    pub fn current_file(&self) -> Option<PathBuf> {
        self.lock()
            .sinks
            .iter()
            .find_map(|s| s.path().map(Path::to_path_buf))
    }

    /// Number of attached file sinks (0 or 1).
    #[must_use]
    pub fn file_sink_count(&self) -> usize {
        self.lock().count(SinkKind::File)
    }

    /// Number of attached console sinks (0 or 1).
    #[must_use]
    pub fn console_sink_count(&self) -> usize {
        self.lock().count(SinkKind::Console)
    }

    #[cfg(test)]
    pub(crate) fn attach_for_test(&self, sink: Box<dyn Sink>) {
        self.lock().sinks.push(sink);
    }
}

impl std::fmt::Debug for LogChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("LogChannel")
            .field("name", &inner.name)
            .field("log_dir", &inner.log_dir)
            .field("level", &inner.level)
            .field("state", &inner.state)
            .field("sinks", &inner.sinks.len())
            .finish()
    }
}

fn propagate_to_tracing(channel: &str, level: Level, message: &str) {
    if level == Level::ERROR {
        tracing::error!(target: PROPAGATED_TARGET, channel, "{message}");
    } else if level == Level::WARN {
        tracing::warn!(target: PROPAGATED_TARGET, channel, "{message}");
    } else if level == Level::INFO {
        tracing::info!(target: PROPAGATED_TARGET, channel, "{message}");
    } else if level == Level::DEBUG {
        tracing::debug!(target: PROPAGATED_TARGET, channel, "{message}");
    } else {
        tracing::trace!(target: PROPAGATED_TARGET, channel, "{message}");
    }
}

/// Builder for `LogChannel`.
pub struct LogChannelBuilder {
    name: String,
    log_dir: PathBuf,
    level: Level,
    started_at: DateTime<Local>,
    console: Option<Box<dyn Write + Send>>,
}

impl LogChannelBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: DEFAULT_CHANNEL_NAME.to_string(),
            log_dir: log_dir.into(),
            level: Level::INFO,
            started_at: Local::now(),
            console: None,
        }
    }

    /// Set the channel name (prefix of every child name).
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the level used when a child channel forces initialization.
    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the process-start timestamp that names the initial log file.
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Write console records to `writer` instead of stderr.
    #[must_use]
    pub fn console(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.console = Some(writer);
        self
    }

    /// Build the `LogChannel` (uninitialized, no files touched).
    #[must_use]
    pub fn build(self) -> LogChannel {
        LogChannel {
            inner: Arc::new(Mutex::new(Inner {
                name: self.name,
                log_dir: self.log_dir,
                started_at: self.started_at,
                level: self.level,
                state: ChannelState::Uninitialized,
                propagate: true,
                pending_console: self.console,
                sinks: Vec::new(),
            })),
        }
    }
}

/// Child channel derived from a [`LogChannel`].
#[derive(Debug, Clone)]
pub struct NamedChannel {
    name: String,
    level: Level,
    propagate: bool,
    root: LogChannel,
}

impl NamedChannel {
    /// Full dotted name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum severity inherited from the shared channel.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// Child channels always hand their records to the shared channel.
    #[must_use]
    pub const fn propagates(&self) -> bool {
        self.propagate
    }

    /// Log a record at `level`.
    pub fn log(&self, level: Level, message: &str) {
        if !admits(self.level, level) || !self.propagate {
            return;
        }
        self.root.dispatch(&self.name, level, message);
    }

    /// Log at ERROR.
    pub fn error(&self, message: &str) {
        self.log(Level::ERROR, message);
    }

    /// Log at WARN.
    pub fn warn(&self, message: &str) {
        self.log(Level::WARN, message);
    }

    /// Log at INFO.
    pub fn info(&self, message: &str) {
        self.log(Level::INFO, message);
    }

    /// Log at DEBUG.
    pub fn debug(&self, message: &str) {
        self.log(Level::DEBUG, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailingClose;

    impl Sink for FailingClose {
        fn kind(&self) -> SinkKind {
            SinkKind::File
        }

        fn level(&self) -> Level {
            Level::INFO
        }

        fn write_record(&mut self, _record: &LogRecord) -> io::Result<()> {
            Ok(())
        }

        fn close(self: Box<Self>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "disk went away"))
        }
    }

    fn quiet_channel(dir: &Path) -> LogChannel {
        LogChannel::builder(dir).console(Box::new(io::sink())).build()
    }

    #[test]
    fn test_new_channel_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let channel = quiet_channel(dir.path());
        assert_eq!(channel.state(), ChannelState::Uninitialized);
        assert_eq!(channel.file_sink_count(), 0);
        assert!(channel.propagates());
        assert!(channel.current_file().is_none());
    }

    #[test]
    fn test_initialize_names_file_after_start_time() {
        let dir = tempfile::tempdir().unwrap();
        let started = Local::now();
        let channel = LogChannel::builder(dir.path())
            .console(Box::new(io::sink()))
            .started_at(started)
            .build();
        channel.initialize(Level::INFO).unwrap();

        let expected = dir
            .path()
            .join(format!("run_{}.log", started.format(FILE_TIMESTAMP_FORMAT)));
        assert_eq!(channel.current_file(), Some(expected));
        assert!(!channel.propagates());
    }

    #[test]
    fn test_initialize_creates_nested_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let channel = quiet_channel(&nested);
        channel.initialize(Level::INFO).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_retarget_swallows_close_failure() {
        let dir = tempfile::tempdir().unwrap();
        let channel = quiet_channel(dir.path());
        channel.initialize(Level::INFO).unwrap();
        channel.attach_for_test(Box::new(FailingClose));
        assert_eq!(channel.file_sink_count(), 2);

        channel.retarget("abc123", Level::INFO).unwrap();

        assert_eq!(channel.file_sink_count(), 1);
        assert_eq!(
            channel.current_file(),
            Some(dir.path().join("run_abc123.log"))
        );
    }

    #[test]
    fn test_retarget_rejects_path_like_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let channel = quiet_channel(dir.path());
        channel.initialize(Level::INFO).unwrap();
        let before = channel.current_file();

        assert!(channel.retarget("../escape", Level::INFO).is_err());
        assert!(channel.retarget("", Level::INFO).is_err());
        assert_eq!(channel.current_file(), before);
    }

    #[test]
    fn test_named_channel_inherits_level() {
        let dir = tempfile::tempdir().unwrap();
        let channel = LogChannel::builder(dir.path())
            .console(Box::new(io::sink()))
            .level(Level::WARN)
            .build();
        let child = channel.get_named_channel("data").unwrap();
        assert_eq!(child.name(), "runlog.data");
        assert_eq!(child.level(), Level::WARN);
        assert!(child.propagates());

        child.info("filtered out");
        child.warn("kept");
        let content = fs::read_to_string(channel.current_file().unwrap()).unwrap();
        assert!(!content.contains("filtered out"));
        assert!(content.contains("runlog.data - WARN - kept"));
    }
}
