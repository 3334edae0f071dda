//! Structured JSON logging for the builder engine and session.
//!
//! Events are plain serde structs pushed through a [`LogSink`]. The engine and
//! session never fail an operation because logging failed.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

pub const ENGINE_TARGET: &str = "builder::engine";
pub const SESSION_TARGET: &str = "builder::session";

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty", default)]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ts_ms: current_ms(),
            level,
            target: target.into(),
            message: message.into(),
            fields: LogFields::new(),
        }
    }

    pub fn with_fields(
        level: LogLevel,
        target: impl Into<String>,
        message: impl Into<String>,
        fields: LogFields,
    ) -> Self {
        Self {
            fields,
            ..Self::new(level, target, message)
        }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub type LoggingResult<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("log sink lock poisoned")]
    Poisoned,
}

pub trait LogSink: Send + Sync {
    fn log(&self, event: &LogEvent) -> LoggingResult<()>;
}

/// Cheap-to-clone handle over a shared sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new<S>(sink: S) -> Self
    where
        S: LogSink + 'static,
    {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn from_shared(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) -> LoggingResult<()> {
        self.sink.log(&LogEvent::new(level, target, message))
    }

    pub fn log_event(&self, event: LogEvent) -> LoggingResult<()> {
        self.sink.log(&event)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Logger")
    }
}

/// File name of the per-store activity log.
pub const ACTIVITY_LOG: &str = "builder.log";

/// Appends one JSON object per line. Once `max_bytes` would be exceeded the
/// current file moves to `{path}.1`, replacing any older one, and a fresh
/// file is started (0 disables the cap).
pub struct FileSink {
    path: PathBuf,
    max_bytes: u64,
    min_level: LogLevel,
    writer: Mutex<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>, max_bytes: u64) -> LoggingResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            max_bytes,
            min_level: LogLevel::Trace,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Activity log kept beside a file store's documents:
    /// `{root}/{store}/builder.log`.
    pub fn for_store(root: impl AsRef<Path>, store_id: &str, max_bytes: u64) -> LoggingResult<Self> {
        Self::new(root.as_ref().join(store_id).join(ACTIVITY_LOG), max_bytes)
    }

    /// Drop events below `level`.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the previous file goes when the cap is reached.
    pub fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".1");
        PathBuf::from(name)
    }

    fn write_line(&self, mut line: String) -> LoggingResult<()> {
        line.push('\n');
        let mut guard = self.writer.lock().map_err(|_| LoggingError::Poisoned)?;

        if self.over_cap(guard.get_ref(), line.len() as u64)? {
            guard.flush()?;
            fs::rename(&self.path, self.rotated_path())?;
            let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            *guard = BufWriter::new(file);
        }

        guard.write_all(line.as_bytes())?;
        guard.flush()?;
        Ok(())
    }

    fn over_cap(&self, file: &File, incoming_len: u64) -> std::io::Result<bool> {
        if self.max_bytes == 0 {
            return Ok(false);
        }
        let current = file.metadata()?.len();
        Ok(current > 0 && current + incoming_len > self.max_bytes)
    }
}

impl LogSink for FileSink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        if event.level < self.min_level {
            return Ok(());
        }
        let line = serde_json::to_string(event)?;
        self.write_line(line)
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.message).collect()
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl LogSink for MemorySink {
    fn log(&self, event: &LogEvent) -> LoggingResult<()> {
        self.events
            .lock()
            .map_err(|_| LoggingError::Poisoned)?
            .push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _event: &LogEvent) -> LoggingResult<()> {
        Ok(())
    }
}

pub fn event_with_fields(
    level: LogLevel,
    target: &str,
    message: &str,
    fields: impl IntoIterator<Item = (String, Value)>,
) -> LogEvent {
    LogEvent::with_fields(level, target, message, fields.into_iter().collect())
}

pub fn json_kv(key: &str, value: impl Into<Value>) -> (String, Value) {
    (key.to_string(), value.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn memory_sink_shares_buffer_across_clones() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());
        logger
            .log_event(event_with_fields(
                LogLevel::Info,
                ENGINE_TARGET,
                "section_added",
                [json_kv("section", "hero_1")],
            ))
            .unwrap();
        logger.log(LogLevel::Error, ENGINE_TARGET, "rejected").unwrap();

        assert_eq!(sink.messages(), vec!["section_added", "rejected"]);
        assert_eq!(sink.events()[0].field("section"), Some(&json!("hero_1")));
        assert_eq!(sink.at_level(LogLevel::Error).len(), 1);
        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn file_sink_writes_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("builder.log");
        let logger = Logger::new(FileSink::new(&path, 0).unwrap());
        logger.log(LogLevel::Info, SESSION_TARGET, "loaded").unwrap();
        logger.log(LogLevel::Warn, SESSION_TARGET, "save_failed").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["level"], "warn");
        assert_eq!(lines[1]["target"], SESSION_TARGET);
        assert!(lines[0].get("fields").is_none());
    }

    #[test]
    fn file_sink_keeps_the_previous_file_when_capped() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::for_store(dir.path(), "acme", 200).unwrap();
        assert_eq!(sink.path(), dir.path().join("acme").join(ACTIVITY_LOG));
        for _ in 0..5 {
            sink.log(&LogEvent::new(LogLevel::Info, ENGINE_TARGET, "command_committed"))
                .unwrap();
        }
        assert!(fs::metadata(sink.path()).unwrap().len() <= 200);
        let rotated = fs::read_to_string(sink.rotated_path()).unwrap();
        assert!(rotated.lines().count() >= 1);
        assert!(rotated.contains("command_committed"));
    }

    #[test]
    fn file_sink_filters_below_min_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warn.log");
        let logger = Logger::new(FileSink::new(&path, 0).unwrap().with_min_level(LogLevel::Warn));
        logger.log(LogLevel::Debug, ENGINE_TARGET, "command_committed").unwrap();
        logger.log(LogLevel::Error, ENGINE_TARGET, "command_rejected").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("command_rejected"));
    }
}
