//! Log record representation.
//!
//! A [`LogRecord`] is what loggers hand to handlers: the emitting logger's
//! name, the severity, the rendered message, and where and when the record
//! was produced.

use crate::level::Level;
use std::fmt;
use std::thread::{self, ThreadId};
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Rust module path where the log call originated.
    pub module_path: String,
    /// Source file name for the log call.
    pub filename: String,
    /// Line number in the source file.
    pub line_number: u32,
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// ID of the thread that created the record.
    pub thread_id: ThreadId,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
}

impl RecordMetadata {
    /// Capture timestamp and thread info from the current execution context.
    fn capture_runtime() -> (SystemTime, ThreadId, Option<String>) {
        let current = thread::current();
        (
            SystemTime::now(),
            current.id(),
            current.name().map(ToString::to_string),
        )
    }
}

impl Default for RecordMetadata {
    fn default() -> Self {
        let (timestamp, thread_id, thread_name) = Self::capture_runtime();
        Self {
            module_path: String::new(),
            filename: String::new(),
            line_number: 0,
            timestamp,
            thread_id,
            thread_name,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    level: Level,
    /// The rendered message.
    pub message: String,
    /// Contextual metadata for the record.
    pub metadata: RecordMetadata,
}

impl LogRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: Level, message: &str) -> Self {
        Self::with_metadata(logger, level, message, RecordMetadata::default())
    }

    /// Construct a log record with explicit source location.
    ///
    /// Timestamp and thread fields are always taken from the calling thread.
    pub fn with_metadata(
        logger: &str,
        level: Level,
        message: &str,
        mut metadata: RecordMetadata,
    ) -> Self {
        let (timestamp, thread_id, thread_name) = RecordMetadata::capture_runtime();
        metadata.timestamp = timestamp;
        metadata.thread_id = thread_id;
        metadata.thread_name = thread_name;
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.logger, self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_captures_current_thread() {
        let record = LogRecord::new("core", Level::Info, "hello");
        assert_eq!(record.metadata.thread_id, thread::current().id());
        assert_eq!(record.level(), Level::Info);
        assert_eq!(record.to_string(), "core [INFO] hello");
    }

    #[test]
    fn with_metadata_keeps_source_location() {
        let metadata = RecordMetadata {
            module_path: "app::net".into(),
            filename: "net.rs".into(),
            line_number: 12,
            ..Default::default()
        };
        let record = LogRecord::with_metadata("app.net", Level::Error, "down", metadata);
        assert_eq!(record.metadata.module_path, "app::net");
        assert_eq!(record.metadata.filename, "net.rs");
        assert_eq!(record.metadata.line_number, 12);
    }
}
