//! Handler that fails tests on unexpected log records.
//!
//! [`LogFailHandler`] sits on a root logger and rejects every record at or
//! above its threshold unless a [`CaptureHandler`] on the same root expects
//! records at exactly that level.
//!
//! [`CaptureHandler`]: crate::capture::CaptureHandler

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::capture::CaptureHandler;
use crate::handler::{Handler, HandlerError, UnexpectedLogRecord};
use crate::level::Level;
use crate::log_record::LogRecord;
use crate::logger::Logger;

/// Decide whether `record` is acceptable.
///
/// An expectation equal to the record's level always wins. Otherwise
/// records below `min_level` pass and everything else is rejected. An
/// expectation at a different level does not suppress anything.
pub fn evaluate(
    min_level: Level,
    expected: Option<Level>,
    record: &LogRecord,
) -> Result<(), UnexpectedLogRecord> {
    if expected == Some(record.level()) {
        return Ok(());
    }
    if record.level() < min_level {
        return Ok(());
    }
    Err(UnexpectedLogRecord {
        logger: record.logger.clone(),
        level: record.level(),
        message: record.message.clone(),
    })
}

#[derive(Debug)]
pub struct LogFailHandler {
    min_level: Level,
    root: Weak<Logger>,
    closed: AtomicBool,
}

impl LogFailHandler {
    pub const DEFAULT_MIN_LEVEL: Level = Level::Warn;

    /// Create a guard that reads expectations from `root`'s handlers.
    pub fn new(root: &Arc<Logger>) -> Self {
        Self::with_min_level(root, Self::DEFAULT_MIN_LEVEL)
    }

    pub fn with_min_level(root: &Arc<Logger>, min_level: Level) -> Self {
        Self {
            min_level,
            root: Arc::downgrade(root),
            closed: AtomicBool::new(false),
        }
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The expectation of the first capture handler on the root, if any.
    ///
    /// A missing root or a root without capture handlers means nothing is
    /// expected.
    pub fn expected_level(&self) -> Option<Level> {
        let root = self.root.upgrade()?;
        let handlers = root.handlers();
        handlers
            .iter()
            .find_map(|h| h.as_capture().map(CaptureHandler::expected_level))
            .flatten()
    }

    /// Evaluate `record` against the threshold and current expectation.
    pub fn check(&self, record: &LogRecord) -> Result<(), UnexpectedLogRecord> {
        if self.is_closed() {
            return Ok(());
        }
        evaluate(self.min_level, self.expected_level(), record)
    }
}

impl Handler for LogFailHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        self.check(record).map_err(HandlerError::from)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_log_fail(&self) -> bool {
        true
    }
}
