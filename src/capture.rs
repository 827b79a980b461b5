//! Recording handler that tests use to inspect and expect log output.
//!
//! A [`CaptureHandler`] stores every record it sees. Its level doubles as
//! the expectation marker read by the guard: while a test holds the
//! [`LevelGuard`] returned by [`CaptureHandler::at_level`], records at
//! exactly that level are treated as expected.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::handler::{Handler, HandlerError};
use crate::level::Level;
use crate::log_record::LogRecord;

const LEVEL_UNSET: u8 = u8::MAX;

fn encode(level: Option<Level>) -> u8 {
    level.map_or(LEVEL_UNSET, u8::from)
}

fn decode(raw: u8) -> Option<Level> {
    Level::try_from(raw).ok()
}

/// Handler that stores every record it receives for later inspection.
#[derive(Debug)]
pub struct CaptureHandler {
    level: AtomicU8,
    closed: AtomicBool,
    records: Mutex<Vec<LogRecord>>,
}

impl Default for CaptureHandler {
    fn default() -> Self {
        Self {
            level: AtomicU8::new(LEVEL_UNSET),
            closed: AtomicBool::new(false),
            records: Mutex::new(Vec::new()),
        }
    }
}

impl CaptureHandler {
    /// Create a new empty handler with no expectation set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The level a test currently expects, if any.
    pub fn expected_level(&self) -> Option<Level> {
        decode(self.level.load(Ordering::SeqCst))
    }

    /// Replace the expectation marker and return the previous one.
    pub fn set_level(&self, level: Option<Level>) -> Option<Level> {
        decode(self.level.swap(encode(level), Ordering::SeqCst))
    }

    /// Expect records at `level` until the returned guard is dropped.
    ///
    /// Only records at exactly this level are treated as expected by the
    /// guard; the capture itself also stops recording anything below it.
    #[must_use = "the expectation is lifted when the guard is dropped"]
    pub fn at_level(&self, level: Level) -> LevelGuard<'_> {
        let previous = self.set_level(Some(level));
        LevelGuard {
            handler: self,
            previous,
        }
    }

    /// Return a snapshot of all records received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Return the messages of all records received so far.
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Handler for CaptureHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        if self.is_closed() {
            return Err(HandlerError::Closed("capture"));
        }
        if self
            .expected_level()
            .is_some_and(|level| record.level() < level)
        {
            return Ok(());
        }
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.records.lock().clear();
    }

    fn as_capture(&self) -> Option<&CaptureHandler> {
        Some(self)
    }
}

/// Restores a [`CaptureHandler`]'s previous level when dropped.
#[derive(Debug)]
pub struct LevelGuard<'a> {
    handler: &'a CaptureHandler,
    previous: Option<Level>,
}

impl Drop for LevelGuard<'_> {
    fn drop(&mut self) {
        self.handler.set_level(self.previous);
    }
}
