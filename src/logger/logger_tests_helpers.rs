//! Shared test helpers for logger unit tests.
//!
//! Provides reusable handler implementations used across the crate's test
//! modules.

use crate::handler::{Handler, HandlerError, UnexpectedLogRecord};
use crate::level::Level;
use crate::log_record::LogRecord;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Default)]
pub(crate) struct CollectingHandler {
    pub(crate) records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CollectingHandler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn collected(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }
}

impl Handler for CollectingHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Counts records and rejects everything at or above `reject_from`.
#[derive(Clone, Default)]
pub(crate) struct RejectingHandler {
    pub(crate) count: Arc<AtomicUsize>,
    pub(crate) reject_from: Option<Level>,
}

impl RejectingHandler {
    pub(crate) fn rejecting_from(level: Level) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            reject_from: Some(level),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Handler for RejectingHandler {
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        match self.reject_from {
            Some(level) if record.level() >= level => Err(UnexpectedLogRecord {
                logger: record.logger.clone(),
                level: record.level(),
                message: record.message.clone(),
            }
            .into()),
            _ => Ok(()),
        }
    }
}

/// Always reports a non-fatal error.
pub(crate) struct ClosedHandler;

impl Handler for ClosedHandler {
    fn handle(&self, _record: &LogRecord) -> Result<(), HandlerError> {
        Err(HandlerError::Closed("test"))
    }
}
