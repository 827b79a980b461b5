//! Handler trait and the errors handlers report back to loggers.

use thiserror::Error;

use crate::capture::CaptureHandler;
use crate::level::Level;
use crate::log_record::LogRecord;

/// A record at or above the guard threshold that no test expected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Got logging message on logger {logger} with level {level}: {message}!")]
pub struct UnexpectedLogRecord {
    pub logger: String,
    pub level: Level,
    pub message: String,
}

/// Errors a handler may return from [`Handler::handle`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The guard rejected the record; dispatch stops here.
    #[error(transparent)]
    Unexpected(#[from] UnexpectedLogRecord),
    /// The handler was closed while still reachable from a snapshot.
    #[error("handler {0} is closed")]
    Closed(&'static str),
}

impl HandlerError {
    /// Whether the error must abort the current test.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandlerError::Unexpected(_))
    }
}

/// Trait implemented by everything that can be attached to a logger.
///
/// Handlers run synchronously on the emitting thread. Capabilities are
/// looked up through the `as_*` methods rather than by downcasting.
pub trait Handler: Send + Sync {
    /// Process a record.
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError>;

    /// Release any held resources. Called once the handler is detached.
    fn close(&self) {}

    /// Return the capture view of this handler, if it is one.
    fn as_capture(&self) -> Option<&CaptureHandler> {
        None
    }

    /// Whether this handler is a log-fail guard.
    fn is_log_fail(&self) -> bool {
        false
    }
}
