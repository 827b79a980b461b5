//! Named loggers and synchronous record dispatch.
//!
//! A [`Logger`] filters records against its effective level and hands them
//! to its own handlers, then to each ancestor's while `propagate` is set.
//! Dispatch happens on the caller's thread over a snapshot of the handler
//! list, so handlers may freely inspect or mutate the hierarchy.

use log::warn;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::LOG_TARGET;
use crate::handler::{Handler, HandlerError, UnexpectedLogRecord};
use crate::level::Level;
use crate::log_record::LogRecord;

const LEVEL_UNSET: u8 = u8::MAX;

pub struct Logger {
    /// Dotted name; `root` for the hierarchy root.
    name: String,
    parent: Option<Arc<Logger>>,
    level: AtomicU8,
    propagate: AtomicBool,
    handlers: RwLock<Vec<Arc<dyn Handler>>>,
}

impl Logger {
    /// Create a root logger with an explicit level.
    pub fn root(name: impl Into<String>, level: Level) -> Self {
        let logger = Self::with_parent(name.into(), None);
        logger.set_level(level);
        logger
    }

    /// Create a logger that inherits its level from `parent`.
    pub fn with_parent(name: String, parent: Option<Arc<Logger>>) -> Self {
        Self {
            name,
            parent,
            level: AtomicU8::new(LEVEL_UNSET),
            propagate: AtomicBool::new(true),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Logger>> {
        self.parent.as_ref()
    }

    /// Update the logger's minimum level.
    pub fn set_level(&self, level: Level) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    /// Inherit the level from the nearest ancestor again.
    pub fn clear_level(&self) {
        self.level.store(LEVEL_UNSET, Ordering::Relaxed);
    }

    /// The level set on this logger, if any.
    pub fn level(&self) -> Option<Level> {
        Level::try_from(self.level.load(Ordering::Relaxed)).ok()
    }

    /// The level of this logger or its nearest ancestor with one set.
    ///
    /// Falls back to [`Level::Trace`] when no logger in the chain has a
    /// level, which only happens for detached loggers.
    pub fn effective_level(&self) -> Level {
        let mut current = Some(self);
        while let Some(logger) = current {
            if let Some(level) = logger.level() {
                return level;
            }
            current = logger.parent.as_deref();
        }
        Level::Trace
    }

    pub fn is_enabled_for(&self, level: Level) -> bool {
        level >= self.effective_level()
    }

    pub fn propagate(&self) -> bool {
        self.propagate.load(Ordering::SeqCst)
    }

    pub fn set_propagate(&self, flag: bool) {
        self.propagate.store(flag, Ordering::SeqCst);
    }

    /// Log `message` at `level` from this logger.
    pub fn log(&self, level: Level, message: &str) -> Result<(), UnexpectedLogRecord> {
        self.log_record(LogRecord::new(&self.name, level, message))
    }

    /// Dispatch an already-constructed record through this logger.
    ///
    /// Records below the effective level are dropped. The first guard
    /// rejection stops dispatch, including propagation to ancestors.
    pub fn log_record(&self, record: LogRecord) -> Result<(), UnexpectedLogRecord> {
        if !self.is_enabled_for(record.level()) {
            return Ok(());
        }
        let mut current = Some(self);
        while let Some(logger) = current {
            logger.dispatch_to_handlers(&record)?;
            if !logger.propagate() {
                break;
            }
            current = logger.parent.as_deref();
        }
        Ok(())
    }

    fn dispatch_to_handlers(&self, record: &LogRecord) -> Result<(), UnexpectedLogRecord> {
        let handlers = self.handlers.read().clone();
        for handler in &handlers {
            match handler.handle(record) {
                Ok(()) => {}
                Err(HandlerError::Unexpected(err)) => return Err(err),
                Err(err) => warn!(
                    target: LOG_TARGET,
                    "handler on logger {:?} reported an error: {err}",
                    self.name
                ),
            }
        }
        Ok(())
    }

    /// Attach a handler to this logger.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.handlers.write().push(handler);
    }

    /// Attach `handler` unless an attached handler matches `conflicts`.
    ///
    /// The check and the insert happen under one write lock. Returns
    /// `false` when a conflicting handler was found.
    pub fn add_handler_unless(
        &self,
        handler: Arc<dyn Handler>,
        mut conflicts: impl FnMut(&dyn Handler) -> bool,
    ) -> bool {
        let mut handlers = self.handlers.write();
        if handlers.iter().any(|h| conflicts(h.as_ref())) {
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Detach a handler previously added to this logger.
    pub fn remove_handler(&self, handler: &Arc<dyn Handler>) -> bool {
        let mut handlers = self.handlers.write();
        if let Some(pos) = handlers.iter().position(|h| Arc::ptr_eq(h, handler)) {
            handlers.remove(pos);
            true
        } else {
            false
        }
    }

    /// Detach every handler matching `pred` and return them in order.
    pub fn remove_handlers_where(
        &self,
        mut pred: impl FnMut(&dyn Handler) -> bool,
    ) -> Vec<Arc<dyn Handler>> {
        let mut handlers = self.handlers.write();
        let mut removed = Vec::new();
        handlers.retain(|h| {
            if pred(h.as_ref()) {
                removed.push(Arc::clone(h));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Remove all handlers from this logger.
    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    /// Snapshot of the attached handlers.
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.handlers.read().clone()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("level", &self.level())
            .field("propagate", &self.propagate())
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "logger_tests_helpers.rs"]
pub(crate) mod logger_tests_helpers;
