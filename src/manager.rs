//! Logger hierarchy mapping dotted names to loggers.
//!
//! A [`LogHierarchy`] is an explicit object owning a root logger and every
//! named logger created through it. The process-wide instance returned by
//! [`LogHierarchy::global`] is the one the facade bridges feed.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::level::Level;
use crate::logger::Logger;

pub const ROOT_LOGGER_NAME: &str = "root";

/// Raised for names with empty dotted segments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid logger name {0:?}")]
pub struct LoggerNameError(pub String);

static GLOBAL: Lazy<Arc<LogHierarchy>> = Lazy::new(|| Arc::new(LogHierarchy::new(Level::Trace)));

#[derive(Debug)]
pub struct LogHierarchy {
    root: Arc<Logger>,
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
}

impl LogHierarchy {
    /// Create a hierarchy whose root logger passes records at `root_level`
    /// and above.
    pub fn new(root_level: Level) -> Self {
        Self {
            root: Arc::new(Logger::root(ROOT_LOGGER_NAME, root_level)),
            loggers: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide hierarchy.
    pub fn global() -> Arc<LogHierarchy> {
        Arc::clone(&GLOBAL)
    }

    pub fn root(&self) -> &Arc<Logger> {
        &self.root
    }

    /// Retrieve an existing logger or create one with a dotted-name parent.
    pub fn get_logger(&self, name: &str) -> Result<Arc<Logger>, LoggerNameError> {
        if name.is_empty() || name.split('.').any(str::is_empty) {
            return Err(LoggerNameError(name.to_owned()));
        }
        if name == ROOT_LOGGER_NAME {
            return Ok(Arc::clone(&self.root));
        }
        if let Some(existing) = self.loggers.read().get(name) {
            return Ok(Arc::clone(existing));
        }
        let mut loggers = self.loggers.write();
        Ok(Self::get_or_create(&self.root, &mut loggers, name))
    }

    fn get_or_create(
        root: &Arc<Logger>,
        loggers: &mut HashMap<String, Arc<Logger>>,
        name: &str,
    ) -> Arc<Logger> {
        if name == ROOT_LOGGER_NAME {
            return Arc::clone(root);
        }
        if let Some(existing) = loggers.get(name) {
            return Arc::clone(existing);
        }
        let parent = match name.rsplit_once('.') {
            Some((parent, _)) => Self::get_or_create(root, loggers, parent),
            None => Arc::clone(root),
        };
        let logger = Arc::new(Logger::with_parent(name.to_owned(), Some(parent)));
        loggers.insert(name.to_owned(), Arc::clone(&logger));
        logger
    }

    /// Drop every named logger. The root and its handlers are kept.
    pub fn reset_loggers(&self) {
        self.loggers.write().clear();
    }
}

impl Default for LogHierarchy {
    fn default() -> Self {
        Self::new(Level::Trace)
    }
}
