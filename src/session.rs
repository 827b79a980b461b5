//! Session and per-test lifecycle for the log-fail guard.
//!
//! [`LogFailSession::install`] attaches one [`LogFailHandler`] to a
//! hierarchy's root logger for the lifetime of the session. Each test runs
//! inside a [`TestScope`], which detaches and closes any capture handlers
//! left on the root when it is dropped so expectations never leak into the
//! next test.

use log::debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::LOG_TARGET;
use crate::capture::CaptureHandler;
use crate::config::LogFailConfig;
use crate::guard::LogFailHandler;
use crate::handler::Handler;
use crate::level::Level;
use crate::logger::Logger;
use crate::manager::{LogHierarchy, LoggerNameError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Only one guard may evaluate records on a root logger.
    #[error("a log-fail guard is already installed on logger {0:?}")]
    AlreadyInstalled(String),
}

/// Detach and close every capture handler on `root`.
///
/// Returns the number of handlers removed; zero when none were attached.
pub fn cleanup_capture_handlers(root: &Logger) -> usize {
    let removed = root.remove_handlers_where(|h| h.as_capture().is_some());
    for handler in &removed {
        handler.close();
    }
    removed.len()
}

#[derive(Debug)]
pub struct LogFailSession {
    hierarchy: Arc<LogHierarchy>,
    guard: Arc<LogFailHandler>,
    config: LogFailConfig,
    previous_root_level: Option<Level>,
    installed: AtomicBool,
}

impl LogFailSession {
    /// Install a guard with the default configuration.
    pub fn install(hierarchy: Arc<LogHierarchy>) -> Result<Self, SessionError> {
        Self::install_with(hierarchy, LogFailConfig::default())
    }

    /// Install a guard on `hierarchy`'s root logger.
    ///
    /// The root level is set from `config` so records at the threshold
    /// always reach the guard; [`uninstall`](Self::uninstall) puts the
    /// previous level back.
    pub fn install_with(
        hierarchy: Arc<LogHierarchy>,
        config: LogFailConfig,
    ) -> Result<Self, SessionError> {
        let root = hierarchy.root();
        let guard = Arc::new(LogFailHandler::with_min_level(root, config.min_level()));
        if !root.add_handler_unless(guard.clone(), |h| h.is_log_fail()) {
            return Err(SessionError::AlreadyInstalled(root.name().to_owned()));
        }
        let previous_root_level = root.level();
        root.set_level(config.root_level());
        debug!(
            target: LOG_TARGET,
            "installed log-fail guard on logger {:?} (min level {})",
            root.name(),
            config.min_level()
        );
        Ok(Self {
            hierarchy,
            guard,
            config,
            previous_root_level,
            installed: AtomicBool::new(true),
        })
    }

    pub fn hierarchy(&self) -> &Arc<LogHierarchy> {
        &self.hierarchy
    }

    pub fn guard(&self) -> &Arc<LogFailHandler> {
        &self.guard
    }

    pub fn config(&self) -> LogFailConfig {
        self.config
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Detach and close the guard and restore the root level.
    ///
    /// Returns `false` when the session was already uninstalled.
    pub fn uninstall(&self) -> bool {
        if !self.installed.swap(false, Ordering::SeqCst) {
            return false;
        }
        let handle: Arc<dyn Handler> = self.guard.clone();
        let root = self.hierarchy.root();
        root.remove_handler(&handle);
        self.guard.close();
        match self.previous_root_level {
            Some(level) => root.set_level(level),
            None => root.clear_level(),
        }
        debug!(
            target: LOG_TARGET,
            "uninstalled log-fail guard from logger {:?}",
            root.name()
        );
        true
    }

    /// Open the scope of a single test.
    pub fn test_scope(&self) -> TestScope<'_> {
        TestScope { session: self }
    }
}

impl Drop for LogFailSession {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Per-test handle onto a [`LogFailSession`].
///
/// Dropping the scope, including during a panic unwind, removes every
/// capture handler from the root logger.
#[derive(Debug)]
pub struct TestScope<'a> {
    session: &'a LogFailSession,
}

impl<'a> TestScope<'a> {
    pub fn session(&self) -> &'a LogFailSession {
        self.session
    }

    /// Attach a fresh capture handler to the root logger.
    pub fn capture(&self) -> Arc<CaptureHandler> {
        let capture = Arc::new(CaptureHandler::new());
        self.session.hierarchy.root().add_handler(capture.clone());
        capture
    }

    /// Look up a logger in the session's hierarchy.
    pub fn logger(&self, name: &str) -> Result<Arc<Logger>, LoggerNameError> {
        self.session.hierarchy.get_logger(name)
    }
}

impl Drop for TestScope<'_> {
    fn drop(&mut self) {
        if !self.session.config.cleanup_capture() {
            return;
        }
        let removed = cleanup_capture_handlers(self.session.hierarchy.root());
        if removed > 0 {
            debug!(target: LOG_TARGET, "removed {removed} capture handler(s) after test");
        }
    }
}
