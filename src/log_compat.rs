//! Compatibility bridge for the Rust `log` crate.
//!
//! [`LogBridge`] implements `log::Log` and forwards every record into a
//! [`LogHierarchy`], so a guard on that hierarchy's root sees output from
//! any crate that logs through the `log` facade. A rejected record panics
//! on the emitting thread, which is how the test harness learns that the
//! current test failed.

use std::borrow::Cow;
use std::sync::{Arc, OnceLock};

use log::{Metadata, Record};
use thiserror::Error;

use crate::LOG_TARGET;
use crate::level::Level;
use crate::log_record::{LogRecord, RecordMetadata};
use crate::manager::LogHierarchy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("global Rust logger is already set; logfail cannot install the log bridge")]
    LoggerAlreadySet,
    #[error("the log bridge is already installed for a different hierarchy")]
    HierarchyMismatch,
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Trace => Level::Trace,
            log::Level::Debug => Level::Debug,
            log::Level::Info => Level::Info,
            log::Level::Warn => Level::Warn,
            log::Level::Error => Level::Error,
        }
    }
}

/// Turn `a::b` module targets into dotted logger names.
pub(crate) fn normalise_target(target: &str) -> Cow<'_, str> {
    if target.contains("::") {
        Cow::Owned(target.replace("::", "."))
    } else {
        Cow::Borrowed(target)
    }
}

/// Whether `target` belongs to this crate's own diagnostics.
pub(crate) fn is_internal_target(target: &str) -> bool {
    target == LOG_TARGET
        || target
            .strip_prefix(LOG_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Dispatch `record` through the logger named after `target`.
///
/// Invalid names fall back to the root logger. A guard rejection panics
/// with the rejection message.
pub(crate) fn dispatch(
    hierarchy: &LogHierarchy,
    target: &str,
    record_fn: impl FnOnce(&str) -> LogRecord,
) {
    let normalised = normalise_target(target);
    let logger = match hierarchy.get_logger(normalised.as_ref()) {
        Ok(logger) => logger,
        Err(_) => Arc::clone(hierarchy.root()),
    };
    let record = record_fn(logger.name());
    if let Err(err) = logger.log_record(record) {
        panic!("{err}");
    }
}

/// Adapter implementing the Rust `log::Log` trait.
pub struct LogBridge {
    hierarchy: Arc<LogHierarchy>,
}

impl LogBridge {
    pub fn new(hierarchy: Arc<LogHierarchy>) -> Self {
        Self { hierarchy }
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_internal_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        dispatch(&self.hierarchy, record.target(), |logger| {
            let metadata = RecordMetadata {
                module_path: record.module_path().unwrap_or_default().to_string(),
                filename: record.file().unwrap_or_default().to_string(),
                line_number: record.line().unwrap_or(0),
                ..Default::default()
            };
            LogRecord::with_metadata(
                logger,
                Level::from(record.level()),
                &record.args().to_string(),
                metadata,
            )
        });
    }

    fn flush(&self) {}
}

static INSTALLED: OnceLock<Result<Arc<LogHierarchy>, BridgeError>> = OnceLock::new();

/// Install [`LogBridge`] as the global Rust logger for `hierarchy`.
///
/// Repeated calls with the same hierarchy succeed without side effects.
/// Fails when another logger already owns the facade or the bridge was
/// installed for a different hierarchy.
pub fn install_global_logger(hierarchy: Arc<LogHierarchy>) -> Result<(), BridgeError> {
    let outcome = INSTALLED.get_or_init(|| {
        log::set_boxed_logger(Box::new(LogBridge::new(Arc::clone(&hierarchy))))
            .map_err(|_| BridgeError::LoggerAlreadySet)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(Arc::clone(&hierarchy))
    });
    match outcome {
        Ok(installed) if Arc::ptr_eq(installed, &hierarchy) => Ok(()),
        Ok(_) => Err(BridgeError::HierarchyMismatch),
        Err(err) => Err(err.clone()),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the `log` crate bridge.

    use super::*;
    use crate::capture::CaptureHandler;
    use crate::logger::logger_tests_helpers::CollectingHandler;
    use crate::session::LogFailSession;
    use log::Log;
    use rstest::rstest;

    #[rstest]
    #[case(log::Level::Trace, Level::Trace)]
    #[case(log::Level::Debug, Level::Debug)]
    #[case(log::Level::Info, Level::Info)]
    #[case(log::Level::Warn, Level::Warn)]
    #[case(log::Level::Error, Level::Error)]
    fn level_mapping_is_direct(#[case] level: log::Level, #[case] expected: Level) {
        assert_eq!(Level::from(level), expected);
    }

    #[rstest]
    #[case("logfail", true)]
    #[case("logfail::session", true)]
    #[case("logfailure", false)]
    #[case("app::logfail", false)]
    fn recognises_internal_targets(#[case] target: &str, #[case] internal: bool) {
        assert_eq!(is_internal_target(target), internal);
    }

    fn emit(bridge: &LogBridge, level: log::Level, target: &str, message: &str) {
        bridge.log(
            &log::Record::builder()
                .args(format_args!("{message}"))
                .level(level)
                .target(target)
                .module_path(Some("bridge::test"))
                .file(Some("lib.rs"))
                .line(Some(42))
                .build(),
        );
    }

    #[test]
    fn bridge_dispatches_records_to_target_logger() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let handler = CollectingHandler::new();
        hierarchy.root().add_handler(Arc::new(handler.clone()));
        let bridge = LogBridge::new(Arc::clone(&hierarchy));

        emit(&bridge, log::Level::Info, "bridge::test", "hello");

        let records = handler.collected();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.logger, "bridge.test");
        assert_eq!(rec.level(), Level::Info);
        assert_eq!(rec.message, "hello");
        assert_eq!(rec.metadata.module_path, "bridge::test");
        assert_eq!(rec.metadata.filename, "lib.rs");
        assert_eq!(rec.metadata.line_number, 42);
    }

    #[test]
    fn invalid_targets_fall_back_to_root() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let handler = CollectingHandler::new();
        hierarchy.root().add_handler(Arc::new(handler.clone()));
        let bridge = LogBridge::new(Arc::clone(&hierarchy));

        emit(&bridge, log::Level::Info, "", "nameless");

        assert_eq!(handler.collected()[0].logger, "root");
    }

    #[test]
    fn internal_diagnostics_are_not_forwarded() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let handler = CollectingHandler::new();
        hierarchy.root().add_handler(Arc::new(handler.clone()));
        let bridge = LogBridge::new(Arc::clone(&hierarchy));

        emit(&bridge, log::Level::Error, LOG_TARGET, "internal");

        assert!(handler.collected().is_empty());
    }

    #[test]
    #[should_panic(expected = "Got logging message on logger bridge.guarded with level WARN: oops!")]
    fn bridge_panics_on_unexpected_record() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let _session = LogFailSession::install(Arc::clone(&hierarchy)).unwrap();
        let bridge = LogBridge::new(hierarchy);
        emit(&bridge, log::Level::Warn, "bridge::guarded", "oops");
    }

    #[test]
    fn bridge_respects_expectations() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let _session = LogFailSession::install(Arc::clone(&hierarchy)).unwrap();
        let capture = Arc::new(CaptureHandler::new());
        hierarchy.root().add_handler(capture.clone());
        let bridge = LogBridge::new(hierarchy);

        let _expect = capture.at_level(Level::Error);
        emit(&bridge, log::Level::Error, "bridge", "expected");
        emit(&bridge, log::Level::Info, "bridge", "quiet");

        assert_eq!(capture.messages(), vec!["expected".to_string()]);
    }
}
