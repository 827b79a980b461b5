//! rstest fixtures wiring the guard into a test suite.
//!
//! `log_session` is evaluated once per test binary: it installs the `log`
//! bridge and a guard on the global hierarchy, configured from the
//! environment. `log_test` hands each test a [`TestScope`] that removes
//! capture handlers when the test ends.
//!
//! Two limits of the Rust test harness apply. rstest never drops `#[once]`
//! values, so the session guard stays installed until the process exits
//! and [`LogFailSession::uninstall`] is not called on this path. There is
//! no auto-use either: per-test cleanup only happens for tests that request
//! `log_test` (or open a [`LogFailSession::test_scope`] themselves).
//!
//! ```ignore
//! use logfail::fixtures::*;
//! use rstest::rstest;
//!
//! #[rstest]
//! fn warns_on_retry(log_test: logfail::TestScope<'static>) {
//!     let caplog = log_test.capture();
//!     let _expect = caplog.at_level(logfail::Level::Warn);
//!     log::warn!("retrying");
//! }
//! ```

use rstest::fixture;
use std::sync::Arc;

use crate::config::LogFailConfig;
use crate::log_compat::install_global_logger;
use crate::manager::LogHierarchy;
use crate::session::{LogFailSession, TestScope};

/// Install the session guard on the global hierarchy.
///
/// Setup errors abort the requesting test with a descriptive panic.
#[fixture]
#[once]
pub fn log_session() -> LogFailSession {
    let hierarchy = LogHierarchy::global();
    let config = LogFailConfig::from_env()
        .unwrap_or_else(|err| panic!("invalid logfail configuration: {err}"));
    install_global_logger(Arc::clone(&hierarchy)).unwrap_or_else(|err| panic!("{err}"));
    LogFailSession::install_with(hierarchy, config).unwrap_or_else(|err| panic!("{err}"))
}

/// Per-test scope cleaning up capture handlers on drop.
#[fixture]
pub fn log_test(log_session: &'static LogFailSession) -> TestScope<'static> {
    log_session.test_scope()
}
