//! Non-fatal handler errors are reported through the `log` facade.
//!
//! `logtest` installs the global `log` logger, so this binary holds a
//! single test.

use std::sync::Arc;

use logfail::{CaptureHandler, Handler, Level, Logger};
use logtest::Logger as LogCapture;

#[test]
fn closed_handler_error_is_logged_as_warning() {
    let mut captured = LogCapture::start();
    let root = Logger::root("root", Level::Trace);
    let capture = Arc::new(CaptureHandler::new());
    root.add_handler(capture.clone());
    capture.close();

    assert!(root.log(Level::Error, "after close").is_ok());

    let warning = std::iter::from_fn(|| captured.pop())
        .find(|record| record.target() == "logfail")
        .expect("no warning logged");
    assert_eq!(warning.level(), log::Level::Warn);
    assert!(warning.args().contains("reported an error"));
    assert!(capture.records().is_empty());
}
