//! Fail tests on unexpected log output.
//!
//! A [`LogFailHandler`] attached to the root of a [`LogHierarchy`] rejects
//! every record at or above its threshold unless the running test declared,
//! through a [`CaptureHandler`], that it expects records at exactly that
//! level. The `log` and `tracing` bridges route facade output into the
//! hierarchy, and [`LogFailSession`] and [`TestScope`] bind the guard to
//! the lifetime of a test session and of each test.

pub mod capture;
pub mod config;
#[cfg(feature = "fixtures")]
pub mod fixtures;
pub mod guard;
pub mod handler;
pub mod level;
pub mod log_compat;
pub mod log_record;
pub mod logger;
pub mod manager;
pub mod session;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;

/// Target of the crate's own diagnostics; never routed into a hierarchy.
pub(crate) const LOG_TARGET: &str = "logfail";

pub use capture::{CaptureHandler, LevelGuard};
pub use config::{ConfigError, LogFailConfig, LogFailConfigBuilder};
pub use guard::LogFailHandler;
pub use handler::{Handler, HandlerError, UnexpectedLogRecord};
pub use level::{Level, LevelParseError};
pub use log_compat::{BridgeError, LogBridge, install_global_logger};
pub use log_record::{LogRecord, RecordMetadata};
pub use logger::Logger;
pub use manager::{LogHierarchy, LoggerNameError};
pub use session::{LogFailSession, SessionError, TestScope, cleanup_capture_handlers};
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::LogFailLayer;
