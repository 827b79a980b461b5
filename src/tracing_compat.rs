//! Compatibility bridge for `tracing` events.
//!
//! [`LogFailLayer`] is a `tracing_subscriber` layer that turns every event
//! into a [`LogRecord`] and dispatches it through a [`LogHierarchy`], the
//! same way the `log` bridge does.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::level::Level;
use crate::log_compat::{dispatch, is_internal_target};
use crate::log_record::{LogRecord, RecordMetadata};
use crate::manager::LogHierarchy;

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Level::Trace,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            // ERROR
            _ => Level::Error,
        }
    }
}

/// Renders the `message` field followed by `key=value` pairs.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={value:?}", field.name());
    }
}

/// Layer forwarding `tracing` events into a hierarchy.
pub struct LogFailLayer {
    hierarchy: Arc<LogHierarchy>,
}

impl LogFailLayer {
    pub fn new(hierarchy: Arc<LogHierarchy>) -> Self {
        Self { hierarchy }
    }
}

impl<S: Subscriber> Layer<S> for LogFailLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_internal_target(meta.target()) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        let message = visitor.finish();
        dispatch(&self.hierarchy, meta.target(), |logger| {
            let metadata = RecordMetadata {
                module_path: meta.module_path().unwrap_or_default().to_string(),
                filename: meta.file().unwrap_or_default().to_string(),
                line_number: meta.line().unwrap_or(0),
                ..Default::default()
            };
            LogRecord::with_metadata(logger, Level::from(*meta.level()), &message, metadata)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureHandler;
    use crate::logger::logger_tests_helpers::CollectingHandler;
    use crate::session::LogFailSession;
    use tracing_subscriber::prelude::*;

    fn with_layer(hierarchy: &Arc<LogHierarchy>, f: impl FnOnce()) {
        let subscriber =
            tracing_subscriber::registry().with(LogFailLayer::new(Arc::clone(hierarchy)));
        tracing::subscriber::with_default(subscriber, f);
    }

    #[test]
    fn events_become_records() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let handler = CollectingHandler::new();
        hierarchy.root().add_handler(Arc::new(handler.clone()));

        with_layer(&hierarchy, || {
            tracing::info!(target: "app::db", rows = 3, "query done");
        });

        let records = handler.collected();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].logger, "app.db");
        assert_eq!(records[0].level(), Level::Info);
        assert_eq!(records[0].message, "query done rows=3");
    }

    #[test]
    fn events_without_message_render_fields() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let handler = CollectingHandler::new();
        hierarchy.root().add_handler(Arc::new(handler.clone()));

        with_layer(&hierarchy, || {
            tracing::debug!(target: "app", user = "ada", id = 7);
        });

        assert_eq!(handler.collected()[0].message, "user=\"ada\" id=7");
    }

    #[test]
    #[should_panic(expected = "Got logging message on logger app.db with level WARN: slow rows=3!")]
    fn unexpected_event_panics() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let _session = LogFailSession::install(Arc::clone(&hierarchy)).unwrap();
        with_layer(&hierarchy, || {
            tracing::warn!(target: "app::db", rows = 3, "slow");
        });
    }

    #[test]
    fn expected_event_level_is_suppressed() {
        let hierarchy = Arc::new(LogHierarchy::default());
        let _session = LogFailSession::install(Arc::clone(&hierarchy)).unwrap();
        let capture = Arc::new(CaptureHandler::new());
        hierarchy.root().add_handler(capture.clone());

        let _expect = capture.at_level(Level::Error);
        with_layer(&hierarchy, || {
            tracing::error!(target: "app::db", "connection lost");
            tracing::info!(target: "app::db", "reconnecting");
        });

        assert_eq!(capture.messages(), vec!["connection lost".to_string()]);
    }
}
