//! `tracing` integration.
//!
//! [`HookLayer`] is a `tracing_subscriber::Layer` that converts events into
//! [`LogEntry`] values and dispatches them through a [`Logger`]. The event's
//! `message` becomes the entry message; every other field is recorded as a
//! structured field, so `tracing::info!(access_log = true, "GET /")` routes
//! like an access log.

use std::fmt;
use std::sync::Arc;

use serde_json::{Number, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::level::Level;
use crate::log_entry::{Fields, LogEntry, is_own_target, normalise_target};
use crate::logger::Logger;

/// Layer forwarding `tracing` events to a [`Logger`].
#[derive(Clone, Debug)]
pub struct HookLayer {
    logger: Arc<Logger>,
}

impl HookLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        if *level == tracing::Level::ERROR {
            Level::Error
        } else if *level == tracing::Level::WARN {
            Level::Warn
        } else if *level == tracing::Level::INFO {
            Level::Info
        } else if *level == tracing::Level::DEBUG {
            Level::Debug
        } else {
            Level::Trace
        }
    }
}

#[derive(Default)]
struct EntryVisitor {
    message: Option<String>,
    fields: Fields,
}

impl EntryVisitor {
    fn record_value(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_owned(), value);
    }
}

impl Visit for EntryVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.record_value(field, Value::String(value.to_owned()));
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::Bool(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON form
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.record_value(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(text);
        } else {
            self.record_value(field, Value::String(text));
        }
    }
}

impl<S: Subscriber> Layer<S> for HookLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = Level::from(metadata.level());
        if is_own_target(metadata.target()) || !self.logger.is_enabled_for(level) {
            return;
        }
        let mut visitor = EntryVisitor::default();
        event.record(&mut visitor);

        let mut entry = LogEntry::new(
            &normalise_target(metadata.target()),
            level,
            visitor.message.as_deref().unwrap_or_default(),
        );
        entry.fields = visitor.fields;
        self.logger.log_entry(entry);
    }
}
