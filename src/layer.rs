use crate::bridge::Bridge;
use crate::record::{Field, LogEntry, LogLevel};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::Visit;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that feeds events into a [`Bridge`].
///
/// Each event runs through the bridge's cheap `check` gate first; enabled
/// events are converted into a [`LogEntry`] plus ordered [`Field`]s and
/// written synchronously. Failures on the synchronous path are printed to
/// stderr and dropped: the adapter must not log through the pipeline it
/// backs.
pub struct BridgeLayer {
    bridge: Arc<Bridge>,
    /// Total events seen by the layer (before level gating).
    pub total_events: Arc<AtomicU64>,
    /// Events for which a capture was successfully initiated.
    pub reported_events: Arc<AtomicU64>,
    /// Events whose capture initiation failed.
    pub failed_events: Arc<AtomicU64>,
}

impl BridgeLayer {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        BridgeLayer {
            bridge,
            total_events: Arc::new(AtomicU64::new(0)),
            reported_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

fn map_level(level: &Level) -> LogLevel {
    if *level == Level::ERROR {
        LogLevel::Error
    } else if *level == Level::WARN {
        LogLevel::Warn
    } else if *level == Level::INFO {
        LogLevel::Info
    } else {
        LogLevel::Debug
    }
}

impl<S> Layer<S> for BridgeLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut fields = Vec::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let meta = event.metadata();
        let entry = LogEntry {
            level: map_level(meta.level()),
            message: message.unwrap_or_else(|| meta.target().to_string()),
            timestamp: Utc::now(),
        };

        if !self.bridge.check(&entry) {
            return;
        }

        match self.bridge.write(&entry, &fields) {
            Ok(()) => {
                self.reported_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to report incident: {}", e);
            }
        }
    }
}

/// Collects an event's fields in encounter order, keeping the `message`
/// field separate and mapping error values to error-typed bridge fields.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Vec<Field>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.push(Field::generic(field.name(), value));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .push(Field::generic(field.name(), serde_json::Value::from(value)));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .push(Field::generic(field.name(), serde_json::Value::from(value)));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .push(Field::generic(field.name(), serde_json::Value::from(value)));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .push(Field::generic(field.name(), serde_json::Value::from(value)));
    }

    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.fields.push(Field::error(field.name(), value.to_string()));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields
                .push(Field::generic(field.name(), format!("{:?}", value)));
        }
    }
}
