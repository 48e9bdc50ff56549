use crate::notifier::{Notifier, NotifyError};
use crate::record::{Field, FieldValue, LogEntry, LogLevel};
use crate::report::{flatten, IncidentReport, Stacktrace};
use crate::scope::ScopedFields;
use crate::severity::Severity;
use crate::trim::BeforeNotify;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Stack-capture settings for a bridge instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceOptions {
    /// When set, reports carry an empty stack trace.
    pub disabled: bool,
}

/// The bridge core: gates entries against the minimal level, assembles
/// incident reports and hands them to the notifier.
///
/// Everything a constructed bridge holds is immutable, so a shared
/// `Arc<Bridge>` is safe for any number of concurrent `check`/`write`/`with`
/// callers without locking. Scope derivation never mutates the receiver; it
/// returns a fresh instance.
pub struct Bridge {
    minimal_level: LogLevel,
    trace: TraceOptions,
    fields: ScopedFields,
    tags: BTreeMap<String, String>,
    notifier: Arc<dyn Notifier>,
    hooks: Arc<[Box<dyn BeforeNotify>]>,
}

impl Bridge {
    pub(crate) fn new(
        notifier: Arc<dyn Notifier>,
        minimal_level: LogLevel,
        trace: TraceOptions,
        tags: BTreeMap<String, String>,
        hooks: Vec<Box<dyn BeforeNotify>>,
    ) -> Self {
        Bridge {
            minimal_level,
            trace,
            fields: ScopedFields::new(),
            tags,
            notifier,
            hooks: Arc::from(hooks),
        }
    }

    /// Cheap, side-effect-free gate: is this entry severe enough to report?
    /// The threshold itself is inclusive.
    pub fn check(&self, entry: &LogEntry) -> bool {
        entry.level >= self.minimal_level
    }

    /// Build an incident report for an enabled entry and initiate delivery.
    ///
    /// The scope's baseline fields sit under the per-call metadata, per-call
    /// values winning on collision. A synchronous initiation failure from the
    /// notifier is returned unchanged; the asynchronous delivery outcome is
    /// neither awaited nor inspected here.
    pub fn write(&self, entry: &LogEntry, fields: &[Field]) -> Result<(), NotifyError> {
        let (mut primary, call_meta) = flatten(&entry.message, fields);
        let metadata = self.fields.merged_with(call_meta).to_map();

        if !self.trace.disabled {
            primary.stacktrace = Stacktrace::capture();
        }

        let mut report = IncidentReport {
            error: primary,
            severity: Severity::from(entry.level),
            metadata,
        };
        for hook in self.hooks.iter() {
            hook.before_notify(&mut report);
        }

        self.notifier.capture(report, &self.tags)?;
        Ok(())
    }

    /// Nothing is buffered at this layer, so there is nothing to flush.
    pub fn sync(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    /// Derive a bridge whose baseline fields are this scope's fields plus
    /// `fields` applied on top. Level, trace options, notifier and hooks are
    /// carried over. Tags are not carried into derived scopes: a `write` on
    /// the derived bridge reports with an empty tag set.
    pub fn with(&self, fields: &[Field]) -> Bridge {
        let mut extra = BTreeMap::new();
        for field in fields {
            let value = match &field.value {
                FieldValue::Generic(v) => v.clone(),
                FieldValue::Error(msg) => Value::String(msg.clone()),
            };
            extra.insert(field.key.clone(), value);
        }

        Bridge {
            minimal_level: self.minimal_level,
            trace: self.trace,
            fields: self.fields.merged_with(extra),
            tags: BTreeMap::new(),
            notifier: Arc::clone(&self.notifier),
            hooks: Arc::clone(&self.hooks),
        }
    }

    pub fn minimal_level(&self) -> LogLevel {
        self.minimal_level
    }

    pub fn scoped_fields(&self) -> &ScopedFields {
        &self.fields
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::CaptureAck;
    use crate::trim::StackTrimmer;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct CapturingNotifier {
        captured: Mutex<Vec<(IncidentReport, BTreeMap<String, String>)>>,
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        fn capture(
            &self,
            report: IncidentReport,
            tags: &BTreeMap<String, String>,
        ) -> Result<CaptureAck, NotifyError> {
            let mut captured = self.captured.lock().unwrap();
            captured.push((report, tags.clone()));
            let (tx, rx) = oneshot::channel();
            let _ = tx.send(Ok(()));
            Ok(CaptureAck {
                event_id: format!("test-{}", captured.len()),
                delivery: rx,
            })
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        fn capture(
            &self,
            _report: IncidentReport,
            _tags: &BTreeMap<String, String>,
        ) -> Result<CaptureAck, NotifyError> {
            Err(NotifyError::Rejected("tracker offline".into()))
        }
    }

    fn bridge_with(notifier: Arc<dyn Notifier>, minimal: LogLevel) -> Bridge {
        Bridge::new(
            notifier,
            minimal,
            TraceOptions { disabled: true },
            BTreeMap::from([("env".to_string(), "prod".to_string())]),
            vec![Box::new(StackTrimmer::default())],
        )
    }

    #[test]
    fn check_threshold_is_inclusive() {
        let bridge = bridge_with(Arc::new(CapturingNotifier::default()), LogLevel::Warn);
        assert!(!bridge.check(&LogEntry::new(LogLevel::Info, "x")));
        assert!(bridge.check(&LogEntry::new(LogLevel::Warn, "x")));
        assert!(bridge.check(&LogEntry::new(LogLevel::Error, "x")));
    }

    #[test]
    fn disk_low_scenario() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Warn);

        let entry = LogEntry::new(LogLevel::Warn, "disk low");
        bridge
            .write(&entry, &[Field::generic("volume", "/data")])
            .unwrap();

        let captured = notifier.captured.lock().unwrap();
        let (report, tags) = &captured[0];
        assert_eq!(report.severity, Severity::Warning);
        assert_eq!(report.error.message, "disk low");
        assert_eq!(report.metadata.get("volume"), Some(&json!("/data")));
        assert_eq!(tags.get("env"), Some(&"prod".to_string()));
    }

    #[test]
    fn last_error_field_becomes_the_reported_error() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Debug);

        let entry = LogEntry::new(LogLevel::Error, "request failed");
        bridge
            .write(
                &entry,
                &[
                    Field::error("io", "connection reset"),
                    Field::error("db", "transaction aborted"),
                    Field::generic("route", "/api/v1/users"),
                ],
            )
            .unwrap();

        let captured = notifier.captured.lock().unwrap();
        let (report, _) = &captured[0];
        assert_eq!(report.error.message, "transaction aborted");
        assert!(!report.metadata.contains_key("io"));
        assert!(!report.metadata.contains_key("db"));
        assert_eq!(report.metadata.get("route"), Some(&json!("/api/v1/users")));
    }

    #[test]
    fn with_never_mutates_the_receiver() {
        let bridge = bridge_with(Arc::new(CapturingNotifier::default()), LogLevel::Error);
        let derived = bridge.with(&[Field::generic("pod", "api-7")]);

        assert!(bridge.scoped_fields().is_empty());
        assert_eq!(derived.scoped_fields().get("pod"), Some(&json!("api-7")));
    }

    #[test]
    fn chained_scopes_merge_with_inner_winning() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Debug);

        let derived = bridge
            .with(&[
                Field::generic("region", "eu-west"),
                Field::generic("pod", "api-7"),
            ])
            .with(&[Field::generic("region", "us-east")]);

        derived
            .write(&LogEntry::new(LogLevel::Error, "boom"), &[])
            .unwrap();

        let captured = notifier.captured.lock().unwrap();
        let (report, _) = &captured[0];
        assert_eq!(report.metadata.get("region"), Some(&json!("us-east")));
        assert_eq!(report.metadata.get("pod"), Some(&json!("api-7")));
    }

    #[test]
    fn per_call_fields_override_scoped_baseline() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Debug);

        let derived = bridge.with(&[Field::generic("region", "eu-west")]);
        derived
            .write(
                &LogEntry::new(LogLevel::Error, "boom"),
                &[Field::generic("region", "local")],
            )
            .unwrap();

        let captured = notifier.captured.lock().unwrap();
        assert_eq!(captured[0].0.metadata.get("region"), Some(&json!("local")));
    }

    #[test]
    fn tags_are_not_carried_into_derived_scopes() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Debug);
        assert!(!bridge.tags().is_empty());

        let derived = bridge.with(&[Field::generic("pod", "api-7")]);
        assert!(derived.tags().is_empty());

        derived
            .write(&LogEntry::new(LogLevel::Error, "boom"), &[])
            .unwrap();
        let captured = notifier.captured.lock().unwrap();
        assert!(captured[0].1.is_empty());
    }

    #[test]
    fn notifier_failure_is_returned_unchanged() {
        let bridge = bridge_with(Arc::new(FailingNotifier), LogLevel::Debug);
        let err = bridge
            .write(&LogEntry::new(LogLevel::Error, "boom"), &[])
            .unwrap_err();
        assert!(matches!(err, NotifyError::Rejected(msg) if msg == "tracker offline"));
    }

    #[test]
    fn sync_always_succeeds() {
        let bridge = bridge_with(Arc::new(CapturingNotifier::default()), LogLevel::Error);
        assert!(bridge.sync().is_ok());
    }

    #[test]
    fn disabled_trace_yields_empty_stacktrace() {
        let notifier = Arc::new(CapturingNotifier::default());
        let bridge = bridge_with(notifier.clone(), LogLevel::Debug);
        bridge
            .write(&LogEntry::new(LogLevel::Error, "boom"), &[])
            .unwrap();
        let captured = notifier.captured.lock().unwrap();
        assert!(captured[0].0.error.stacktrace.is_empty());
    }
}
