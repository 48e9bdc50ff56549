//! Drive the bridge directly and derive nested scopes with `with`.

use std::sync::Arc;
use tracing_incident_bridge::init::{initialize, BridgeConfig};
use tracing_incident_bridge::noop_notifier::NoopNotifier;
use tracing_incident_bridge::notifier::NotifierConfig;
use tracing_incident_bridge::record::{Field, LogEntry, LogLevel};

fn main() {
    let notifier = Arc::new(NoopNotifier::new());

    let mut config = BridgeConfig::new(NotifierConfig::Custom(notifier.clone()));
    config.minimal_level = Some(LogLevel::Warn);
    config.tags.insert("env".into(), "demo".into());

    let bridge = initialize(config).expect("initialize bridge");

    // Baseline fields accumulate across derived scopes without mutating the
    // parent; tags stay on the root bridge.
    let request_scope = bridge
        .with(&[Field::generic("region", "eu-west")])
        .with(&[Field::generic("request_id", "req-42")]);

    let entry = LogEntry::new(LogLevel::Error, "request failed");
    if request_scope.check(&entry) {
        request_scope
            .write(&entry, &[Field::error("cause", "upstream timeout")])
            .expect("capture initiation");
    }

    println!("reports accepted by the noop notifier: {}", notifier.captured());
}
