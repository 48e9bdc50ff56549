//! Send error events from `tracing` to an HTTP incident endpoint.
//!
//! Configure the endpoint via `INCIDENT_ENDPOINT`, then:
//!     cargo run --example basic

use tracing_incident_bridge::env::http_config_from_env;
use tracing_incident_bridge::init::{initialize, BridgeConfig};
use tracing_incident_bridge::layer::BridgeLayer;
use tracing_incident_bridge::notifier::NotifierConfig;
use tracing_incident_bridge::record::LogLevel;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

#[tokio::main]
async fn main() {
    let mut http = http_config_from_env();
    if http.endpoint.is_empty() {
        http.endpoint = "http://127.0.0.1:8080/api/incidents".to_string();
    }

    let mut config = BridgeConfig::new(NotifierConfig::Http(http));
    config.tags.insert("env".into(), "demo".into());
    config.minimal_level = Some(LogLevel::Warn);

    let bridge = initialize(config).expect("initialize bridge");

    let subscriber = Registry::default()
        .with(BridgeLayer::new(bridge))
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");

    tracing::info!("routine startup, below the reporting threshold");
    tracing::warn!(volume = "/data", "disk low");
    tracing::error!(route = "/api/v1/users", "request failed");

    // Give the spawned delivery tasks a moment before the process exits.
    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
}
