use crate::report::IncidentReport;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Handle returned by a successful [`Notifier::capture`] initiation.
///
/// `delivery` resolves with the asynchronous delivery outcome. The bridge
/// itself never awaits it; callers that care about eventual delivery may.
#[derive(Debug)]
pub struct CaptureAck {
    pub event_id: String,
    pub delivery: oneshot::Receiver<Result<(), NotifyError>>,
}

/// External error-reporting client that transmits incident reports.
///
/// `capture` initiates delivery synchronously and returns immediately;
/// transport happens in the background. The bridge inspects only `capture`'s
/// direct return value, so delivery failures after initiation are invisible
/// to the logging call site.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Begin delivery of one report together with the process-wide tags.
    ///
    /// **Returns**
    /// - `Ok(ack)` if delivery was initiated; `ack.delivery` later resolves
    ///   with the transport outcome.
    /// - `Err(..)` if initiation itself failed (serialization, no runtime,
    ///   client construction). This is the only error path `write` surfaces.
    fn capture(
        &self,
        report: IncidentReport,
        tags: &BTreeMap<String, String>,
    ) -> Result<CaptureAck, NotifyError>;

    /// Wait until all initiated deliveries have settled.
    ///
    /// Default implementation returns immediately; notifiers that track
    /// in-flight deliveries override it.
    async fn wait_for_delivery(&self) {}
}

/// Error returned when the synchronous initiation of a capture fails.
#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("failed to serialize incident report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no tokio runtime available to initiate delivery")]
    NoRuntime,

    #[error("incident endpoint rejected the report with status {status}")]
    Http { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("notifier rejected the report: {0}")]
    Rejected(String),
}

/// Error returned when building a notifier from configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("incident endpoint URL is empty")]
    EmptyEndpoint,

    #[error("incident endpoint must start with http:// or https://, got {0:?}")]
    InvalidEndpoint(String),

    #[error("http feature is not enabled")]
    HttpFeatureDisabled,
}

/// Transport settings for the built-in HTTP notifier.
///
/// Kept outside the `http` module so configuration can be parsed and
/// validated even when the feature is disabled.
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Full ingestion URL, e.g. "https://tracker.internal/api/incidents".
    pub endpoint: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Logical reporting service name attached to every payload.
    pub service_name: Option<String>,
}

/// Opaque notifier selection carried by the bridge configuration. The bridge
/// passes it through to [`make_notifier_from_config`] unmodified.
#[derive(Clone)]
pub enum NotifierConfig {
    /// Built-in reqwest-based JSON notifier (requires the `http` feature).
    Http(HttpNotifierConfig),
    /// Caller-provided notifier implementation.
    Custom(Arc<dyn Notifier>),
}

/// Create a concrete [`Notifier`] from a [`NotifierConfig`].
///
/// This is the single fallible step of initialization: endpoint validation
/// happens here, so a misconfigured tracker is rejected before the bridge
/// singleton is published.
pub fn make_notifier_from_config(cfg: &NotifierConfig) -> Result<Arc<dyn Notifier>, ConfigError> {
    match cfg {
        NotifierConfig::Http(http_cfg) => {
            if http_cfg.endpoint.is_empty() {
                return Err(ConfigError::EmptyEndpoint);
            }
            let lower = http_cfg.endpoint.to_ascii_lowercase();
            if !lower.starts_with("http://") && !lower.starts_with("https://") {
                return Err(ConfigError::InvalidEndpoint(http_cfg.endpoint.clone()));
            }

            #[cfg(feature = "http")]
            {
                let notifier = crate::http::HttpNotifier::new(http_cfg.clone());
                Ok(Arc::new(notifier) as Arc<dyn Notifier>)
            }

            #[cfg(not(feature = "http"))]
            {
                Err(ConfigError::HttpFeatureDisabled)
            }
        }
        NotifierConfig::Custom(notifier) => Ok(Arc::clone(notifier)),
    }
}
