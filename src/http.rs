use crate::notifier::{CaptureAck, HttpNotifierConfig, Notifier, NotifyError};
use crate::report::IncidentReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration};

/// Built-in [`Notifier`] that POSTs one JSON payload per incident to an
/// HTTP ingestion endpoint.
///
/// `capture` only serializes the payload and spawns the delivery task; the
/// network round-trip happens off the calling thread and its outcome is
/// reported through the ack's delivery channel.
pub struct HttpNotifier {
    client: Client,
    config: HttpNotifierConfig,
    next_event: AtomicU64,
    in_flight: Arc<AtomicU64>,
}

#[derive(Serialize)]
struct IncidentPayload {
    received_at: DateTime<Utc>,
    service_name: Option<String>,
    #[serde(flatten)]
    report: IncidentReport,
    tags: BTreeMap<String, String>,
}

impl HttpNotifier {
    /// Construct a notifier from validated transport settings. Endpoint
    /// validation happens in
    /// [`crate::notifier::make_notifier_from_config`].
    pub fn new(config: HttpNotifierConfig) -> Self {
        HttpNotifier {
            client: Client::new(),
            config,
            next_event: AtomicU64::new(0),
            in_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    fn map_payload(&self, report: IncidentReport, tags: &BTreeMap<String, String>) -> IncidentPayload {
        IncidentPayload {
            received_at: Utc::now(),
            service_name: self.config.service_name.clone(),
            report,
            tags: tags.clone(),
        }
    }
}

async fn deliver(
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    body: String,
) -> Result<(), NotifyError> {
    let mut request = client
        .post(&endpoint)
        .header("content-type", "application/json")
        .body(body);
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }

    let resp = request
        .send()
        .await
        .map_err(|e| NotifyError::Transport(e.to_string()))?;

    if resp.status().is_success() {
        Ok(())
    } else {
        Err(NotifyError::Http {
            status: resp.status().as_u16(),
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    fn capture(
        &self,
        report: IncidentReport,
        tags: &BTreeMap<String, String>,
    ) -> Result<CaptureAck, NotifyError> {
        let payload = self.map_payload(report, tags);
        let body = serde_json::to_string(&payload)?;

        let handle = tokio::runtime::Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;

        let seq = self.next_event.fetch_add(1, Ordering::Relaxed) + 1;
        let event_id = format!("incident-{seq}");

        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let endpoint = self.config.endpoint.clone();
        let api_key = self.config.api_key.clone();
        let in_flight = Arc::clone(&self.in_flight);

        in_flight.fetch_add(1, Ordering::SeqCst);
        handle.spawn(async move {
            let outcome = deliver(client, endpoint, api_key, body).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            // Receiver may already be gone; delivery outcome is advisory.
            let _ = tx.send(outcome);
        });

        Ok(CaptureAck {
            event_id,
            delivery: rx,
        })
    }

    async fn wait_for_delivery(&self) {
        while self.in_flight.load(Ordering::SeqCst) > 0 {
            sleep(Duration::from_millis(10)).await;
        }
    }
}
