use crate::notifier::{CaptureAck, Notifier, NotifyError};
use crate::report::IncidentReport;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

/// A notifier that acknowledges every report and drops it.
///
/// Useful for measuring the overhead of the bridge itself without any
/// external I/O, and for unit tests that don't care about delivery.
#[derive(Debug, Default)]
pub struct NoopNotifier {
    captured: AtomicU64,
}

impl NoopNotifier {
    pub fn new() -> Self {
        NoopNotifier::default()
    }

    /// Total reports accepted so far.
    pub fn captured(&self) -> u64 {
        self.captured.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Notifier for NoopNotifier {
    fn capture(
        &self,
        _report: IncidentReport,
        _tags: &BTreeMap<String, String>,
    ) -> Result<CaptureAck, NotifyError> {
        let seq = self.captured.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Ok(()));
        Ok(CaptureAck {
            event_id: format!("noop-{seq}"),
            delivery: rx,
        })
    }
}
