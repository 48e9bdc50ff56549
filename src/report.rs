use crate::record::{Field, FieldValue};
use crate::severity::Severity;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One resolved stack frame of a captured trace.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// A captured stack trace, ordered innermost frame first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stacktrace {
    pub frames: Vec<Frame>,
}

impl Stacktrace {
    pub fn empty() -> Self {
        Stacktrace { frames: Vec::new() }
    }

    /// Capture and symbolize the current call stack.
    ///
    /// The trace still contains the bridge's own leading frames at this
    /// point; [`crate::trim::StackTrimmer`] removes them before the report
    /// reaches the notifier.
    pub fn capture() -> Self {
        let bt = backtrace::Backtrace::new();
        let mut frames = Vec::new();
        for frame in bt.frames() {
            for symbol in frame.symbols() {
                frames.push(Frame {
                    function: symbol.name().map(|n| n.to_string()),
                    file: symbol.filename().map(|p| p.display().to_string()),
                    line: symbol.lineno(),
                });
            }
        }
        Stacktrace { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Discard up to `count` leading frames. Saturates: a trace shorter than
    /// `count` becomes empty rather than an error.
    pub fn drop_leading(&mut self, count: usize) {
        let n = count.min(self.frames.len());
        self.frames.drain(..n);
    }
}

/// The primary error of an incident report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportedError {
    pub message: String,
    pub stacktrace: Stacktrace,
}

impl ReportedError {
    pub fn new(message: impl Into<String>) -> Self {
        ReportedError {
            message: message.into(),
            stacktrace: Stacktrace::empty(),
        }
    }
}

/// What the notifier ultimately transmits. Built fresh per `write` call and
/// never persisted by the bridge.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentReport {
    pub error: ReportedError,
    pub severity: Severity,
    pub metadata: BTreeMap<String, Value>,
}

/// Split a log call's field sequence into (primary error, metadata).
///
/// The primary error starts as a synthetic error carrying the entry message.
/// Error-typed fields replace it and are excluded from metadata; if several
/// occur, the last one in sequence order wins and earlier ones are dropped
/// entirely. Generic fields are inserted under their key, last-wins on
/// collision; nested values are carried as-is.
pub fn flatten(message: &str, fields: &[Field]) -> (ReportedError, BTreeMap<String, Value>) {
    let mut primary = ReportedError::new(message);
    let mut metadata = BTreeMap::new();

    for field in fields {
        match &field.value {
            FieldValue::Error(msg) => {
                primary = ReportedError::new(msg.clone());
            }
            FieldValue::Generic(value) => {
                metadata.insert(field.key.clone(), value.clone());
            }
        }
    }

    (primary, metadata)
}
