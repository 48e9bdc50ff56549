use crate::record::LogLevel;
use serde::Serialize;

/// Incident-severity vocabulary of the error tracker.
///
/// Every log level maps onto exactly one of these three buckets; there is no
/// "unknown" incident severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl From<LogLevel> for Severity {
    /// Total, pure mapping from log severity to incident severity.
    ///
    /// Everything at `Error` and above lands in the most severe bucket; an
    /// incident is never dropped for carrying a level this table does not
    /// single out.
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug | LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warning,
            LogLevel::Error | LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => {
                Severity::Error
            }
        }
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}
