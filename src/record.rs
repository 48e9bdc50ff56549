use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;

/// Log severity as produced by the structured log source.
///
/// Ordering follows the escalation sequence, so threshold checks can use
/// plain comparisons (`entry.level >= minimal_level`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    /// "Development panic": panics in development builds, logs in production.
    DPanic,
    Panic,
    Fatal,
}

impl FromStr for LogLevel {
    type Err = std::convert::Infallible;

    /// Parse a level name from a configuration surface.
    ///
    /// Unrecognized names resolve to [`LogLevel::Fatal`], so a typo in config
    /// never silently widens the reporting threshold and always classifies
    /// with the most severe incident severity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            "dpanic" => LogLevel::DPanic,
            "panic" => LogLevel::Panic,
            "fatal" => LogLevel::Fatal,
            _ => LogLevel::Fatal,
        })
    }
}

/// One structured log call, as handed to the bridge by the log source.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        LogEntry {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A single structured field attached to a log call.
///
/// Sequence order within one call is significant: when several error-typed
/// fields occur, the last one is authoritative.
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

/// Distinguishes "this field IS the error" from "this field is metadata".
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Contextual metadata; nested structure is carried as-is.
    Generic(Value),
    /// An error value. Replaces the report's primary error and never
    /// appears in metadata.
    Error(String),
}

impl Field {
    pub fn generic(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Field {
            key: key.into(),
            value: FieldValue::Generic(value.into()),
        }
    }

    pub fn error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Field {
            key: key.into(),
            value: FieldValue::Error(message.into()),
        }
    }
}
