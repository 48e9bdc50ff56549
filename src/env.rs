/// Environment variable names used by this crate for convenient
/// configuration of the HTTP notifier from services.
///
/// These are purely helpers; the core bridge types remain decoupled from
/// environment access.

/// Full ingestion URL of the error tracker, e.g.
/// `https://tracker.internal/api/incidents`.
pub const INCIDENT_ENDPOINT_ENV: &str = "INCIDENT_ENDPOINT";

/// Optional API key, sent as a bearer token.
pub const INCIDENT_API_KEY_ENV: &str = "INCIDENT_API_KEY";

/// Optional logical service name attached to every payload.
pub const INCIDENT_SERVICE_NAME_ENV: &str = "INCIDENT_SERVICE_NAME";

/// Minimal reporting level name (`debug` .. `fatal`).
pub const INCIDENT_MINIMAL_LEVEL_ENV: &str = "INCIDENT_MINIMAL_LEVEL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Build [`crate::notifier::HttpNotifierConfig`] from the environment.
pub fn http_config_from_env() -> crate::notifier::HttpNotifierConfig {
    crate::notifier::HttpNotifierConfig {
        endpoint: env_or(INCIDENT_ENDPOINT_ENV, ""),
        api_key: std::env::var(INCIDENT_API_KEY_ENV).ok(),
        service_name: std::env::var(INCIDENT_SERVICE_NAME_ENV).ok(),
    }
}
