use crate::bridge::{Bridge, TraceOptions};
use crate::notifier::{make_notifier_from_config, ConfigError, NotifierConfig};
use crate::record::LogLevel;
use crate::trim::StackTrimmer;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Everything [`initialize`] needs to stand up the process-wide bridge.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Opaque notifier selection, passed through to the notifier builder.
    pub notifier: NotifierConfig,
    /// Process-wide tags sent with every report from the root bridge.
    /// Derived scopes do not inherit them.
    pub tags: BTreeMap<String, String>,
    pub trace: TraceOptions,
    /// Reporting threshold. `None` means [`LogLevel::Error`].
    pub minimal_level: Option<LogLevel>,
}

impl BridgeConfig {
    pub fn new(notifier: NotifierConfig) -> Self {
        BridgeConfig {
            notifier,
            tags: BTreeMap::new(),
            trace: TraceOptions::default(),
            minimal_level: None,
        }
    }
}

static BRIDGE: OnceCell<Arc<Bridge>> = OnceCell::new();

/// Stand up the process-wide bridge, or return the existing one.
///
/// The first successful call builds the notifier, registers the stack
/// trimmer hook and publishes the bridge; every later call returns that
/// instance unchanged and its configuration argument is ignored. A failed
/// call publishes nothing, so a later call with a valid configuration can
/// still succeed.
pub fn initialize(config: BridgeConfig) -> Result<Arc<Bridge>, ConfigError> {
    if let Some(bridge) = BRIDGE.get() {
        return Ok(Arc::clone(bridge));
    }

    let notifier = make_notifier_from_config(&config.notifier)?;
    let minimal_level = config.minimal_level.unwrap_or(LogLevel::Error);
    let bridge = Arc::new(Bridge::new(
        notifier,
        minimal_level,
        config.trace,
        config.tags,
        vec![Box::new(StackTrimmer::default())],
    ));

    // Concurrent first-time callers may both construct; the cell keeps
    // exactly one and everyone observes the published instance.
    Ok(Arc::clone(BRIDGE.get_or_init(|| bridge)))
}

/// The published bridge, if [`initialize`] has succeeded.
pub fn bridge() -> Option<Arc<Bridge>> {
    BRIDGE.get().map(Arc::clone)
}
