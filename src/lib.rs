pub mod record;
pub mod severity;
pub mod report;
pub mod scope;
pub mod trim;
pub mod notifier;
pub mod noop_notifier;

#[cfg(feature = "http")]
pub mod http;

pub mod bridge;
pub mod init;
pub mod layer;
pub mod env;
