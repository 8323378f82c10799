//! Error types for broker operations and configuration loading.

use thiserror::Error;

/// A fault raised by the messaging driver.
///
/// The gateways never let one of these cross their boundary: every fault is
/// logged and folded into a `false` or a truncated `Listing`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The client id is empty or already held by another open connection.
    #[error("invalid client id: {0}")]
    InvalidClientId(String),
    /// The handle was used after `close()`.
    #[error("{0} is closed")]
    Closed(&'static str),
    /// A message body was expected to be text.
    #[error("message {0} is not a text message")]
    NotText(String),
    /// The destination name was rejected.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),
    /// Shared broker state is unusable after a panic in another thread.
    #[error("broker lock poisoned during {0}")]
    LockPoisoned(&'static str),
    /// Any other driver fault.
    #[error("broker error: {0}")]
    Other(String),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate resource code: {0}")]
    DuplicateResource(String),
    #[error("resource code must not be empty")]
    EmptyResourceCode,
    #[error("unsupported broker url: {0}")]
    UnsupportedBroker(String),
}
