//! Registry error types
//!
//! Error taxonomy for broker operations. Every failure in the core resolves
//! to one of these; nothing here is fatal to the process.

use super::frame::StreamKey;

/// Error type for registry operations
#[derive(Debug, Clone)]
pub enum RegistryError {
    /// Stream name rejected by an enabled blacklist/whitelist
    NameRejected(StreamKey),
    /// Stream already has an active producer
    NameInUse(StreamKey),
    /// No producer and no reachable upstream for this name
    NotFound(StreamKey),
    /// Frame dispatched after the producer was removed
    NotProducing(StreamKey),
    /// A sink with this id is already attached to the stream
    SinkExists(StreamKey, String),
    /// Upstream pull handoff did not complete in time
    Timeout(StreamKey),
    /// Stream path is not a valid `app/name` pair
    BadName(String),
    /// Upstream descriptor already present in the catalog
    UpstreamExists(String),
    /// Upstream descriptor not present in the catalog
    UpstreamNotFound(String),
    /// Configuration could not be loaded or parsed
    Config(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::NameRejected(key) => write!(f, "Stream name rejected: {}", key),
            RegistryError::NameInUse(key) => {
                write!(f, "Stream already has a producer: {}", key)
            }
            RegistryError::NotFound(key) => write!(f, "Stream not found: {}", key),
            RegistryError::NotProducing(key) => write!(f, "Stream not producing: {}", key),
            RegistryError::SinkExists(key, id) => {
                write!(f, "Sink {} already attached to {}", id, key)
            }
            RegistryError::Timeout(key) => write!(f, "Upstream pull timed out: {}", key),
            RegistryError::BadName(path) => write!(f, "Invalid stream path: {}", path),
            RegistryError::UpstreamExists(id) => {
                write!(f, "Upstream descriptor already exists: {}", id)
            }
            RegistryError::UpstreamNotFound(id) => {
                write!(f, "Upstream descriptor not found: {}", id)
            }
            RegistryError::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}
