//! Registry error types

use thiserror::Error;

/// Boxed error type collaborator implementations report across the trait
/// boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A resource name was registered twice. The second provider is never
    /// stored.
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    /// A resource name was looked up but never registered.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A provider's discovery call failed, failing the aggregate cycle.
    #[error("discovery failed for provider {provider}: {source}")]
    Discovery {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// A monitor rejected its configuration.
    #[error("monitor {name} rejected configuration: {source}")]
    MonitorConfig {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;
