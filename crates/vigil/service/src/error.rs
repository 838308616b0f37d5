//! Service error types

use thiserror::Error;
use vigil_log::LogError;
use vigil_registry::RegistryError;

/// Errors surfaced by direct, caller-invoked service operations.
///
/// Failures inside the background discovery loop never reach this type;
/// they are contained at the cycle boundary and reported through the
/// logging subsystem.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Log(#[from] LogError),
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
