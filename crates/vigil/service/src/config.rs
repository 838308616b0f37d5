//! Configuration for the Vigil service.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main service configuration. No field is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Discovery loop configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

/// Discovery loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Seconds between the completion of one discovery cycle and the start
    /// of the next. Not wall-clock-aligned.
    #[serde(default = "default_discovery_interval")]
    pub interval_secs: u64,
}

impl DiscoveryConfig {
    /// The inter-cycle wait as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_discovery_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log file path; opened lazily in append mode on first write.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Initial console noise level.
    #[serde(default)]
    pub noise: i32,

    /// Log error source chains instead of short messages.
    #[serde(default)]
    pub debug: bool,
}

// Default value helpers
fn default_discovery_interval() -> u64 {
    600 // 10 minutes
}
