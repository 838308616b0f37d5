//! Resource provider contract and discovery types.
//!
//! A provider supplies instances of one external resource type. Discovery is
//! optional: the default `discover` body reports no capability, so such
//! providers contribute zero instances to a cycle without erroring.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vigil_log::Logger;

use crate::error::BoxError;

/// A resource instance reported by a provider during a discovery cycle.
///
/// The core does not persist these beyond handing them back to the caller of
/// the cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredResource {
    /// Name of the registered provider that reported the instance.
    pub provider: String,

    /// Provider-scoped identifier of the instance.
    pub id: String,

    /// Free-form kind label, e.g. "host" or "container".
    pub kind: String,

    /// When the instance was observed.
    pub discovered_at: DateTime<Utc>,
}

impl DiscoveredResource {
    /// Create an instance observed now.
    pub fn new(
        provider: impl Into<String>,
        id: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            id: id.into(),
            kind: kind.into(),
            discovered_at: Utc::now(),
        }
    }
}

/// The view of the owning service handed to providers during discovery.
///
/// Deliberately narrow: providers get the shared logger for status
/// reporting, not the service itself.
#[derive(Clone)]
pub struct DiscoveryContext {
    logger: Arc<Logger>,
}

impl DiscoveryContext {
    /// Create a context around a shared logger.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// The service's logger.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }
}

/// Contract expected of resource providers.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Report the currently-present instances of this resource.
    ///
    /// The default implementation marks the provider as lacking discovery
    /// capability: it is skipped during a cycle, contributing zero instances
    /// and no error. A failure from an overriding implementation fails the
    /// whole cycle's aggregate result.
    async fn discover(
        &self,
        cx: &DiscoveryContext,
    ) -> std::result::Result<Vec<DiscoveredResource>, BoxError> {
        let _ = cx;
        Ok(Vec::new())
    }
}
