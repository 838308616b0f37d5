//! Resource registry: name -> provider mapping and concurrent discovery.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use tracing::debug;
use vigil_log::Logger;

use crate::error::{RegistryError, Result};
use crate::provider::{DiscoveredResource, DiscoveryContext, ResourceProvider};

/// Registry of resource providers keyed by unique name.
pub struct ResourceRegistry {
    providers: DashMap<String, Arc<dyn ResourceProvider>>,
    logger: Arc<Logger>,
}

impl ResourceRegistry {
    /// Create an empty registry reporting through the given logger.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            providers: DashMap::new(),
            logger,
        }
    }

    /// Register a provider under `name`.
    ///
    /// Fails-fast with [`RegistryError::DuplicateResource`] when the name is
    /// taken; the new provider is not stored.
    pub fn register(
        &self,
        name: impl Into<String>,
        provider: Arc<dyn ResourceProvider>,
    ) -> Result<()> {
        let name = name.into();
        match self.providers.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateResource(name)),
            Entry::Vacant(slot) => {
                debug!(resource = %name, "registered resource provider");
                slot.insert(provider);
                Ok(())
            }
        }
    }

    /// Look up the provider registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ResourceProvider>> {
        self.providers
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::ResourceNotFound(name.to_string()))
    }

    /// Names of all registered providers.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Run one discovery cycle across all registered providers.
    ///
    /// Providers are snapshotted at call time and their `discover` calls
    /// dispatched concurrently; the aggregate result is the concatenation of
    /// all reported instances, order not significant. Any provider failure
    /// fails the whole cycle with [`RegistryError::Discovery`] naming that
    /// provider. An INFO line with the aggregate count is logged on success.
    pub async fn discover_all(&self, cx: &DiscoveryContext) -> Result<Vec<DiscoveredResource>> {
        let snapshot: Vec<(String, Arc<dyn ResourceProvider>)> = self
            .providers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let provider_count = snapshot.len();

        let calls = snapshot.into_iter().map(|(name, provider)| async move {
            provider
                .discover(cx)
                .await
                .map_err(|source| RegistryError::Discovery {
                    provider: name,
                    source,
                })
        });

        let mut resources = Vec::new();
        for outcome in join_all(calls).await {
            resources.extend(outcome?);
        }

        self.logger
            .info(&format!(
                "discovered {} resources across {} providers",
                resources.len(),
                provider_count
            ))
            .await;

        Ok(resources)
    }
}
