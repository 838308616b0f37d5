//! # Vigil Registry - Resource and monitor registries
//!
//! This crate provides the registry infrastructure for the Vigil monitoring
//! core:
//!
//! - [`ResourceRegistry`]: maps unique resource names to provider instances
//!   and fans discovery out across all of them concurrently.
//! - [`MonitorRegistry`]: maps unique monitor names to monitor instances
//!   with define-or-reconfigure semantics.
//! - [`ResourceProvider`] / [`Monitor`] / [`MonitorFactory`]: the contracts
//!   expected of external collaborators. Resource introspection and
//!   health-check logic live behind these traits, not in this crate.
//!
//! ## Consistency rules
//!
//! Resource registration is fails-fast: a name, once registered, cannot be
//! re-registered. Monitor definition is create-or-reuse: the first call for
//! a name constructs an instance, every later call reconfigures that same
//! instance in place.

#![deny(unsafe_code)]

pub mod error;
pub mod monitors;
pub mod provider;
pub mod resources;

// Re-exports
pub use error::{BoxError, RegistryError, Result};
pub use monitors::{Monitor, MonitorFactory, MonitorOptions, MonitorRegistry};
pub use provider::{DiscoveredResource, DiscoveryContext, ResourceProvider};
pub use resources::ResourceRegistry;
