//! # Vigil Service - Lifecycle and orchestration core
//!
//! The composition root of the Vigil monitoring service. It owns:
//!
//! - the service lifecycle state machine (idempotent start/stop, running
//!   state derived from the presence of an active loop handle),
//! - one [`DiscoveryLoop`]: a self-rescheduling, single-flight timer that
//!   refreshes the resource inventory and tolerates per-cycle failures,
//! - the resource/monitor registries and the logging facade, both delegated
//!   to the `vigil-registry` and `vigil-log` crates.
//!
//! Resource introspection and health-check logic are supplied by external
//! collaborators behind the `ResourceProvider` and `Monitor` traits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil_registry::{Monitor, MonitorFactory, MonitorOptions};
//! use vigil_service::{Service, ServiceConfig};
//!
//! # struct NullFactory;
//! # impl MonitorFactory for NullFactory {
//! #     fn build(&self, _: &str, _: &MonitorOptions) -> Arc<dyn Monitor> {
//! #         unimplemented!()
//! #     }
//! # }
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Service::new(ServiceConfig::default(), Arc::new(NullFactory));
//!
//! service.attach_log("/var/log/vigil.log").await;
//! service.start().await;
//!
//! // Run one discovery cycle on demand, outside the loop's schedule.
//! let count = service.discover().await?;
//! println!("{count} resources present");
//!
//! service.stop().await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod service;

// Re-export main types
pub use config::{DiscoveryConfig, LogConfig, ServiceConfig};
pub use discovery::{DiscoveryHandle, DiscoveryLoop};
pub use error::{Result, ServiceError};
pub use service::Service;
