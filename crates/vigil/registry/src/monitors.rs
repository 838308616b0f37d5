//! Monitor registry: define-or-reconfigure dispatch over external monitor
//! instances.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vigil_log::Logger;

use crate::error::{BoxError, RegistryError, Result};

/// Options applied to a monitor when it is defined or reconfigured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorOptions {
    /// Name of the resource the monitor is bound to.
    pub resource: String,

    /// Open-ended remainder of the option shape. Validation belongs to the
    /// monitor implementation, not this registry.
    #[serde(default)]
    pub params: Value,
}

impl MonitorOptions {
    /// Options binding a monitor to `resource`, with no extra parameters.
    pub fn for_resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Value::Null,
        }
    }

    /// Attach extra parameters.
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

/// Contract expected of monitor instances.
///
/// A monitor owns its internal scheduling once started; this core only
/// dispatches configuration and the one start call.
#[async_trait]
pub trait Monitor: Send + Sync {
    /// Apply options to the monitor.
    async fn configure(&self, options: &MonitorOptions) -> std::result::Result<(), BoxError>;

    /// Begin the monitor's own periodic checking.
    async fn start(&self);
}

/// Constructs monitor instances for the registry.
///
/// Injected at service construction since the monitor implementation is an
/// external collaborator.
pub trait MonitorFactory: Send + Sync {
    /// Build a new monitor named `name`, bound to `options.resource`.
    fn build(&self, name: &str, options: &MonitorOptions) -> Arc<dyn Monitor>;
}

/// Registry of monitor instances keyed by unique name.
pub struct MonitorRegistry {
    monitors: DashMap<String, Arc<dyn Monitor>>,
    factory: Arc<dyn MonitorFactory>,
    logger: Arc<Logger>,
}

impl MonitorRegistry {
    /// Create an empty registry constructing instances via `factory`.
    pub fn new(factory: Arc<dyn MonitorFactory>, logger: Arc<Logger>) -> Self {
        Self {
            monitors: DashMap::new(),
            factory,
            logger,
        }
    }

    /// Define a monitor under `name`, or reconfigure the existing one.
    ///
    /// An unknown name constructs a new instance bound to
    /// `options.resource` and configures it; a known name reconfigures the
    /// existing instance in place. Exactly one instance ever exists per
    /// name.
    pub async fn define_or_configure(&self, name: &str, options: MonitorOptions) -> Result<()> {
        // The entry guard both decides and inserts, so two racing callers
        // cannot each construct an instance for the same name.
        let (monitor, created) = match self.monitors.entry(name.to_string()) {
            Entry::Occupied(existing) => (existing.get().clone(), false),
            Entry::Vacant(slot) => {
                let monitor = self.factory.build(name, &options);
                slot.insert(monitor.clone());
                (monitor, true)
            }
        };

        if created {
            self.logger.info(&format!("defining {name} monitor")).await;
        } else {
            self.logger
                .info(&format!("configuring {name} monitor"))
                .await;
        }

        monitor
            .configure(&options)
            .await
            .map_err(|source| RegistryError::MonitorConfig {
                name: name.to_string(),
                source,
            })
    }

    /// Start every registered monitor. Used once at service start.
    pub async fn start_all(&self) {
        let snapshot: Vec<Arc<dyn Monitor>> =
            self.monitors.iter().map(|e| e.value().clone()).collect();
        for monitor in snapshot {
            monitor.start().await;
        }
    }

    /// Names of all registered monitors.
    pub fn monitor_names(&self) -> Vec<String> {
        self.monitors.iter().map(|e| e.key().clone()).collect()
    }

    /// Number of registered monitors.
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_log::MemoryConsole;

    #[derive(Default)]
    struct RecordingMonitor {
        configures: AtomicUsize,
        starts: AtomicUsize,
    }

    #[async_trait]
    impl Monitor for RecordingMonitor {
        async fn configure(&self, _options: &MonitorOptions) -> std::result::Result<(), BoxError> {
            self.configures.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        builds: AtomicUsize,
        last: parking_lot::Mutex<Option<Arc<RecordingMonitor>>>,
    }

    impl MonitorFactory for CountingFactory {
        fn build(&self, _name: &str, _options: &MonitorOptions) -> Arc<dyn Monitor> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            let monitor = Arc::new(RecordingMonitor::default());
            *self.last.lock() = Some(monitor.clone());
            monitor
        }
    }

    struct RejectingMonitor;

    #[async_trait]
    impl Monitor for RejectingMonitor {
        async fn configure(&self, _options: &MonitorOptions) -> std::result::Result<(), BoxError> {
            Err("bad options".into())
        }

        async fn start(&self) {}
    }

    struct RejectingFactory;

    impl MonitorFactory for RejectingFactory {
        fn build(&self, _name: &str, _options: &MonitorOptions) -> Arc<dyn Monitor> {
            Arc::new(RejectingMonitor)
        }
    }

    #[tokio::test]
    async fn test_define_then_reconfigure_reuses_the_instance() {
        let factory = Arc::new(CountingFactory::default());
        let logger = Arc::new(Logger::new());
        let console = Arc::new(MemoryConsole::new());
        logger.attach_console(console.clone());
        logger.louder();
        logger.louder();

        let registry = MonitorRegistry::new(factory.clone(), logger);

        registry
            .define_or_configure("m", MonitorOptions::for_resource("disk"))
            .await
            .unwrap();
        registry
            .define_or_configure("m", MonitorOptions::for_resource("disk"))
            .await
            .unwrap();

        // One instance, configured both times.
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
        let monitor = factory.last.lock().clone().unwrap();
        assert_eq!(monitor.configures.load(Ordering::SeqCst), 2);

        assert_eq!(
            console.lines(),
            vec!["defining m monitor", "configuring m monitor"]
        );
    }

    #[tokio::test]
    async fn test_start_all_starts_every_monitor() {
        let factory = Arc::new(CountingFactory::default());
        let registry = MonitorRegistry::new(factory.clone(), Arc::new(Logger::new()));

        registry
            .define_or_configure("a", MonitorOptions::for_resource("disk"))
            .await
            .unwrap();
        let first = factory.last.lock().clone().unwrap();
        registry
            .define_or_configure("b", MonitorOptions::for_resource("net"))
            .await
            .unwrap();
        let second = factory.last.lock().clone().unwrap();

        registry.start_all().await;

        assert_eq!(first.starts.load(Ordering::SeqCst), 1);
        assert_eq!(second.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_configure_rejection_surfaces_to_the_caller() {
        let registry = MonitorRegistry::new(Arc::new(RejectingFactory), Arc::new(Logger::new()));

        let outcome = registry
            .define_or_configure("m", MonitorOptions::for_resource("disk"))
            .await;
        assert!(matches!(
            outcome,
            Err(RegistryError::MonitorConfig { name, .. }) if name == "m"
        ));

        // The instance exists even though configuration was rejected;
        // a later call reconfigures it rather than rebuilding.
        assert_eq!(registry.len(), 1);
    }
}
