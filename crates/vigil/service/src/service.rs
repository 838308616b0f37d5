//! The service composition root: lifecycle, registry delegation, and the
//! logging facade.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use vigil_log::{ConsoleSink, LogStream, Logger, Severity};
use vigil_registry::{
    DiscoveryContext, MonitorFactory, MonitorOptions, MonitorRegistry, ResourceProvider,
    ResourceRegistry,
};

use crate::config::ServiceConfig;
use crate::discovery::{DiscoveryHandle, DiscoveryLoop};
use crate::error::Result;

/// The monitoring service core.
///
/// Constructed inert: no loop running, empty registries. `start`/`stop`
/// drive the lifecycle; the running state is exactly the presence of an
/// active [`DiscoveryHandle`], so at most one loop is ever active per
/// service. Registries persist across start/stop cycles.
pub struct Service {
    config: ServiceConfig,
    logger: Arc<Logger>,
    resources: Arc<ResourceRegistry>,
    monitors: Arc<MonitorRegistry>,
    context: DiscoveryContext,
    running: Mutex<Option<DiscoveryHandle>>,
}

impl Service {
    /// Create a service from configuration.
    ///
    /// The monitor implementation is an external collaborator, so the
    /// factory used to construct instances is injected here.
    pub fn new(config: ServiceConfig, monitor_factory: Arc<dyn MonitorFactory>) -> Self {
        let logger = Arc::new(Logger::configured(
            config.logging.file.clone(),
            config.logging.noise,
            config.logging.debug,
        ));
        let resources = Arc::new(ResourceRegistry::new(logger.clone()));
        let monitors = Arc::new(MonitorRegistry::new(monitor_factory, logger.clone()));
        let context = DiscoveryContext::new(logger.clone());

        Self {
            config,
            logger,
            resources,
            monitors,
            context,
            running: Mutex::new(None),
        }
    }

    // --- lifecycle ---

    /// Start the service: begin the discovery loop and start every
    /// currently-registered monitor. No-op while already running.
    pub async fn start(&self) {
        {
            let mut running = self.running.lock().await;
            if running.is_some() {
                debug!("start ignored: service already running");
                return;
            }
            let discovery = DiscoveryLoop::new(
                self.config.discovery.interval(),
                self.resources.clone(),
                self.logger.clone(),
            );
            *running = Some(discovery.start());
        }

        self.monitors.start_all().await;
        self.logger.info("service started").await;
    }

    /// Stop the service: cancel the discovery loop. No-op while already
    /// stopped. Registries are left intact, so a later `start` resumes with
    /// the same registrations.
    pub async fn stop(&self) {
        let handle = self.running.lock().await.take();
        let Some(handle) = handle else {
            debug!("stop ignored: service not running");
            return;
        };

        handle.cancel();
        self.logger.info("service stopped").await;
    }

    /// Readiness predicate: whether a discovery loop is active.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    // --- registries ---

    /// Register a resource provider under a unique name. Fails on a
    /// duplicate name; the second provider is never stored.
    pub fn register_resource(
        &self,
        name: impl Into<String>,
        provider: Arc<dyn ResourceProvider>,
    ) -> Result<()> {
        Ok(self.resources.register(name, provider)?)
    }

    /// Look up a registered resource provider by name.
    pub fn lookup_resource(&self, name: &str) -> Result<Arc<dyn ResourceProvider>> {
        Ok(self.resources.lookup(name)?)
    }

    /// Define a monitor, or reconfigure the existing one with this name.
    pub async fn monitor(&self, name: &str, options: MonitorOptions) -> Result<()> {
        Ok(self.monitors.define_or_configure(name, options).await?)
    }

    /// Run one discovery cycle across all providers now, outside the
    /// loop's schedule. Resolves when the cycle completes, with the
    /// aggregated instance count.
    pub async fn discover(&self) -> Result<usize> {
        let resources = self.resources.discover_all(&self.context).await?;
        Ok(resources.len())
    }

    /// The resource registry.
    pub fn resources(&self) -> &Arc<ResourceRegistry> {
        &self.resources
    }

    /// The monitor registry.
    pub fn monitors(&self) -> &Arc<MonitorRegistry> {
        &self.monitors
    }

    // --- logging facade ---

    /// The shared logger collaborators report through.
    pub fn logger(&self) -> Arc<Logger> {
        self.logger.clone()
    }

    /// Log a message with an explicit timestamp.
    pub async fn log_at(&self, timestamp: DateTime<Utc>, severity: Severity, message: &str) {
        self.logger.log_at(timestamp, severity, message).await;
    }

    /// Log a message stamped with the current time.
    pub async fn log(&self, severity: Severity, message: &str) {
        self.logger.log(severity, message).await;
    }

    /// Log at INFO.
    pub async fn info(&self, message: &str) {
        self.logger.info(message).await;
    }

    /// Log at WARN.
    pub async fn warn(&self, message: &str) {
        self.logger.warn(message).await;
    }

    /// Log at ERRO.
    pub async fn error(&self, message: &str) {
        self.logger.error(message).await;
    }

    /// Log an error value at ERRO, debug-aware.
    pub async fn error_from(&self, err: &(dyn std::error::Error + Sync + 'static)) {
        self.logger.error_from(err).await;
    }

    /// Attach (or swap) the console sink.
    pub fn attach_console(&self, sink: Arc<dyn ConsoleSink>) {
        self.logger.attach_console(sink);
    }

    /// Detach the console sink.
    pub fn detach_console(&self) {
        self.logger.detach_console();
    }

    /// The attached console sink, if any.
    pub fn console(&self) -> Option<Arc<dyn ConsoleSink>> {
        self.logger.console()
    }

    /// Record a lazy log file destination.
    pub async fn attach_log(&self, path: impl Into<PathBuf>) {
        self.logger.attach_log(path).await;
    }

    /// Open a log destination eagerly; see [`Logger::open_log`].
    pub async fn open_log(&self, stream: Option<LogStream>) -> Result<()> {
        Ok(self.logger.open_log(stream).await?)
    }

    /// Close the current log destination.
    pub async fn close_log(&self) {
        self.logger.close_log().await;
    }

    /// Close the destination and clear the attached path.
    pub async fn detach_log(&self) {
        self.logger.detach_log().await;
    }

    /// The attached log file path, if any.
    pub async fn log_path(&self) -> Option<PathBuf> {
        self.logger.log_path().await
    }

    /// Raise the console noise level by one.
    pub fn louder(&self) -> i32 {
        self.logger.louder()
    }

    /// Lower the console noise level by one.
    pub fn quieter(&self) -> i32 {
        self.logger.quieter()
    }

    /// The current noise level.
    pub fn noise_level(&self) -> i32 {
        self.logger.noise_level()
    }

    /// Log error source chains instead of short messages.
    pub fn enable_debugging(&self) {
        self.logger.enable_debugging();
    }

    /// Log only short error messages.
    pub fn disable_debugging(&self) {
        self.logger.disable_debugging();
    }

    /// Whether debug mode is enabled.
    pub fn debug_enabled(&self) -> bool {
        self.logger.debug_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vigil_log::MemoryConsole;
    use vigil_registry::{BoxError, DiscoveredResource, Monitor, RegistryError};

    struct StaticProvider(usize);

    #[async_trait]
    impl ResourceProvider for StaticProvider {
        async fn discover(
            &self,
            _cx: &DiscoveryContext,
        ) -> std::result::Result<Vec<DiscoveredResource>, BoxError> {
            Ok((0..self.0)
                .map(|i| DiscoveredResource::new("static", format!("r-{i}"), "host"))
                .collect())
        }
    }

    #[derive(Default)]
    struct NullMonitor {
        starts: AtomicUsize,
    }

    #[async_trait]
    impl Monitor for NullMonitor {
        async fn configure(&self, _options: &MonitorOptions) -> std::result::Result<(), BoxError> {
            Ok(())
        }

        async fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct NullFactory;

    impl MonitorFactory for NullFactory {
        fn build(&self, _name: &str, _options: &MonitorOptions) -> Arc<dyn Monitor> {
            Arc::new(NullMonitor::default())
        }
    }

    fn service() -> Service {
        Service::new(ServiceConfig::default(), Arc::new(NullFactory))
    }

    fn service_logging_to(path: &std::path::Path) -> Service {
        let mut config = ServiceConfig::default();
        config.logging.file = Some(path.to_path_buf());
        Service::new(config, Arc::new(NullFactory))
    }

    fn lines_matching(path: &std::path::Path, needle: &str) -> usize {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .filter(|l| l.contains(needle))
            .count()
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.log");
        let service = service_logging_to(&path);

        service.start().await;
        service.start().await;

        assert!(service.is_running().await);
        assert_eq!(lines_matching(&path, "service started"), 1);

        service.stop().await;
    }

    #[tokio::test]
    async fn test_stop_before_start_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.log");
        let service = service_logging_to(&path);

        service.stop().await;

        assert!(!service.is_running().await);
        assert_eq!(lines_matching(&path, "service stopped"), 0);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vigil.log");
        let service = service_logging_to(&path);

        service.start().await;
        service.stop().await;
        assert!(!service.is_running().await);

        // Registries survive the stop and a fresh loop can be started.
        service.start().await;
        assert!(service.is_running().await);
        assert_eq!(lines_matching(&path, "service started"), 2);
        assert_eq!(lines_matching(&path, "service stopped"), 1);

        service.stop().await;
    }

    #[tokio::test]
    async fn test_registry_delegation() {
        let service = service();

        service
            .register_resource("disk", Arc::new(StaticProvider(2)))
            .unwrap();
        let duplicate = service.register_resource("disk", Arc::new(StaticProvider(0)));
        assert!(matches!(
            duplicate,
            Err(crate::ServiceError::Registry(RegistryError::DuplicateResource(_)))
        ));

        assert!(service.lookup_resource("disk").is_ok());
        assert!(service.lookup_resource("ghost").is_err());

        service
            .monitor("m", MonitorOptions::for_resource("disk"))
            .await
            .unwrap();
        assert_eq!(service.monitors().len(), 1);
    }

    #[tokio::test]
    async fn test_discover_returns_the_aggregate_count() {
        let service = service();
        service
            .register_resource("a", Arc::new(StaticProvider(2)))
            .unwrap();
        service
            .register_resource("b", Arc::new(StaticProvider(3)))
            .unwrap();

        assert_eq!(service.discover().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_logging_facade_round_trip() {
        let service = service();
        let console = Arc::new(MemoryConsole::new());
        service.attach_console(console.clone());

        assert_eq!(service.noise_level(), 0);
        assert_eq!(service.louder(), 1);
        assert_eq!(service.quieter(), 0);

        service.error("boom").await;
        assert_eq!(console.lines(), vec!["boom"]);

        assert!(!service.debug_enabled());
        service.enable_debugging();
        assert!(service.debug_enabled());
        service.disable_debugging();

        assert!(service.console().is_some());
        service.detach_console();
        assert!(service.console().is_none());
    }
}
