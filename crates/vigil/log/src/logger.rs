//! The logging facade: line formatting, lazy file destination, console
//! mirroring.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

use crate::error::{LogError, Result};
use crate::severity::Severity;
use crate::sink::ConsoleSink;

/// Boxed writable stream a caller can hand to [`Logger::open_log`].
pub type LogStream = Box<dyn AsyncWrite + Send + Unpin>;

/// Noise level at which a severity starts mirroring to the console.
const MIRROR_INFO: i32 = 2;
const MIRROR_WARN: i32 = 1;
const MIRROR_ERROR: i32 = 0;

/// Destination state. Path and open stream share one slot so that a stream
/// is always shut down before being replaced or cleared.
#[derive(Default)]
struct Destination {
    path: Option<PathBuf>,
    stream: Option<LogStream>,
}

impl Destination {
    /// Flush/end and release the open stream, if any.
    async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                warn!(error = %e, "log destination shutdown failed");
            }
        }
    }

    async fn open_path(path: &PathBuf) -> std::io::Result<LogStream> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Box::new(file))
    }
}

/// Formats and emits log lines.
///
/// Lines are written as `<ISO-8601 UTC timestamp> [<SEV>] <message>` to the
/// current destination, and mirrored to the attached console sink when the
/// noise level permits. See the crate docs for the gating rules.
pub struct Logger {
    destination: Mutex<Destination>,
    console: RwLock<Option<Arc<dyn ConsoleSink>>>,
    noise: AtomicI32,
    debug: AtomicBool,
}

impl Logger {
    /// Create a logger with no destination, no console, noise level 0 and
    /// debugging disabled.
    pub fn new() -> Self {
        Self::configured(None, 0, false)
    }

    /// Create a logger from settings, typically a service's logging config.
    ///
    /// The path, if given, is recorded but not opened (lazy open on first
    /// write).
    pub fn configured(path: Option<PathBuf>, noise: i32, debug: bool) -> Self {
        Self {
            destination: Mutex::new(Destination {
                path,
                stream: None,
            }),
            console: RwLock::new(None),
            noise: AtomicI32::new(noise),
            debug: AtomicBool::new(debug),
        }
    }

    // --- emission ---

    /// Log a message with an explicit timestamp.
    pub async fn log_at(&self, timestamp: DateTime<Utc>, severity: Severity, message: &str) {
        let line = format!(
            "{} [{}] {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
            message
        );
        self.append(&line).await;
    }

    /// Log a message stamped with the current time.
    pub async fn log(&self, severity: Severity, message: &str) {
        self.log_at(Utc::now(), severity, message).await;
    }

    /// Log at INFO. Mirrors to the console at noise level 2 and above.
    pub async fn info(&self, message: &str) {
        self.log(Severity::Info, message).await;
        self.mirror(MIRROR_INFO, message);
    }

    /// Log at WARN. Mirrors to the console, prefixed, at noise level 1 and
    /// above.
    pub async fn warn(&self, message: &str) {
        self.log(Severity::Warn, message).await;
        self.mirror(MIRROR_WARN, &format!("warning: {message}"));
    }

    /// Log at ERRO. Mirrors to the console at any noise level, unless the
    /// console is detached.
    pub async fn error(&self, message: &str) {
        self.log(Severity::Error, message).await;
        self.mirror(MIRROR_ERROR, message);
    }

    /// Log an error value at ERRO.
    ///
    /// With debugging enabled the full `source()` chain is logged and
    /// mirrored; otherwise only the top-level message.
    pub async fn error_from(&self, err: &(dyn StdError + Sync + 'static)) {
        let rendered = if self.debug_enabled() {
            render_chain(err)
        } else {
            err.to_string()
        };
        self.log(Severity::Error, &rendered).await;
        self.mirror(MIRROR_ERROR, &rendered);
    }

    // --- console ---

    /// Attach (or swap) the console sink. The sink is shared, not owned.
    pub fn attach_console(&self, sink: Arc<dyn ConsoleSink>) {
        *self.console.write() = Some(sink);
    }

    /// Detach the console sink, suppressing all mirroring.
    pub fn detach_console(&self) {
        *self.console.write() = None;
    }

    /// The currently attached console sink, if any.
    pub fn console(&self) -> Option<Arc<dyn ConsoleSink>> {
        self.console.read().clone()
    }

    /// Raise the noise level by one. Returns the new level.
    pub fn louder(&self) -> i32 {
        self.noise.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Lower the noise level by one. Returns the new level. No lower bound
    /// is enforced.
    pub fn quieter(&self) -> i32 {
        self.noise.fetch_sub(1, Ordering::Relaxed) - 1
    }

    /// The current noise level.
    pub fn noise_level(&self) -> i32 {
        self.noise.load(Ordering::Relaxed)
    }

    // --- debug mode ---

    /// Log error source chains instead of short messages.
    pub fn enable_debugging(&self) {
        self.debug.store(true, Ordering::Relaxed);
    }

    /// Log only the short error message.
    pub fn disable_debugging(&self) {
        self.debug.store(false, Ordering::Relaxed);
    }

    /// Whether debug mode is enabled.
    pub fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    // --- destination lifecycle ---

    /// Close any open destination and record `path` as the lazy file
    /// destination. The file is not opened until the first write.
    pub async fn attach_log(&self, path: impl Into<PathBuf>) {
        let mut dest = self.destination.lock().await;
        dest.close().await;
        dest.path = Some(path.into());
    }

    /// Close any open destination, then adopt the given stream, or open the
    /// attached path in append mode when no stream is given.
    ///
    /// Fails with [`LogError::NoDestination`] when called with neither a
    /// stream nor an attached path.
    pub async fn open_log(&self, stream: Option<LogStream>) -> Result<()> {
        let mut dest = self.destination.lock().await;
        dest.close().await;
        match stream {
            Some(stream) => {
                dest.stream = Some(stream);
                Ok(())
            }
            None => {
                let path = dest.path.clone().ok_or(LogError::NoDestination)?;
                dest.stream = Some(Destination::open_path(&path).await?);
                Ok(())
            }
        }
    }

    /// Flush/end and release the current destination. Safe to call when
    /// none is open.
    pub async fn close_log(&self) {
        self.destination.lock().await.close().await;
    }

    /// Close the destination and clear the attached path.
    pub async fn detach_log(&self) {
        let mut dest = self.destination.lock().await;
        dest.close().await;
        dest.path = None;
    }

    /// The attached log file path, if any.
    pub async fn log_path(&self) -> Option<PathBuf> {
        self.destination.lock().await.path.clone()
    }

    // --- internals ---

    /// Append one formatted line to the destination, opening the attached
    /// path on first use. With no destination configured this is a no-op;
    /// write failures are traced and contained.
    async fn append(&self, line: &str) {
        let mut dest = self.destination.lock().await;

        if dest.stream.is_none() {
            let Some(path) = dest.path.clone() else {
                return;
            };
            match Destination::open_path(&path).await {
                Ok(stream) => dest.stream = Some(stream),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to open log file");
                    return;
                }
            }
        }

        if let Some(stream) = dest.stream.as_mut() {
            if let Err(e) = write_line(stream, line).await {
                warn!(error = %e, "log write failed");
            }
        }
    }

    fn mirror(&self, threshold: i32, line: &str) {
        if self.noise.load(Ordering::Relaxed) < threshold {
            return;
        }
        // Clone out of the lock so the sink is never called under it.
        let console = self.console.read().clone();
        if let Some(console) = console {
            console.line(line);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_line(stream: &mut LogStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.flush().await
}

/// Render an error and its `source()` chain, one cause per line.
fn render_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str("\n    caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
