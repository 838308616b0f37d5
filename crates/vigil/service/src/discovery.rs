//! The discovery loop: a self-rescheduling, single-flight timer over the
//! resource registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use vigil_log::Logger;
use vigil_registry::{DiscoveryContext, ResourceRegistry};

/// Drives periodic discovery cycles.
///
/// The first cycle fires immediately on start; each later cycle is
/// scheduled `interval` after the previous one *completes*, so cycles never
/// overlap and a slow provider simply delays the next tick. A cycle's
/// failure is logged (debug-aware) and never ends the loop.
pub struct DiscoveryLoop {
    interval: Duration,
    resources: Arc<ResourceRegistry>,
    logger: Arc<Logger>,
    context: DiscoveryContext,
}

impl DiscoveryLoop {
    /// Create a loop over `resources`, reporting through `logger`.
    pub fn new(interval: Duration, resources: Arc<ResourceRegistry>, logger: Arc<Logger>) -> Self {
        let context = DiscoveryContext::new(logger.clone());
        Self {
            interval,
            resources,
            logger,
            context,
        }
    }

    /// Spawn the loop task and return its cancellation handle.
    pub fn start(self) -> DiscoveryHandle {
        let (cancel_tx, mut cancel_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            loop {
                // One cycle. Failures are contained here so a bad provider
                // cannot end the loop.
                if let Err(e) = self.resources.discover_all(&self.context).await {
                    self.logger.error_from(&e).await;
                }

                // Cancellation during the cycle suppresses the reschedule;
                // the cycle itself (and its logging) already completed.
                if *cancel_rx.borrow() {
                    break;
                }

                tokio::select! {
                    changed = cancel_rx.changed() => {
                        // The only value ever sent is `true`; a closed
                        // channel means the handle is gone. Stop either way.
                        if changed.is_err() || *cancel_rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
            debug!("discovery loop exited");
        });

        DiscoveryHandle {
            cancel: cancel_tx,
            task,
        }
    }
}

/// Cancellation handle for a running [`DiscoveryLoop`].
///
/// Dropping the handle has the same effect as [`cancel`](Self::cancel): the
/// loop observes the closed channel at its next check and exits, so an
/// abandoned service leaks no task.
pub struct DiscoveryHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DiscoveryHandle {
    /// Cancel the loop cooperatively.
    ///
    /// A pending inter-cycle wait is abandoned immediately. An in-flight
    /// cycle is not interrupted: it runs to completion, logs its outcome,
    /// and the loop then exits instead of rescheduling.
    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    /// Whether the loop task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
