//! Auto-detector — runs detection passes now and on a fixed interval.
//!
//! `start()` runs the first pass on the caller's task so its failure is
//! visible at startup, then spawns a background task that repeats the
//! pass every `interval` until the returned handle asks it to stop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use agentop_core::{AutoscalingVersion, RoutesAvailability};

use crate::error::{AutodetectError, AutodetectResult};
use crate::notifier::ChangeNotifier;
use crate::probe::CapabilityProbe;
use crate::store::StateStore;

/// How often the background task repeats detection unless configured.
pub const DEFAULT_AUTO_DETECT_FREQUENCY: Duration = Duration::from_secs(5);

/// Probes the environment and keeps the [`StateStore`] current.
pub struct AutoDetector {
    probe: Arc<dyn CapabilityProbe>,
    state: Arc<StateStore>,
    notifier: Arc<ChangeNotifier>,
    interval: Duration,
}

impl AutoDetector {
    /// Create a detector using [`DEFAULT_AUTO_DETECT_FREQUENCY`].
    pub fn new(
        probe: Arc<dyn CapabilityProbe>,
        state: Arc<StateStore>,
        notifier: Arc<ChangeNotifier>,
    ) -> Self {
        Self {
            probe,
            state,
            notifier,
            interval: DEFAULT_AUTO_DETECT_FREQUENCY,
        }
    }

    /// Set the interval between background passes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Interval between background passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The store this detector updates.
    pub fn state(&self) -> &Arc<StateStore> {
        &self.state
    }

    /// Callbacks run when routes availability changes.
    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    /// Run a single detection pass.
    ///
    /// A routes probe failure aborts the pass before autoscaling is probed.
    /// An autoscaling probe failure is returned, but a routes change made
    /// earlier in the same pass is kept. Callback failures are logged only.
    pub async fn run_once(&self) -> AutodetectResult<()> {
        debug!("auto-detecting the configuration based on the environment");

        let routes = self
            .probe
            .routes_availability()
            .await
            .map_err(AutodetectError::RoutesProbe)?;
        self.apply_routes(routes);

        let version = self
            .probe
            .autoscaling_version()
            .await
            .map_err(AutodetectError::AutoscalingProbe)?;
        self.apply_autoscaling_version(version);

        Ok(())
    }

    fn apply_routes(&self, routes: RoutesAvailability) {
        let previous = self.state.swap_routes(routes);
        if previous == routes {
            return;
        }

        info!(available = %routes, %previous, "openshift routes detected");
        if let Err(e) = self.notifier.invoke() {
            // The detection itself worked; a failing consumer does not undo it.
            error!(error = %e, "configuration change notification failed for callback");
        }
    }

    fn apply_autoscaling_version(&self, version: AutoscalingVersion) {
        self.state.set_autoscaling_version(version);
        debug!(autoscaling_version = %version, "autoscaling version detected");
    }

    /// Run the first pass now, then keep detecting in the background.
    ///
    /// The background task is started whether or not the first pass
    /// succeeded. Must be called from within a tokio runtime.
    pub async fn start(self: Arc<Self>) -> (AutoDetectHandle, AutodetectResult<()>) {
        let first_pass = self.run_once().await;
        if let Err(e) = &first_pass {
            debug!(error = %e, "initial auto-detection failed");
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });

        (
            AutoDetectHandle {
                shutdown_tx,
                handle: Some(handle),
            },
            first_pass,
        )
    }

    /// The periodic detection loop.
    ///
    /// Shutdown is observed both while waiting for the next tick and while
    /// a pass is in flight, so a stalled probe cannot hold the task open.
    async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "auto-detection started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                result = self.run_once() => {
                    if let Err(e) = result {
                        warn!(error = %e, "auto-detection failed");
                    }
                }
                _ = shutdown.changed() => {
                    debug!("auto-detection pass abandoned");
                    break;
                }
            }
        }

        info!("auto-detection shutting down");
    }
}

/// Handle to the background detection task.
///
/// Dropping the handle also asks the task to stop.
pub struct AutoDetectHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl AutoDetectHandle {
    /// Stop the background task and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(error = %e, "auto-detection task ended abnormally");
        }
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }
}

impl Drop for AutoDetectHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
