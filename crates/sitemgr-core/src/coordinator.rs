// ── Refresh coordinator ──
//
// Owns the periodic refresh task for one credential. Each cycle runs the
// refresher to completion, publishes the new snapshot and entity set by
// pointer swap, reconciles the platform registry, and broadcasts the
// outcome on a watch channel. Cycles never overlap.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::entity::{EntitySet, ProjectionOptions, project};
use crate::error::CoreError;
use crate::refresh::Refresher;
use crate::registry::{EntityReconciler, EntityRegistry, prune_unselected};
use crate::snapshot::Snapshot;
use crate::stream::StatusStream;

/// Polling period used when none is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(900);

/// Scheduling and projection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub interval: Duration,
    pub projection: ProjectionOptions,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            projection: ProjectionOptions::default(),
        }
    }
}

/// Outcome of the most recent cycles, as seen by consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    /// Whether the last attempted cycle succeeded.
    pub last_update_success: bool,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Set by an authentication failure; cleared by [`Coordinator::reauthenticate`].
    pub reauth_required: bool,
    /// Attempted cycles, successful or not.
    pub cycles: u64,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Periodic refresh driver for one API key.
///
/// Cheaply cloneable. Call [`refresh()`](Self::refresh) for the first
/// cycle, then [`start()`](Self::start) to poll on the configured interval.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    refresher: ArcSwap<Refresher>,
    config: CoordinatorConfig,
    snapshot: ArcSwapOption<Snapshot>,
    entities: ArcSwapOption<EntitySet>,
    status: watch::Sender<RefreshStatus>,
    registry: Option<Arc<dyn EntityRegistry>>,
    /// Held for the duration of a cycle.
    reconciler: Mutex<EntityReconciler>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Coordinator {
    pub fn new(
        refresher: Refresher,
        config: CoordinatorConfig,
        registry: Option<Arc<dyn EntityRegistry>>,
    ) -> Self {
        let (status, _) = watch::channel(RefreshStatus::default());
        Self {
            inner: Arc::new(CoordinatorInner {
                refresher: ArcSwap::from_pointee(refresher),
                config,
                snapshot: ArcSwapOption::empty(),
                entities: ArcSwapOption::empty(),
                status,
                registry,
                reconciler: Mutex::new(EntityReconciler::new()),
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ── Cycles ───────────────────────────────────────────────────────

    /// Run one cycle now, waiting for any cycle already in flight.
    ///
    /// On success the snapshot and entity set are replaced and the registry
    /// is reconciled. A recoverable failure keeps the previous snapshot. An
    /// authentication failure withdraws it and suspends polling until
    /// [`reauthenticate()`](Self::reauthenticate).
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let mut reconciler = self.inner.reconciler.lock().await;
        let attempted_at = Utc::now();
        let refresher = self.inner.refresher.load_full();

        match refresher.refresh().await {
            Ok(snapshot) => {
                let now = Utc::now();
                let snapshot = Arc::new(snapshot);
                let entities = Arc::new(project(&snapshot, &self.inner.config.projection, now));

                if let Some(registry) = &self.inner.registry {
                    reconciler.reconcile(&entities, registry.as_ref());
                }
                self.inner.snapshot.store(Some(Arc::clone(&snapshot)));
                self.inner.entities.store(Some(entities));

                self.inner.status.send_modify(|s| {
                    s.last_update_success = true;
                    s.last_success_at = Some(now);
                    s.last_attempt_at = Some(attempted_at);
                    s.last_error = None;
                    s.reauth_required = false;
                    s.cycles += 1;
                });
                Ok(snapshot)
            }
            Err(e) if e.is_auth_failure() => {
                let first = !self.inner.status.borrow().reauth_required;
                if first {
                    error!(error = %e, "authentication failed, polling suspended until new credentials are supplied");
                }
                self.inner.snapshot.store(None);
                self.inner.entities.store(None);

                self.inner.status.send_modify(|s| {
                    s.last_update_success = false;
                    s.last_attempt_at = Some(attempted_at);
                    s.last_error = Some(e.to_string());
                    s.reauth_required = true;
                    s.cycles += 1;
                });
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, keeping previous snapshot");
                self.inner.status.send_modify(|s| {
                    s.last_update_success = false;
                    s.last_attempt_at = Some(attempted_at);
                    s.last_error = Some(e.to_string());
                    s.cycles += 1;
                });
                Err(e)
            }
        }
    }

    /// Swap in a refresher with new credentials and run a cycle with it.
    pub async fn reauthenticate(&self, refresher: Refresher) -> Result<Arc<Snapshot>, CoreError> {
        self.inner.refresher.store(Arc::new(refresher));
        self.inner.status.send_modify(|s| s.reauth_required = false);
        info!("credentials replaced, resuming refresh");
        self.refresh().await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Prune deselected sites from the registry and spawn the periodic task.
    ///
    /// The first tick fires one interval from now. Calling `start` twice is a
    /// no-op. A zero interval is rejected with [`CoreError::Config`].
    pub async fn start(&self) -> Result<(), CoreError> {
        let interval = self.inner.config.interval;
        if interval.is_zero() {
            return Err(CoreError::Config {
                message: "refresh interval must be greater than zero".into(),
            });
        }

        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            return Ok(());
        }

        if let Some(registry) = &self.inner.registry {
            prune_unselected(
                registry.as_ref(),
                &self.inner.config.projection.selected_sites,
            );
        }

        debug!(interval_secs = interval.as_secs(), "starting refresh task");
        *task = Some(tokio::spawn(refresh_task(
            self.clone(),
            interval,
            self.inner.cancel.clone(),
        )));
        Ok(())
    }

    /// Cancel the periodic task, abandoning any in-flight cycle, and wait
    /// for it to exit. The coordinator cannot be restarted afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "refresh task ended abnormally");
            }
        }
        debug!("coordinator stopped");
    }

    // ── Readers ──────────────────────────────────────────────────────

    /// Last published snapshot. `None` before the first success and after
    /// an authentication failure.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.load_full()
    }

    /// Entities projected from [`snapshot()`](Self::snapshot).
    pub fn entities(&self) -> Option<Arc<EntitySet>> {
        self.inner.entities.load_full()
    }

    pub fn status(&self) -> RefreshStatus {
        self.inner.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshStatus> {
        self.inner.status.subscribe()
    }

    pub fn updates(&self) -> StatusStream {
        StatusStream::new(self.inner.status.subscribe())
    }
}

// ── Background task ──────────────────────────────────────────────────

async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.status().reauth_required {
                    debug!("re-authentication required, skipping refresh");
                    continue;
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    // Outcome is already logged and published by `refresh`.
                    _ = coordinator.refresh() => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_polls_every_fifteen_minutes() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(900));
        assert!(config.projection.selected_sites.is_empty());
    }

    #[test]
    fn initial_status_is_not_successful() {
        let status = RefreshStatus::default();
        assert!(!status.last_update_success);
        assert!(!status.reauth_required);
        assert_eq!(status.cycles, 0);
    }
}
