// ── Stream monitor ──
//
// Background discovery loop. Each cycle resolves the directory, diffs
// the result against the registry, opens handles on new streams, closes
// handles on vanished ones, and reports the change to subscribers.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::config::MonitorConfig;
use crate::directory::StreamDirectory;
use crate::error::CoreError;
use crate::model::{RegistrySnapshot, StreamChange, StreamDescriptor};
use crate::store::{StreamRegistry, Watcher};
use crate::stream::RegistryStream;

const CHANGE_CHANNEL_SIZE: usize = 64;

// ── MonitorState ────────────────────────────────────────────────────

/// Lifecycle state of the background loop, observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Stopped,
    Running,
    Stopping,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Stopping => "stopping",
        })
    }
}

/// Synchronous change observer, run on the polling task.
pub type ChangeCallback = Arc<dyn Fn(&StreamChange) + Send + Sync>;

// ── Monitor ─────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Owns the directory, the
/// registry and at most one background polling task.
pub struct Monitor<D: StreamDirectory> {
    inner: Arc<MonitorInner<D>>,
}

impl<D: StreamDirectory> Clone for Monitor<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct MonitorInner<D: StreamDirectory> {
    directory: D,
    config: MonitorConfig,
    /// Held for a whole cycle, which serializes cycles.
    registry: Mutex<StreamRegistry<D::Handle>>,
    snapshot: watch::Receiver<RegistrySnapshot>,
    change_tx: broadcast::Sender<Arc<StreamChange>>,
    callback: RwLock<Option<ChangeCallback>>,
    state: watch::Sender<MonitorState>,
    worker: Mutex<Option<Worker>>,
    /// Parent of every worker token. Cancelled only by `shutdown()`.
    cancel: CancellationToken,
}

impl<D: StreamDirectory> Monitor<D> {
    /// Create a monitor. Does NOT start polling -- call
    /// [`start()`](Self::start) or drive cycles with
    /// [`poll_once()`](Self::poll_once).
    pub fn new(directory: D, config: MonitorConfig) -> Self {
        let registry = StreamRegistry::new();
        let snapshot = registry.subscribe();
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_SIZE);
        let (state, _) = watch::channel(MonitorState::Stopped);

        Self {
            inner: Arc::new(MonitorInner {
                directory,
                config,
                registry: Mutex::new(registry),
                snapshot,
                change_tx,
                callback: RwLock::new(None),
                state,
                worker: Mutex::new(None),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    pub fn directory(&self) -> &D {
        &self.inner.directory
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the polling task if it is not already running.
    ///
    /// The first cycle runs immediately; later cycles start one
    /// [`cycle_period`](MonitorConfig::cycle_period) apart.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut worker = self.inner.worker.lock().await;
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            debug!("monitor already running");
            return Ok(());
        }
        if self.inner.cancel.is_cancelled() {
            debug!("monitor shut down, not restarting");
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| CoreError::Runtime {
            message: e.to_string(),
        })?;
        let cancel = self.inner.cancel.child_token();
        let handle = runtime.spawn(poll_loop(self.clone(), cancel.clone()));
        *worker = Some(Worker { cancel, handle });

        self.inner.state.send_replace(MonitorState::Running);
        info!(period = ?self.inner.config.cycle_period(), "monitor started");
        Ok(())
    }

    /// Stop the polling task and wait for it to exit.
    ///
    /// A cycle already in flight completes first. No registry mutation
    /// happens after this returns, unless `poll_once()` is called.
    pub async fn stop(&self) {
        let mut worker = self.inner.worker.lock().await;
        let Some(Worker { cancel, handle }) = worker.take() else {
            return;
        };

        self.inner.state.send_replace(MonitorState::Stopping);
        cancel.cancel();
        if let Err(e) = handle.await {
            warn!(error = %e, "polling task ended abnormally");
        }
        self.inner.state.send_replace(MonitorState::Stopped);
        info!("monitor stopped");
    }

    /// Stop polling and close every open handle, emptying the registry.
    /// The monitor cannot be restarted afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.stop().await;
        let closed = self.inner.registry.lock().await.clear();
        debug!(closed = closed.len(), "monitor shut down");
    }

    pub fn is_running(&self) -> bool {
        *self.inner.state.borrow() == MonitorState::Running
    }

    pub fn state(&self) -> watch::Receiver<MonitorState> {
        self.inner.state.subscribe()
    }

    // ── Cycle ────────────────────────────────────────────────────

    /// Run exactly one resolve-and-diff cycle.
    ///
    /// Returns the change if the registry changed. Per-stream failures
    /// are logged and never returned; a failed resolution counts as an
    /// empty result.
    pub async fn poll_once(&self) -> Option<Arc<StreamChange>> {
        let inner = &self.inner;
        let mut registry = inner.registry.lock().await;

        let resolved = match inner.directory.resolve(inner.config.resolve_time).await {
            Ok(streams) => streams,
            Err(e) => {
                warn!(error = %e, "resolution failed, treating as no streams");
                Vec::new()
            }
        };

        let plan = registry.plan(resolved);
        let mut opened = Vec::with_capacity(plan.to_add.len());
        for stream in &plan.to_add {
            match Watcher::open(&inner.directory, stream).await {
                Ok(watcher) => opened.push(watcher),
                Err(e) => warn!(stream = %stream.name, error = %e, "skipping stream"),
            }
        }

        let (added, removed) = registry.apply(&plan.to_remove, opened);
        if added.is_empty() && removed.is_empty() {
            trace!(streams = registry.len(), "no change");
            return None;
        }

        let change = Arc::new(StreamChange {
            resolved: plan.resolved,
            added,
            removed,
            streams: registry.len(),
            observed_at: Utc::now(),
        });
        info!(
            added = change.added.len(),
            removed = change.removed.len(),
            streams = change.streams,
            "stream set changed"
        );
        self.notify(&change);
        Some(change)
    }

    fn notify(&self, change: &Arc<StreamChange>) {
        let callback = self
            .inner
            .callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(callback) = callback {
            // A failing observer must not take the polling task down with it.
            if panic::catch_unwind(AssertUnwindSafe(|| callback(change))).is_err() {
                warn!("change callback panicked");
            }
        }
        // No receivers is fine.
        let _ = self.inner.change_tx.send(Arc::clone(change));
    }

    // ── Observation ──────────────────────────────────────────────

    /// The registry as of the last completed cycle.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Look up one registered stream by name.
    pub fn get(&self, name: &str) -> Option<Arc<StreamDescriptor>> {
        self.inner.snapshot.borrow().get(name).cloned()
    }

    pub fn subscribe(&self) -> RegistryStream {
        RegistryStream::new(self.inner.snapshot.clone())
    }

    /// Receiver for every future change. Lagging receivers skip ahead.
    pub fn changes(&self) -> broadcast::Receiver<Arc<StreamChange>> {
        self.inner.change_tx.subscribe()
    }

    /// Install the synchronous change observer, replacing any previous one.
    pub fn set_change_callback<F>(&self, callback: F)
    where
        F: Fn(&StreamChange) + Send + Sync + 'static,
    {
        *self
            .inner
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(callback));
    }

    pub fn clear_change_callback(&self) {
        *self
            .inner
            .callback
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

// ── Background task ─────────────────────────────────────────────────

/// Publishes `Stopped` if the loop ends without being cancelled, so a
/// dead worker never reads as running.
struct LoopExit<'a> {
    state: &'a watch::Sender<MonitorState>,
    cancel: &'a CancellationToken,
}

impl Drop for LoopExit<'_> {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            warn!("poll loop exited unexpectedly");
            self.state.send_replace(MonitorState::Stopped);
        }
    }
}

async fn poll_loop<D: StreamDirectory>(monitor: Monitor<D>, cancel: CancellationToken) {
    let _exit = LoopExit {
        state: &monitor.inner.state,
        cancel: &cancel,
    };
    let mut ticker = tokio::time::interval(monitor.inner.config.cycle_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                monitor.poll_once().await;
            }
        }
    }
    debug!("poll loop exited");
}
