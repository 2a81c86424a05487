//! Polling watcher
//!
//! Per dashboard session: Idle until started, then Polling on a fixed
//! interval; a hidden view stops requests entirely and regaining
//! visibility restarts the loop with an immediate fetch. Unchanged
//! snapshots (by hash, timestamp excluded) are discarded silently.
//! A failed fetch records the error and keeps the last accepted
//! snapshot visible. No in-flight cancellation is attempted.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::snapshot::DashboardSnapshot;
use crate::transport::SnapshotTransport;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Poll interval; the dashboard default is 5 seconds
    pub interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
        }
    }
}

/// Watcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Polling,
    Stopped,
}

type OnChange = Arc<dyn Fn(&DashboardSnapshot) + Send + Sync>;

#[derive(Default)]
struct Shared {
    last_hash: Option<String>,
    last_snapshot: Option<DashboardSnapshot>,
    last_error: Option<String>,
}

struct Inner {
    transport: Arc<dyn SnapshotTransport>,
    shared: Mutex<Shared>,
    subscribers: Mutex<Vec<(u64, OnChange)>>,
    next_subscriber_id: AtomicU64,
    paused: AtomicBool,
    stopped: AtomicBool,
    wake: Notify,
}

impl Inner {
    /// One fetch-compare-notify cycle
    async fn poll_once(&self) {
        if self.stopped.load(Ordering::SeqCst) || self.paused.load(Ordering::SeqCst) {
            return;
        }

        match self.transport.fetch().await {
            Ok(snapshot) => {
                let hash = snapshot_hash(&snapshot);
                let changed = {
                    let mut shared = self.shared.lock();
                    if shared.last_hash.as_deref() == Some(hash.as_str()) {
                        false
                    } else {
                        shared.last_hash = Some(hash);
                        shared.last_snapshot = Some(snapshot.clone());
                        shared.last_error = None;
                        true
                    }
                };

                if changed {
                    let subscribers: Vec<OnChange> = self
                        .subscribers
                        .lock()
                        .iter()
                        .map(|(_, cb)| Arc::clone(cb))
                        .collect();
                    for on_change in subscribers {
                        on_change(&snapshot);
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "dashboard fetch failed");
                // Last-known-good data stays untouched
                self.shared.lock().last_error = Some(err.to_string());
            }
        }
    }
}

fn snapshot_hash(snapshot: &DashboardSnapshot) -> String {
    let payload = snapshot.dedup_payload().to_string();
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Handle returned by [`PollingWatcher::subscribe`]; dropping it (or
/// calling `unsubscribe`) removes the callback.
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Poll-based dashboard watcher
pub struct PollingWatcher {
    inner: Arc<Inner>,
    config: WatcherConfig,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollingWatcher {
    pub fn new(transport: Arc<dyn SnapshotTransport>, config: WatcherConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                shared: Mutex::new(Shared::default()),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(1),
                paused: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                wake: Notify::new(),
            }),
            config,
            handle: Mutex::new(None),
        }
    }

    /// Register a change callback
    pub fn subscribe(&self, on_change: impl Fn(&DashboardSnapshot) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.inner.subscribers.lock().push((id, Arc::new(on_change)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WatcherState {
        if self.inner.stopped.load(Ordering::SeqCst) {
            return WatcherState::Stopped;
        }
        if self.handle.lock().is_some() {
            WatcherState::Polling
        } else {
            WatcherState::Idle
        }
    }

    /// Last accepted snapshot, surviving fetch errors
    pub fn latest(&self) -> Option<DashboardSnapshot> {
        self.inner.shared.lock().last_snapshot.clone()
    }

    /// Error string from the most recent failed fetch, if any
    pub fn last_error(&self) -> Option<String> {
        self.inner.shared.lock().last_error.clone()
    }

    /// Start the poll loop; fetches immediately, then on each interval
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() || self.inner.stopped.load(Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        let interval = self.config.interval;
        *handle = Some(tokio::spawn(async move {
            loop {
                if inner.stopped.load(Ordering::SeqCst) {
                    break;
                }
                inner.poll_once().await;
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = inner.wake.notified() => {}
                }
            }
        }));
    }

    /// One explicit cycle; exposed for callers that own their own timer
    pub async fn poll_once(&self) {
        self.inner.poll_once().await;
    }

    /// Document hidden: suspend all requests
    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::SeqCst);
    }

    /// Document visible again: resume and fetch immediately
    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::SeqCst);
        self.inner.wake.notify_one();
    }

    /// Drop the dedup key and fetch immediately
    pub async fn force_refresh(&self) {
        self.inner.shared.lock().last_hash = None;
        self.inner.poll_once().await;
    }

    /// Stop polling permanently
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        self.inner.wake.notify_one();
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for PollingWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        CriticalItems, RecentActivity, SnapshotSummary,
    };
    use crate::transport::ScriptedTransport;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;

    fn snapshot(users: i64) -> DashboardSnapshot {
        DashboardSnapshot {
            summary: SnapshotSummary {
                users,
                ..Default::default()
            },
            critical: CriticalItems::default(),
            workload: ts_workload::team_summary(&[]),
            recent: RecentActivity::default(),
            timestamp: Utc::now(),
        }
    }

    fn watcher_with(
        transport: Arc<ScriptedTransport>,
    ) -> (PollingWatcher, Arc<AtomicUsize>, Subscription) {
        let watcher = PollingWatcher::new(transport, WatcherConfig::default());
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updates);
        let subscription = watcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (watcher, updates, subscription)
    }

    #[tokio::test]
    async fn test_identical_snapshots_notify_once() {
        let transport = Arc::new(ScriptedTransport::new());
        // Same content, different timestamps
        transport.push_ok(snapshot(3));
        transport.push_ok(snapshot(3));

        let (watcher, updates, _subscription) = watcher_with(transport);
        watcher.poll_once().await;
        watcher.poll_once().await;

        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.latest().unwrap().summary.users, 3);
    }

    #[tokio::test]
    async fn test_changed_snapshot_notifies_again() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(3));
        transport.push_ok(snapshot(4));

        let (watcher, updates, _subscription) = watcher_with(transport);
        watcher.poll_once().await;
        watcher.poll_once().await;

        assert_eq!(updates.load(Ordering::SeqCst), 2);
        assert_eq!(watcher.latest().unwrap().summary.users, 4);
    }

    #[tokio::test]
    async fn test_error_preserves_last_known_good() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(3));
        transport.push_err("connection refused");

        let (watcher, updates, _subscription) = watcher_with(transport);
        watcher.poll_once().await;
        watcher.poll_once().await;

        assert_eq!(updates.load(Ordering::SeqCst), 1);
        assert_eq!(watcher.latest().unwrap().summary.users, 3);
        assert!(watcher.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_recovery_clears_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_err("boom");
        transport.push_ok(snapshot(1));

        let (watcher, _updates, _subscription) = watcher_with(transport);
        watcher.poll_once().await;
        assert!(watcher.last_error().is_some());

        watcher.poll_once().await;
        assert!(watcher.last_error().is_none());
        assert!(watcher.latest().is_some());
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_dedup() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(3));
        // Scripted transport repeats the last snapshot once drained

        let (watcher, updates, _subscription) = watcher_with(transport);
        watcher.poll_once().await;
        watcher.poll_once().await;
        assert_eq!(updates.load(Ordering::SeqCst), 1);

        watcher.force_refresh().await;
        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_paused_watcher_fetches_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(3));

        let (watcher, updates, _subscription) = watcher_with(transport);
        watcher.pause();
        watcher.poll_once().await;
        assert_eq!(updates.load(Ordering::SeqCst), 0);
        assert!(watcher.latest().is_none());

        watcher.resume();
        watcher.poll_once().await;
        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_background_loop_polls_on_interval() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(1));
        transport.push_ok(snapshot(2));

        let watcher = PollingWatcher::new(
            transport,
            WatcherConfig {
                interval: Duration::from_millis(10),
            },
        );
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updates);
        let _subscription = watcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(watcher.state(), WatcherState::Idle);
        watcher.start();
        assert_eq!(watcher.state(), WatcherState::Polling);

        tokio::time::sleep(Duration::from_millis(100)).await;
        watcher.stop();
        assert_eq!(watcher.state(), WatcherState::Stopped);

        // Both distinct snapshots seen, repeats deduplicated
        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_callbacks() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_ok(snapshot(1));
        transport.push_ok(snapshot(2));

        let watcher = PollingWatcher::new(transport, WatcherConfig::default());
        let updates = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&updates);
        let subscription = watcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        watcher.poll_once().await;
        subscription.unsubscribe();
        watcher.poll_once().await;

        assert_eq!(updates.load(Ordering::SeqCst), 1);
    }
}
