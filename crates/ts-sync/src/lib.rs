//! Dashboard sync layer for TemSafy Pro
//!
//! A subscription abstraction over a pluggable snapshot transport. The
//! initial transport is poll-based; the contract (dedup-by-hash,
//! pause-on-hidden, force-refresh, last-known-good-on-error) holds for
//! any transport. A second, pure layer diffs consecutive snapshots into
//! change events for notification display.

pub mod diff;
pub mod snapshot;
pub mod transport;
pub mod watcher;

pub use diff::{diff_snapshots, ChangeEvent, NotificationKind, ViewerContext};
pub use snapshot::{CriticalItems, DashboardSnapshot, ProjectDigest, RecentActivity, SnapshotSummary, TaskDigest};
pub use transport::{ScriptedTransport, SnapshotTransport, TransportError};
pub use watcher::{PollingWatcher, Subscription, WatcherConfig, WatcherState};
