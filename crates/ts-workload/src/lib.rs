//! Workload engine for TemSafy Pro
//!
//! Computes per-user capacity utilization from assigned-task hours,
//! classifies it, summarizes teams, derives alerts, and runs the greedy
//! task-rebalancing pass. Everything except persistence is a pure
//! function over store query results; snapshots are recomputed per
//! request and never stored.

pub mod alerts;
pub mod rebalance;
pub mod service;
pub mod snapshot;
pub mod store;

pub use alerts::{compute_alerts, Alert, AlertKind, AlertSeverity, AlertSummary};
pub use rebalance::{
    plan_rebalance, workload_percentage, CandidateTask, RebalanceOutcome, RebalancePlan,
    Reassignment, UserLoad, MAX_TASKS_PER_USER, REBALANCE_BASELINE_HOURS,
};
pub use service::{WorkloadFilter, WorkloadReport, WorkloadService, WorkloadStats};
pub use snapshot::{team_summary, user_snapshot, TaskRef, TeamSummary, WorkloadSnapshot, WorkloadStatus};
pub use store::{MemoryWorkloadStore, StoreError, StoreResult, WorkloadScope, WorkloadStore};
