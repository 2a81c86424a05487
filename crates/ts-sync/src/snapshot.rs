//! Dashboard snapshot wire types
//!
//! The unified payload of `GET /api/dashboard/real-time`, shared by the
//! server handler and the polling client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::Id;
use ts_models::{ProjectStatus, TaskPriority, TaskStatus};
use ts_workload::TeamSummary;

/// Entity counts for the headline tiles
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub users: i64,
    pub departments: i64,
    pub projects: i64,
    pub active_tasks: i64,
    pub completed_tasks: i64,
}

/// Slimmed task as carried in snapshots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDigest {
    pub id: Id,
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee_id: Option<Id>,
    pub department_id: Option<Id>,
    pub created_by: Id,
    pub end_date: Option<DateTime<Utc>>,
}

/// Slimmed project as carried in snapshots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDigest {
    pub id: Id,
    pub name: String,
    pub status: ProjectStatus,
    pub department_ids: Vec<Id>,
}

/// Items needing attention right now
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CriticalItems {
    pub overdue_tasks: Vec<TaskDigest>,
    pub urgent_tasks: Vec<TaskDigest>,
}

/// Latest activity, also the diffing input
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub tasks: Vec<TaskDigest>,
    pub projects: Vec<ProjectDigest>,
}

/// The unified dashboard snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: SnapshotSummary,
    pub critical: CriticalItems,
    pub workload: TeamSummary,
    pub recent: RecentActivity,
    pub timestamp: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Serialized form used for change detection
    ///
    /// The timestamp moves on every fetch, so it is excluded from the
    /// dedup payload; two fetches of otherwise identical state must hash
    /// identically.
    pub fn dedup_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "summary": self.summary,
            "critical": self.critical,
            "workload": self.workload,
            "recent": self.recent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_workload::team_summary;

    fn empty_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            summary: SnapshotSummary::default(),
            critical: CriticalItems::default(),
            workload: team_summary(&[]),
            recent: RecentActivity::default(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_dedup_payload_ignores_timestamp() {
        let a = empty_snapshot();
        let mut b = a.clone();
        b.timestamp = a.timestamp + chrono::Duration::seconds(5);
        assert_eq!(a.dedup_payload(), b.dedup_payload());
    }
}
