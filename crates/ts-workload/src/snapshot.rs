//! Per-user utilization snapshots and team summaries

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::Id;
use ts_models::{Role, Task, User};

/// Utilization classification
///
/// A pure function of the utilization rate; thresholds are evaluated
/// top-down, first match wins.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadStatus {
    Available,
    Moderate,
    Busy,
    Critical,
    Overloaded,
}

impl WorkloadStatus {
    /// Classify a utilization rate (percentage)
    pub fn from_rate(rate: u32) -> Self {
        if rate >= 100 {
            WorkloadStatus::Overloaded
        } else if rate >= 90 {
            WorkloadStatus::Critical
        } else if rate >= 70 {
            WorkloadStatus::Busy
        } else if rate >= 40 {
            WorkloadStatus::Moderate
        } else {
            WorkloadStatus::Available
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadStatus::Available => "available",
            WorkloadStatus::Moderate => "moderate",
            WorkloadStatus::Busy => "busy",
            WorkloadStatus::Critical => "critical",
            WorkloadStatus::Overloaded => "overloaded",
        }
    }
}

/// Lightweight task reference carried inside a snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRef {
    pub id: Id,
    pub title: String,
    pub estimated_hours: Option<f64>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TaskRef {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.unwrap_or_default(),
            title: task.title.clone(),
            estimated_hours: task.estimated_hours,
            end_date: task.end_date,
        }
    }
}

/// Derived utilization snapshot for one user
///
/// Never persisted; reflects store state at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadSnapshot {
    pub user_id: Id,
    pub name: String,
    pub role: Role,
    pub department_id: Option<Id>,
    pub capacity: f64,
    pub current_hours: f64,
    /// Hours queued but not yet started (pending tasks)
    pub upcoming_hours: f64,
    pub available_hours: f64,
    pub utilization_rate: u32,
    pub status: WorkloadStatus,
    pub active_tasks: usize,
    pub overdue_tasks: Vec<TaskRef>,
    pub urgent_tasks: Vec<TaskRef>,
}

/// Compute the utilization snapshot for one user
///
/// `tasks` may contain anything; only active tasks assigned to the user
/// contribute hours.
pub fn user_snapshot(user: &User, tasks: &[Task], now: DateTime<Utc>) -> WorkloadSnapshot {
    let user_id = user.id.unwrap_or_default();
    let active: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.assignee_id == Some(user_id) && t.is_active())
        .collect();

    let current_hours: f64 = active
        .iter()
        .map(|t| t.estimated_hours.unwrap_or(0.0))
        .sum();
    let upcoming_hours: f64 = active
        .iter()
        .filter(|t| t.status == ts_models::TaskStatus::Pending)
        .map(|t| t.estimated_hours.unwrap_or(0.0))
        .sum();

    let utilization_rate = if user.capacity > 0.0 {
        (current_hours / user.capacity * 100.0).round() as u32
    } else {
        0
    };

    let overdue_tasks = active
        .iter()
        .filter(|t| t.is_overdue(now))
        .map(|t| TaskRef::from_task(t))
        .collect();
    let urgent_tasks = active
        .iter()
        .filter(|t| t.is_urgent())
        .map(|t| TaskRef::from_task(t))
        .collect();

    WorkloadSnapshot {
        user_id,
        name: user.name.clone(),
        role: user.role,
        department_id: user.department_id,
        capacity: user.capacity,
        current_hours,
        upcoming_hours,
        available_hours: (user.capacity - current_hours).max(0.0),
        utilization_rate,
        status: WorkloadStatus::from_rate(utilization_rate),
        active_tasks: active.len(),
        overdue_tasks,
        urgent_tasks,
    }
}

/// Team-wide rollup over a set of snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub member_count: usize,
    pub avg_utilization: u32,
    pub total_capacity: f64,
    pub total_assigned: f64,
    pub total_available: f64,
    pub status_distribution: BTreeMap<WorkloadStatus, usize>,
}

/// Summarize a team's snapshots
pub fn team_summary(snapshots: &[WorkloadSnapshot]) -> TeamSummary {
    let mut status_distribution = BTreeMap::new();
    for snapshot in snapshots {
        *status_distribution.entry(snapshot.status).or_insert(0) += 1;
    }

    let avg_utilization = if snapshots.is_empty() {
        0
    } else {
        let sum: f64 = snapshots.iter().map(|s| s.utilization_rate as f64).sum();
        (sum / snapshots.len() as f64).round() as u32
    };

    TeamSummary {
        member_count: snapshots.len(),
        avg_utilization,
        total_capacity: snapshots.iter().map(|s| s.capacity).sum(),
        total_assigned: snapshots.iter().map(|s| s.current_hours).sum(),
        total_available: snapshots.iter().map(|s| s.available_hours).sum(),
        status_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ts_models::{TaskPriority, TaskStatus};

    fn user(id: Id, capacity: f64) -> User {
        let mut user = User::new(format!("user-{id}"), format!("u{id}@example.com"), Role::Field)
            .with_capacity(capacity);
        user.id = Some(id);
        user
    }

    fn task(id: Id, assignee: Id, hours: f64, status: TaskStatus) -> Task {
        Task {
            id: Some(id),
            title: format!("task-{id}"),
            description: None,
            status,
            priority: TaskPriority::Medium,
            estimated_hours: Some(hours),
            assignee_id: Some(assignee),
            project_id: 1,
            department_id: None,
            created_by: 1,
            start_date: None,
            end_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_thresholds_are_total_and_exclusive() {
        assert_eq!(WorkloadStatus::from_rate(0), WorkloadStatus::Available);
        assert_eq!(WorkloadStatus::from_rate(39), WorkloadStatus::Available);
        assert_eq!(WorkloadStatus::from_rate(40), WorkloadStatus::Moderate);
        assert_eq!(WorkloadStatus::from_rate(69), WorkloadStatus::Moderate);
        assert_eq!(WorkloadStatus::from_rate(70), WorkloadStatus::Busy);
        assert_eq!(WorkloadStatus::from_rate(89), WorkloadStatus::Busy);
        assert_eq!(WorkloadStatus::from_rate(90), WorkloadStatus::Critical);
        assert_eq!(WorkloadStatus::from_rate(99), WorkloadStatus::Critical);
        assert_eq!(WorkloadStatus::from_rate(100), WorkloadStatus::Overloaded);
        assert_eq!(WorkloadStatus::from_rate(250), WorkloadStatus::Overloaded);
    }

    #[test]
    fn test_snapshot_busy_user() {
        // capacity=8, hours [3, 4] -> 7h, 88%, busy, 1h available
        let u = user(1, 8.0);
        let tasks = vec![
            task(1, 1, 3.0, TaskStatus::Pending),
            task(2, 1, 4.0, TaskStatus::InProgress),
        ];
        let s = user_snapshot(&u, &tasks, Utc::now());
        assert_eq!(s.current_hours, 7.0);
        assert_eq!(s.utilization_rate, 88);
        assert_eq!(s.status, WorkloadStatus::Busy);
        assert_eq!(s.available_hours, 1.0);
        assert_eq!(s.upcoming_hours, 3.0);
        assert_eq!(s.active_tasks, 2);
    }

    #[test]
    fn test_snapshot_overloaded_user() {
        // capacity=40, 44h -> 110%, overloaded, 0h available
        let u = user(1, 40.0);
        let tasks = vec![
            task(1, 1, 20.0, TaskStatus::InProgress),
            task(2, 1, 24.0, TaskStatus::Pending),
        ];
        let s = user_snapshot(&u, &tasks, Utc::now());
        assert_eq!(s.utilization_rate, 110);
        assert_eq!(s.status, WorkloadStatus::Overloaded);
        assert_eq!(s.available_hours, 0.0);
    }

    #[test]
    fn test_zero_capacity_user() {
        let u = user(1, 0.0);
        let tasks = vec![task(1, 1, 10.0, TaskStatus::Pending)];
        let s = user_snapshot(&u, &tasks, Utc::now());
        assert_eq!(s.utilization_rate, 0);
        assert_eq!(s.status, WorkloadStatus::Available);
        assert_eq!(s.available_hours, 0.0);
    }

    #[test]
    fn test_inactive_and_foreign_tasks_ignored() {
        let u = user(1, 8.0);
        let tasks = vec![
            task(1, 1, 3.0, TaskStatus::Completed),
            task(2, 1, 2.0, TaskStatus::Cancelled),
            task(3, 2, 5.0, TaskStatus::Pending),
            task(4, 1, 1.0, TaskStatus::Pending),
        ];
        let s = user_snapshot(&u, &tasks, Utc::now());
        assert_eq!(s.current_hours, 1.0);
        assert_eq!(s.active_tasks, 1);
    }

    #[test]
    fn test_missing_estimates_count_as_zero() {
        let u = user(1, 8.0);
        let mut t = task(1, 1, 0.0, TaskStatus::Pending);
        t.estimated_hours = None;
        let s = user_snapshot(&u, &[t], Utc::now());
        assert_eq!(s.current_hours, 0.0);
        assert_eq!(s.active_tasks, 1);
    }

    #[test]
    fn test_overdue_and_urgent_flagging() {
        let now = Utc::now();
        let u = user(1, 8.0);
        let mut overdue = task(1, 1, 2.0, TaskStatus::InProgress);
        overdue.end_date = Some(now - Duration::days(1));
        let mut urgent = task(2, 1, 2.0, TaskStatus::Pending);
        urgent.priority = TaskPriority::Urgent;

        let s = user_snapshot(&u, &[overdue, urgent], now);
        assert_eq!(s.overdue_tasks.len(), 1);
        assert_eq!(s.overdue_tasks[0].id, 1);
        assert_eq!(s.urgent_tasks.len(), 1);
        assert_eq!(s.urgent_tasks[0].id, 2);
    }

    #[test]
    fn test_team_summary() {
        let now = Utc::now();
        let users = [user(1, 8.0), user(2, 8.0)];
        let tasks = vec![
            task(1, 1, 3.0, TaskStatus::Pending),
            task(2, 1, 4.0, TaskStatus::InProgress),
            task(3, 2, 1.0, TaskStatus::Pending),
        ];
        let snapshots: Vec<_> = users.iter().map(|u| user_snapshot(u, &tasks, now)).collect();
        let summary = team_summary(&snapshots);

        assert_eq!(summary.member_count, 2);
        // rates 88 and 13 -> mean 50.5 -> 51 (half rounds up)
        assert_eq!(summary.avg_utilization, 51);
        assert_eq!(summary.total_capacity, 16.0);
        assert_eq!(summary.total_assigned, 8.0);
        assert_eq!(summary.total_available, 8.0);
        assert_eq!(summary.status_distribution[&WorkloadStatus::Busy], 1);
        assert_eq!(summary.status_distribution[&WorkloadStatus::Available], 1);
    }

    #[test]
    fn test_team_summary_empty() {
        let summary = team_summary(&[]);
        assert_eq!(summary.member_count, 0);
        assert_eq!(summary.avg_utilization, 0);
    }
}
