//! Workload alert derivation
//!
//! Alerts are pure derivations over snapshots with no persistence or
//! acknowledgment state; every request recomputes the full set.

use serde::{Deserialize, Serialize};
use ts_core::traits::Id;

use crate::snapshot::WorkloadSnapshot;

/// What the alert is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Workload,
    Overdue,
    Urgent,
}

/// How loud the alert should be
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// A single actionable alert for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub user_id: Id,
    pub user_name: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub action_required: bool,
}

impl Alert {
    fn new(
        snapshot: &WorkloadSnapshot,
        kind: AlertKind,
        severity: AlertSeverity,
        message: String,
    ) -> Self {
        Self {
            user_id: snapshot.user_id,
            user_name: snapshot.name.clone(),
            kind,
            severity,
            message,
            action_required: severity == AlertSeverity::Critical,
        }
    }
}

/// Rollup counts for an alert set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub action_required: usize,
}

impl AlertSummary {
    pub fn of(alerts: &[Alert]) -> Self {
        let critical = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
        Self {
            total: alerts.len(),
            critical,
            warning: alerts.len() - critical,
            action_required: alerts.iter().filter(|a| a.action_required).count(),
        }
    }
}

/// Derive the full alert set for a group of snapshots
pub fn compute_alerts(snapshots: &[WorkloadSnapshot]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for snapshot in snapshots {
        if snapshot.utilization_rate >= 90 {
            let severity = if snapshot.utilization_rate >= 100 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(Alert::new(
                snapshot,
                AlertKind::Workload,
                severity,
                format!(
                    "{} is at {}% capacity ({:.1}h of {:.1}h)",
                    snapshot.name,
                    snapshot.utilization_rate,
                    snapshot.current_hours,
                    snapshot.capacity
                ),
            ));
        }

        if !snapshot.overdue_tasks.is_empty() {
            let severity = if snapshot.overdue_tasks.len() >= 3 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(Alert::new(
                snapshot,
                AlertKind::Overdue,
                severity,
                format!(
                    "{} has {} overdue task(s)",
                    snapshot.name,
                    snapshot.overdue_tasks.len()
                ),
            ));
        }

        if snapshot.urgent_tasks.len() >= 2 {
            let severity = if snapshot.urgent_tasks.len() >= 4 {
                AlertSeverity::Critical
            } else {
                AlertSeverity::Warning
            };
            alerts.push(Alert::new(
                snapshot,
                AlertKind::Urgent,
                severity,
                format!(
                    "{} has {} urgent task(s) in flight",
                    snapshot.name,
                    snapshot.urgent_tasks.len()
                ),
            ));
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{TaskRef, WorkloadStatus};
    use ts_models::Role;

    fn snapshot(rate: u32) -> WorkloadSnapshot {
        WorkloadSnapshot {
            user_id: 1,
            name: "Rami".into(),
            role: Role::Field,
            department_id: None,
            capacity: 40.0,
            current_hours: rate as f64 * 0.4,
            upcoming_hours: 0.0,
            available_hours: 0.0,
            utilization_rate: rate,
            status: WorkloadStatus::from_rate(rate),
            active_tasks: 0,
            overdue_tasks: vec![],
            urgent_tasks: vec![],
        }
    }

    fn task_ref(id: i64) -> TaskRef {
        TaskRef {
            id,
            title: format!("task-{id}"),
            estimated_hours: Some(1.0),
            end_date: None,
        }
    }

    #[test]
    fn test_no_alerts_below_thresholds() {
        let alerts = compute_alerts(&[snapshot(89)]);
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_workload_alert_severity() {
        let alerts = compute_alerts(&[snapshot(90)]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Workload);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);
        assert!(!alerts[0].action_required);

        let alerts = compute_alerts(&[snapshot(100)]);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts[0].action_required);
    }

    #[test]
    fn test_overdue_alert() {
        let mut s = snapshot(50);
        s.overdue_tasks = vec![task_ref(1)];
        let alerts = compute_alerts(&[s.clone()]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Overdue);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);

        s.overdue_tasks = vec![task_ref(1), task_ref(2), task_ref(3)];
        let alerts = compute_alerts(&[s]);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_urgent_alert_needs_two() {
        let mut s = snapshot(50);
        s.urgent_tasks = vec![task_ref(1)];
        assert!(compute_alerts(&[s.clone()]).is_empty());

        s.urgent_tasks = vec![task_ref(1), task_ref(2)];
        let alerts = compute_alerts(&[s.clone()]);
        assert_eq!(alerts[0].kind, AlertKind::Urgent);
        assert_eq!(alerts[0].severity, AlertSeverity::Warning);

        s.urgent_tasks = (1..=4).map(task_ref).collect();
        let alerts = compute_alerts(&[s]);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_one_user_can_raise_multiple_alerts() {
        let mut s = snapshot(105);
        s.overdue_tasks = vec![task_ref(1)];
        s.urgent_tasks = vec![task_ref(2), task_ref(3)];
        let alerts = compute_alerts(&[s]);
        assert_eq!(alerts.len(), 3);

        let summary = AlertSummary::of(&alerts);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.warning, 2);
        assert_eq!(summary.action_required, 1);
    }
}
