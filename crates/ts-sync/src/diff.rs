//! Snapshot diffing
//!
//! Compares the previous and current snapshot's task/project arrays by
//! id to detect creates, reassignments to the viewer, and status
//! changes, filtered by relevance. Pure and stateless: an event is only
//! ever produced once, at the poll cycle where the arrays first differ.

use serde::{Deserialize, Serialize};
use ts_core::traits::Id;
use ts_models::TaskStatus;

use crate::snapshot::{DashboardSnapshot, ProjectDigest, TaskDigest};

/// Who is looking at the dashboard; relevance filtering keys off this
#[derive(Debug, Clone, Copy)]
pub struct ViewerContext {
    pub user_id: Id,
    pub department_id: Option<Id>,
}

impl ViewerContext {
    pub fn new(user_id: Id, department_id: Option<Id>) -> Self {
        Self {
            user_id,
            department_id,
        }
    }

    fn task_is_relevant(&self, task: &TaskDigest) -> bool {
        task.assignee_id == Some(self.user_id)
            || task.created_by == self.user_id
            || (self.department_id.is_some() && task.department_id == self.department_id)
    }

    fn project_is_relevant(&self, project: &ProjectDigest) -> bool {
        match self.department_id {
            Some(dept) => project.department_ids.contains(&dept),
            None => true,
        }
    }
}

/// Toast category an event maps to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Created,
    Assigned,
    Updated,
}

/// A detected change between two snapshots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ChangeEvent {
    ProjectCreated {
        project: ProjectDigest,
    },
    TaskCreated {
        task: TaskDigest,
    },
    /// The task's assignee changed to the viewer
    TaskAssigned {
        task: TaskDigest,
    },
    TaskStatusChanged {
        task: TaskDigest,
        from: TaskStatus,
        to: TaskStatus,
    },
}

impl ChangeEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            ChangeEvent::ProjectCreated { .. } | ChangeEvent::TaskCreated { .. } => {
                NotificationKind::Created
            }
            ChangeEvent::TaskAssigned { .. } => NotificationKind::Assigned,
            ChangeEvent::TaskStatusChanged { .. } => NotificationKind::Updated,
        }
    }

    /// Navigation target for the toast
    pub fn action(&self) -> String {
        match self {
            ChangeEvent::ProjectCreated { project } => format!("/projects/{}", project.id),
            ChangeEvent::TaskCreated { task }
            | ChangeEvent::TaskAssigned { task }
            | ChangeEvent::TaskStatusChanged { task, .. } => format!("/tasks/{}", task.id),
        }
    }
}

/// Diff two consecutive snapshots into the viewer's change events
///
/// A task yields at most one event per cycle, with created taking
/// precedence over assigned, and assigned over status-changed.
pub fn diff_snapshots(
    prev: &DashboardSnapshot,
    curr: &DashboardSnapshot,
    viewer: ViewerContext,
) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    for project in &curr.recent.projects {
        if !viewer.project_is_relevant(project) {
            continue;
        }
        let existed = prev.recent.projects.iter().any(|p| p.id == project.id);
        if !existed {
            events.push(ChangeEvent::ProjectCreated {
                project: project.clone(),
            });
        }
    }

    for task in &curr.recent.tasks {
        if !viewer.task_is_relevant(task) {
            continue;
        }

        let Some(previous) = prev.recent.tasks.iter().find(|t| t.id == task.id) else {
            events.push(ChangeEvent::TaskCreated { task: task.clone() });
            continue;
        };

        if previous.assignee_id != task.assignee_id && task.assignee_id == Some(viewer.user_id) {
            events.push(ChangeEvent::TaskAssigned { task: task.clone() });
            continue;
        }

        if previous.status != task.status {
            events.push(ChangeEvent::TaskStatusChanged {
                task: task.clone(),
                from: previous.status,
                to: task.status,
            });
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{CriticalItems, RecentActivity, SnapshotSummary};
    use chrono::Utc;
    use ts_models::{ProjectStatus, TaskPriority};

    fn viewer() -> ViewerContext {
        ViewerContext::new(7, Some(1))
    }

    fn task(id: Id, assignee: Option<Id>, status: TaskStatus) -> TaskDigest {
        TaskDigest {
            id,
            title: format!("task-{id}"),
            status,
            priority: TaskPriority::Medium,
            assignee_id: assignee,
            department_id: Some(1),
            created_by: 2,
            end_date: None,
        }
    }

    fn project(id: Id) -> ProjectDigest {
        ProjectDigest {
            id,
            name: format!("project-{id}"),
            status: ProjectStatus::Active,
            department_ids: vec![1],
        }
    }

    fn snapshot(tasks: Vec<TaskDigest>, projects: Vec<ProjectDigest>) -> DashboardSnapshot {
        DashboardSnapshot {
            summary: SnapshotSummary::default(),
            critical: CriticalItems::default(),
            workload: ts_workload::team_summary(&[]),
            recent: RecentActivity { tasks, projects },
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_identical_snapshots_yield_nothing() {
        let s = snapshot(vec![task(1, Some(7), TaskStatus::Pending)], vec![project(1)]);
        assert!(diff_snapshots(&s, &s.clone(), viewer()).is_empty());
    }

    #[test]
    fn test_new_task_detected_once() {
        let prev = snapshot(vec![], vec![]);
        let curr = snapshot(vec![task(1, Some(7), TaskStatus::Pending)], vec![]);

        let events = diff_snapshots(&prev, &curr, viewer());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), NotificationKind::Created);

        // The next cycle sees no difference
        assert!(diff_snapshots(&curr, &curr.clone(), viewer()).is_empty());
    }

    #[test]
    fn test_assignment_to_viewer() {
        let prev = snapshot(vec![task(1, None, TaskStatus::Pending)], vec![]);
        let curr = snapshot(vec![task(1, Some(7), TaskStatus::Pending)], vec![]);

        let events = diff_snapshots(&prev, &curr, viewer());
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ChangeEvent::TaskAssigned { .. }));
        assert_eq!(events[0].kind(), NotificationKind::Assigned);
        assert_eq!(events[0].action(), "/tasks/1");
    }

    #[test]
    fn test_assignment_away_from_viewer_is_not_assigned_event() {
        let prev = snapshot(vec![task(1, Some(7), TaskStatus::Pending)], vec![]);
        let curr = snapshot(vec![task(1, Some(9), TaskStatus::Pending)], vec![]);

        // Still relevant (same department), but no assignment event and
        // no status change either
        assert!(diff_snapshots(&prev, &curr, viewer()).is_empty());
    }

    #[test]
    fn test_status_change_yields_updated() {
        let prev = snapshot(vec![task(1, Some(7), TaskStatus::Pending)], vec![]);
        let curr = snapshot(vec![task(1, Some(7), TaskStatus::InProgress)], vec![]);

        let events = diff_snapshots(&prev, &curr, viewer());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), NotificationKind::Updated);
        assert!(matches!(
            events[0],
            ChangeEvent::TaskStatusChanged {
                from: TaskStatus::Pending,
                to: TaskStatus::InProgress,
                ..
            }
        ));
    }

    #[test]
    fn test_assignment_wins_over_status_change() {
        // Both assignee and status changed; only the assigned event fires
        let prev = snapshot(vec![task(1, None, TaskStatus::Pending)], vec![]);
        let curr = snapshot(vec![task(1, Some(7), TaskStatus::InProgress)], vec![]);

        let events = diff_snapshots(&prev, &curr, viewer());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), NotificationKind::Assigned);
    }

    #[test]
    fn test_irrelevant_tasks_filtered() {
        let mut foreign = task(1, Some(9), TaskStatus::Pending);
        foreign.department_id = Some(2);
        foreign.created_by = 9;

        let prev = snapshot(vec![], vec![]);
        let curr = snapshot(vec![foreign], vec![]);
        assert!(diff_snapshots(&prev, &curr, viewer()).is_empty());
    }

    #[test]
    fn test_created_by_viewer_is_relevant_across_departments() {
        let mut own = task(1, None, TaskStatus::Pending);
        own.department_id = Some(2);
        own.created_by = 7;

        let prev = snapshot(vec![], vec![]);
        let curr = snapshot(vec![own], vec![]);
        assert_eq!(diff_snapshots(&prev, &curr, viewer()).len(), 1);
    }

    #[test]
    fn test_new_project_detected() {
        let prev = snapshot(vec![], vec![project(1)]);
        let curr = snapshot(vec![], vec![project(1), project(2)]);

        let events = diff_snapshots(&prev, &curr, viewer());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action(), "/projects/2");
    }

    #[test]
    fn test_foreign_department_project_filtered() {
        let mut foreign = project(3);
        foreign.department_ids = vec![2];

        let prev = snapshot(vec![], vec![]);
        let curr = snapshot(vec![], vec![foreign]);
        assert!(diff_snapshots(&prev, &curr, viewer()).is_empty());
    }
}
