//! Workload store abstraction
//!
//! The engine reads users and tasks, and writes exactly one thing: a
//! task's assignee. The SQL implementation lives in ts-db; the in-memory
//! store here backs the engine's own tests.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use ts_core::traits::Id;
use ts_models::{Task, TaskPriority, TaskStatus, User};

use crate::rebalance::{CandidateTask, UserLoad};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Id },
    #[error("Backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Query filter for workload reads
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkloadScope {
    /// Restrict to a single user
    pub user_id: Option<Id>,
    /// Restrict to a department's members
    pub department_id: Option<Id>,
    /// With a department filter, also pull in users who participate in
    /// that department's projects from elsewhere
    pub include_project_participants: bool,
}

/// Data access needed by the workload engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkloadStore: Send + Sync {
    /// Users in scope, with their assignable profile fields
    async fn users(&self, scope: WorkloadScope) -> StoreResult<Vec<User>>;

    /// Active tasks (pending or in progress) assigned to a user
    async fn active_tasks(&self, user_id: Id) -> StoreResult<Vec<Task>>;

    /// Every user's active-hours total, unscoped (the rebalancer looks
    /// at the whole team)
    async fn user_loads(&self) -> StoreResult<Vec<UserLoad>>;

    /// Movable tasks for one user: pending, not urgent, largest first
    async fn rebalance_candidates(&self, user_id: Id, limit: usize)
        -> StoreResult<Vec<CandidateTask>>;

    /// Persist a task's new assignee
    async fn reassign_task(&self, task_id: Id, assignee_id: Id) -> StoreResult<()>;

    /// Count of all active tasks
    async fn count_active_tasks(&self) -> StoreResult<i64>;
}

/// In-memory store for tests and local development
#[derive(Debug, Default)]
pub struct MemoryWorkloadStore {
    users: RwLock<Vec<User>>,
    tasks: RwLock<Vec<Task>>,
}

impl MemoryWorkloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.users.write().await.push(user);
    }

    pub async fn add_task(&self, task: Task) {
        self.tasks.write().await.push(task);
    }

    pub async fn task(&self, task_id: Id) -> Option<Task> {
        self.tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == Some(task_id))
            .cloned()
    }
}

#[async_trait]
impl WorkloadStore for MemoryWorkloadStore {
    // The in-memory store carries no project data, so the
    // project-participant expansion flag has nothing to expand.
    async fn users(&self, scope: WorkloadScope) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| scope.user_id.map_or(true, |id| u.id == Some(id)))
            .filter(|u| {
                scope
                    .department_id
                    .map_or(true, |id| u.department_id == Some(id))
            })
            .cloned()
            .collect())
    }

    async fn active_tasks(&self, user_id: Id) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks
            .iter()
            .filter(|t| t.assignee_id == Some(user_id) && t.is_active())
            .cloned()
            .collect())
    }

    async fn user_loads(&self) -> StoreResult<Vec<UserLoad>> {
        let users = self.users.read().await;
        let tasks = self.tasks.read().await;
        Ok(users
            .iter()
            .map(|u| {
                let current_hours = tasks
                    .iter()
                    .filter(|t| t.assignee_id == u.id && t.is_active())
                    .map(|t| t.estimated_hours.unwrap_or(0.0))
                    .sum();
                UserLoad {
                    user_id: u.id.unwrap_or_default(),
                    current_hours,
                }
            })
            .collect())
    }

    async fn rebalance_candidates(
        &self,
        user_id: Id,
        limit: usize,
    ) -> StoreResult<Vec<CandidateTask>> {
        let tasks = self.tasks.read().await;
        let mut movable: Vec<CandidateTask> = tasks
            .iter()
            .filter(|t| {
                t.assignee_id == Some(user_id)
                    && t.status == TaskStatus::Pending
                    && t.priority != TaskPriority::Urgent
            })
            .map(|t| CandidateTask {
                task_id: t.id.unwrap_or_default(),
                owner_id: user_id,
                estimated_hours: t.estimated_hours.unwrap_or(0.0),
            })
            .collect();
        movable.sort_by(|a, b| b.estimated_hours.total_cmp(&a.estimated_hours));
        movable.truncate(limit);
        Ok(movable)
    }

    async fn reassign_task(&self, task_id: Id, assignee_id: Id) -> StoreResult<()> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .iter_mut()
            .find(|t| t.id == Some(task_id))
            .ok_or(StoreError::NotFound {
                entity: "Task",
                id: task_id,
            })?;
        task.assignee_id = Some(assignee_id);
        Ok(())
    }

    async fn count_active_tasks(&self) -> StoreResult<i64> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.is_active()).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ts_models::Role;

    fn user(id: Id, dept: Option<Id>) -> User {
        let mut u = User::new(format!("u{id}"), format!("u{id}@example.com"), Role::Field);
        u.id = Some(id);
        u.department_id = dept;
        u
    }

    fn task(id: Id, assignee: Id, hours: f64, status: TaskStatus, priority: TaskPriority) -> Task {
        Task {
            id: Some(id),
            title: format!("t{id}"),
            description: None,
            status,
            priority,
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

    #[tokio::test]
    async fn test_scope_filters() {
        let store = MemoryWorkloadStore::new();
        store.add_user(user(1, Some(1))).await;
        store.add_user(user(2, Some(2))).await;

        let all = store.users(WorkloadScope::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let dept = store
            .users(WorkloadScope {
                department_id: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(dept.len(), 1);
        assert_eq!(dept[0].id, Some(2));
    }

    #[tokio::test]
    async fn test_rebalance_candidates_filtered_and_sorted() {
        let store = MemoryWorkloadStore::new();
        store
            .add_task(task(1, 1, 2.0, TaskStatus::Pending, TaskPriority::Medium))
            .await;
        store
            .add_task(task(2, 1, 9.0, TaskStatus::Pending, TaskPriority::Urgent))
            .await;
        store
            .add_task(task(3, 1, 5.0, TaskStatus::InProgress, TaskPriority::Low))
            .await;
        store
            .add_task(task(4, 1, 7.0, TaskStatus::Pending, TaskPriority::Low))
            .await;

        let movable = store.rebalance_candidates(1, 3).await.unwrap();
        let ids: Vec<_> = movable.iter().map(|c| c.task_id).collect();
        // Urgent and in-progress excluded; largest first
        assert_eq!(ids, vec![4, 1]);
    }

    #[tokio::test]
    async fn test_reassign_task() {
        let store = MemoryWorkloadStore::new();
        store
            .add_task(task(1, 1, 2.0, TaskStatus::Pending, TaskPriority::Medium))
            .await;

        store.reassign_task(1, 9).await.unwrap();
        assert_eq!(store.task(1).await.unwrap().assignee_id, Some(9));

        assert!(matches!(
            store.reassign_task(99, 9).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
