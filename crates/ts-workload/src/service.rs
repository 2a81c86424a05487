//! Workload service
//!
//! Orchestrates store reads, the pure computations, and role checks.
//! Authorization failures surface before any query runs.

use chrono::Utc;
use ts_auth::AuthContext;
use ts_core::traits::Id;
use ts_core::{TsError, TsResult};
use ts_models::Role;

use crate::alerts::{compute_alerts, Alert, AlertSeverity, AlertSummary};
use crate::rebalance::{plan_rebalance, RebalanceOutcome, MAX_TASKS_PER_USER};
use crate::snapshot::{team_summary, user_snapshot, TeamSummary, WorkloadSnapshot};
use crate::store::{StoreError, WorkloadScope, WorkloadStore};

/// Filter accepted by the workload read endpoints
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkloadFilter {
    pub user_id: Option<Id>,
    pub department_id: Option<Id>,
    pub include_project_participants: bool,
}

/// Response of the workload overview
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadReport {
    pub users: Vec<WorkloadSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_summary: Option<TeamSummary>,
}

/// Aggregate counters for the manager stats endpoint
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStats {
    pub total_users: usize,
    pub overloaded_users: usize,
    pub busy_users: usize,
    pub available_users: usize,
    pub average_workload: u32,
    pub total_active_tasks: i64,
}

/// The workload engine's service facade
pub struct WorkloadService<S> {
    store: S,
}

impl From<StoreError> for TsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => TsError::not_found(entity, id),
            StoreError::Backend(message) => TsError::Database(message),
        }
    }
}

impl<S: WorkloadStore> WorkloadService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Per-user snapshots plus a team summary when more than one user is
    /// in scope
    pub async fn report(&self, ctx: &AuthContext, filter: WorkloadFilter) -> TsResult<WorkloadReport> {
        // Field users only ever see themselves; department heads are
        // pinned to their own department.
        let scope = self.effective_scope(ctx, filter)?;

        let users = self.store.users(scope).await?;
        let now = Utc::now();

        let mut snapshots = Vec::with_capacity(users.len());
        for user in &users {
            let user_id = user.id.unwrap_or_default();
            let tasks = self.store.active_tasks(user_id).await?;
            snapshots.push(user_snapshot(user, &tasks, now));
        }

        let summary = (snapshots.len() > 1).then(|| team_summary(&snapshots));
        Ok(WorkloadReport {
            users: snapshots,
            team_summary: summary,
        })
    }

    /// Alert set for managers, admins, and department heads
    pub async fn alerts(
        &self,
        ctx: &AuthContext,
        department_id: Option<Id>,
        severity: Option<AlertSeverity>,
    ) -> TsResult<(Vec<Alert>, AlertSummary)> {
        if !ctx.can_view_analytics() {
            return Err(TsError::forbidden("Forbidden"));
        }

        let report = self
            .report(
                ctx,
                WorkloadFilter {
                    user_id: None,
                    department_id,
                    include_project_participants: false,
                },
            )
            .await?;

        let mut alerts = compute_alerts(&report.users);
        if let Some(severity) = severity {
            alerts.retain(|a| a.severity == severity);
        }
        let summary = AlertSummary::of(&alerts);
        Ok((alerts, summary))
    }

    /// Aggregate counters for the manager dashboard
    pub async fn stats(&self, ctx: &AuthContext) -> TsResult<WorkloadStats> {
        if ctx.role != Role::Manager {
            return Err(TsError::forbidden("Forbidden"));
        }

        let report = self.report(ctx, WorkloadFilter::default()).await?;
        let snapshots = &report.users;

        let overloaded = snapshots.iter().filter(|s| s.utilization_rate >= 90).count();
        let busy = snapshots
            .iter()
            .filter(|s| (70..90).contains(&s.utilization_rate))
            .count();
        let available = snapshots.len() - overloaded - busy;

        let average_workload = report
            .team_summary
            .as_ref()
            .map(|s| s.avg_utilization)
            .unwrap_or_else(|| snapshots.first().map(|s| s.utilization_rate).unwrap_or(0));

        Ok(WorkloadStats {
            total_users: snapshots.len(),
            overloaded_users: overloaded,
            busy_users: busy,
            available_users: available,
            average_workload,
            total_active_tasks: self.store.count_active_tasks().await?,
        })
    }

    /// Execute a rebalancing pass
    ///
    /// Writes go out one task at a time with no surrounding transaction;
    /// an error mid-pass leaves earlier reassignments committed.
    pub async fn rebalance(&self, ctx: &AuthContext) -> TsResult<RebalanceOutcome> {
        if ctx.role != Role::Manager {
            return Err(TsError::forbidden("Forbidden"));
        }

        let loads = self.store.user_loads().await?;

        let mut candidates = Vec::new();
        for load in &loads {
            if crate::rebalance::workload_percentage(load.current_hours)
                > crate::rebalance::OVERLOADED_THRESHOLD
            {
                let mut movable = self
                    .store
                    .rebalance_candidates(load.user_id, MAX_TASKS_PER_USER)
                    .await?;
                candidates.append(&mut movable);
            }
        }

        let plan = plan_rebalance(&loads, &candidates);

        let mut applied = 0;
        for reassignment in &plan.reassignments {
            self.store
                .reassign_task(reassignment.task_id, reassignment.to_user)
                .await?;
            applied += 1;
            tracing::info!(
                task_id = reassignment.task_id,
                from = reassignment.from_user,
                to = reassignment.to_user,
                hours = reassignment.hours,
                "task reassigned"
            );
        }

        Ok(RebalanceOutcome {
            rebalanced: applied > 0,
            tasks_rebalanced: applied,
            overloaded_users: plan.overloaded_users,
            available_users: plan.available_users,
        })
    }

    fn effective_scope(&self, ctx: &AuthContext, filter: WorkloadFilter) -> TsResult<WorkloadScope> {
        match ctx.role {
            Role::Admin | Role::Manager => Ok(WorkloadScope {
                user_id: filter.user_id,
                department_id: filter.department_id,
                include_project_participants: filter.include_project_participants,
            }),
            Role::Department => {
                let own = ctx.department_id;
                if own.is_none() {
                    return Err(TsError::forbidden("Forbidden"));
                }
                if filter.department_id.is_some() && filter.department_id != own {
                    return Err(TsError::forbidden("Forbidden"));
                }
                Ok(WorkloadScope {
                    user_id: filter.user_id,
                    department_id: own,
                    include_project_participants: filter.include_project_participants,
                })
            }
            Role::Field => {
                let requested = filter.user_id.unwrap_or(ctx.user_id);
                if requested != ctx.user_id {
                    return Err(TsError::forbidden("Forbidden"));
                }
                Ok(WorkloadScope {
                    user_id: Some(requested),
                    department_id: None,
                    include_project_participants: false,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::WorkloadStatus;
    use crate::store::MemoryWorkloadStore;
    use ts_models::{Task, TaskPriority, TaskStatus, User};

    fn user(id: Id, role: Role, capacity: f64, dept: Option<Id>) -> User {
        let mut u = User::new(format!("u{id}"), format!("u{id}@example.com"), role)
            .with_capacity(capacity);
        u.id = Some(id);
        u.department_id = dept;
        u
    }

    fn task(id: Id, assignee: Id, hours: f64, status: TaskStatus) -> Task {
        Task {
            id: Some(id),
            title: format!("t{id}"),
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

    fn manager_ctx() -> AuthContext {
        AuthContext::new(100, Role::Manager, None)
    }

    async fn seeded_store() -> MemoryWorkloadStore {
        let store = MemoryWorkloadStore::new();
        store.add_user(user(1, Role::Field, 8.0, Some(1))).await;
        store.add_user(user(2, Role::Field, 8.0, Some(1))).await;
        store.add_task(task(1, 1, 3.0, TaskStatus::Pending)).await;
        store.add_task(task(2, 1, 4.0, TaskStatus::InProgress)).await;
        store.add_task(task(3, 2, 1.0, TaskStatus::Pending)).await;
        store
    }

    #[tokio::test]
    async fn test_report_with_team_summary() {
        let service = WorkloadService::new(seeded_store().await);
        let report = service
            .report(&manager_ctx(), WorkloadFilter::default())
            .await
            .unwrap();

        assert_eq!(report.users.len(), 2);
        assert!(report.team_summary.is_some());
        let first = &report.users[0];
        assert_eq!(first.utilization_rate, 88);
        assert_eq!(first.status, WorkloadStatus::Busy);
    }

    #[tokio::test]
    async fn test_single_user_report_has_no_summary() {
        let service = WorkloadService::new(seeded_store().await);
        let report = service
            .report(
                &manager_ctx(),
                WorkloadFilter {
                    user_id: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(report.users.len(), 1);
        assert!(report.team_summary.is_none());
    }

    #[tokio::test]
    async fn test_field_user_cannot_read_others() {
        let service = WorkloadService::new(seeded_store().await);
        let ctx = AuthContext::new(1, Role::Field, Some(1));

        let own = service
            .report(
                &ctx,
                WorkloadFilter::default(),
            )
            .await
            .unwrap();
        assert_eq!(own.users.len(), 1);
        assert_eq!(own.users[0].user_id, 1);

        let err = service
            .report(
                &ctx,
                WorkloadFilter {
                    user_id: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_department_head_pinned_to_own_department() {
        let service = WorkloadService::new(seeded_store().await);
        let ctx = AuthContext::new(5, Role::Department, Some(1));

        let report = service.report(&ctx, WorkloadFilter::default()).await.unwrap();
        assert_eq!(report.users.len(), 2);

        let err = service
            .report(
                &ctx,
                WorkloadFilter {
                    department_id: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_alerts_require_analytics_role() {
        let service = WorkloadService::new(seeded_store().await);
        let ctx = AuthContext::new(1, Role::Field, Some(1));
        let err = service.alerts(&ctx, None, None).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_alerts_generated_for_overloaded_user() {
        let store = seeded_store().await;
        store.add_user(user(3, Role::Field, 8.0, Some(1))).await;
        store.add_task(task(10, 3, 9.0, TaskStatus::Pending)).await;

        let service = WorkloadService::new(store);
        let (alerts, summary) = service.alerts(&manager_ctx(), None, None).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].user_id, 3);
        assert_eq!(summary.critical, 1);
    }

    #[tokio::test]
    async fn test_stats_exact_manager_role() {
        let service = WorkloadService::new(seeded_store().await);

        // Admin is not implicitly granted
        let admin = AuthContext::new(9, Role::Admin, None);
        assert_eq!(
            service.stats(&admin).await.unwrap_err().status_code(),
            403
        );

        let stats = service.stats(&manager_ctx()).await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.busy_users, 1);
        assert_eq!(stats.available_users, 1);
        assert_eq!(stats.overloaded_users, 0);
        assert_eq!(stats.total_active_tasks, 3);
        assert_eq!(stats.average_workload, 51);
    }

    #[tokio::test]
    async fn test_store_errors_surface_as_500() {
        use crate::store::MockWorkloadStore;

        let mut store = MockWorkloadStore::new();
        store
            .expect_user_loads()
            .returning(|| Err(StoreError::Backend("connection reset".into())));

        let service = WorkloadService::new(store);
        let err = service.rebalance(&manager_ctx()).await.unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_rebalance_requires_manager() {
        let service = WorkloadService::new(seeded_store().await);
        let admin = AuthContext::new(9, Role::Admin, None);
        assert_eq!(
            service.rebalance(&admin).await.unwrap_err().status_code(),
            403
        );
    }

    #[tokio::test]
    async fn test_rebalance_noop_without_overloaded_users() {
        let service = WorkloadService::new(seeded_store().await);
        let outcome = service.rebalance(&manager_ctx()).await.unwrap();
        assert!(!outcome.rebalanced);
        assert_eq!(outcome.tasks_rebalanced, 0);
        assert_eq!(outcome.overloaded_users, 0);
    }

    #[tokio::test]
    async fn test_rebalance_moves_and_persists() {
        let store = MemoryWorkloadStore::new();
        store.add_user(user(1, Role::Field, 40.0, None)).await;
        store.add_user(user(2, Role::Field, 40.0, None)).await;
        // 45h pending for user 1 -> 112.5%; user 2 idle
        store.add_task(task(1, 1, 10.0, TaskStatus::Pending)).await;
        store.add_task(task(2, 1, 8.0, TaskStatus::Pending)).await;
        store.add_task(task(3, 1, 5.0, TaskStatus::Pending)).await;
        store.add_task(task(4, 1, 22.0, TaskStatus::InProgress)).await;

        let service = WorkloadService::new(store);
        let outcome = service.rebalance(&manager_ctx()).await.unwrap();

        assert!(outcome.rebalanced);
        assert_eq!(outcome.tasks_rebalanced, 3);
        assert_eq!(outcome.overloaded_users, 1);
        assert_eq!(outcome.available_users, 1);

        // Largest pending task must now belong to user 2
        let moved = service.store.task(1).await.unwrap();
        assert_eq!(moved.assignee_id, Some(2));
    }
}
