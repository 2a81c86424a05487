//! SQL-backed workload store
//!
//! Implements the workload engine's store trait over the task and user
//! tables. Candidate ordering and the per-user cap happen in SQL so the
//! engine never pages through full task lists.

use async_trait::async_trait;
use sqlx::PgPool;
use ts_core::traits::Id;
use ts_models::User;
use ts_workload::{CandidateTask, StoreError, StoreResult, UserLoad, WorkloadScope, WorkloadStore};

use crate::tasks::TaskRow;
use crate::users::UserRow;

/// PostgreSQL implementation of [`WorkloadStore`]
pub struct PgWorkloadStore {
    pool: PgPool,
}

impl PgWorkloadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl WorkloadStore for PgWorkloadStore {
    async fn users(&self, scope: WorkloadScope) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, capacity, department_id,
                   created_at, updated_at
            FROM users
            WHERE ($1::bigint IS NULL OR id = $1)
              AND ($2::bigint IS NULL
                   OR department_id = $2
                   OR ($3 AND id IN (
                       SELECT user_id FROM project_participants
                       WHERE project_id IN (
                           SELECT project_id FROM project_departments WHERE department_id = $2
                       )
                   )))
            ORDER BY name ASC
            "#,
        )
        .bind(scope.user_id)
        .bind(scope.department_id)
        .bind(scope.include_project_participants)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|row| row.into_user().map_err(|e| StoreError::Backend(e.to_string())))
            .collect()
    }

    async fn active_tasks(&self, user_id: Id) -> StoreResult<Vec<ts_models::Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, estimated_hours,
                   assignee_id, project_id, department_id, created_by,
                   start_date, end_date, created_at, updated_at
            FROM tasks
            WHERE assignee_id = $1 AND status IN ('PENDING', 'IN_PROGRESS')
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter()
            .map(|row| row.into_task().map_err(|e| StoreError::Backend(e.to_string())))
            .collect()
    }

    async fn user_loads(&self) -> StoreResult<Vec<UserLoad>> {
        let rows = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT u.id,
                   COALESCE(SUM(t.estimated_hours) FILTER (
                       WHERE t.status IN ('PENDING', 'IN_PROGRESS')
                   ), 0.0) AS current_hours
            FROM users u
            LEFT JOIN tasks t ON t.assignee_id = u.id
            GROUP BY u.id
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, current_hours)| UserLoad {
                user_id,
                current_hours,
            })
            .collect())
    }

    async fn rebalance_candidates(
        &self,
        user_id: Id,
        limit: usize,
    ) -> StoreResult<Vec<CandidateTask>> {
        let rows = sqlx::query_as::<_, (i64, Option<f64>)>(
            r#"
            SELECT id, estimated_hours
            FROM tasks
            WHERE assignee_id = $1
              AND status = 'PENDING'
              AND priority <> 'URGENT'
            ORDER BY estimated_hours DESC NULLS LAST
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows
            .into_iter()
            .map(|(task_id, hours)| CandidateTask {
                task_id,
                owner_id: user_id,
                estimated_hours: hours.unwrap_or(0.0),
            })
            .collect())
    }

    async fn reassign_task(&self, task_id: Id, assignee_id: Id) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE tasks SET assignee_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(assignee_id)
        .bind(task_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Task",
                id: task_id,
            });
        }
        Ok(())
    }

    async fn count_active_tasks(&self) -> StoreResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE status IN ('PENDING', 'IN_PROGRESS')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }
}
