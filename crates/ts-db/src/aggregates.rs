//! Grouped-count aggregation queries
//!
//! Feeds the analytics aggregator and the dashboard snapshot. All
//! results are plain (key, count) pairs; shaping happens downstream.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::repository::RepositoryResult;

/// Aggregation query executor
pub struct AggregateRepository {
    pool: PgPool,
}

/// Entity counts in one round trip apiece
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityCounts {
    pub users: i64,
    pub departments: i64,
    pub projects: i64,
    pub tasks: i64,
    pub active_tasks: i64,
    pub completed_tasks: i64,
}

impl AggregateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn users_by_role(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn tasks_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM tasks GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn tasks_by_priority(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT priority, COUNT(*) FROM tasks GROUP BY priority ORDER BY priority",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn projects_by_status(&self) -> RepositoryResult<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM projects GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn entity_counts(&self) -> RepositoryResult<EntityCounts> {
        let users = self.count("SELECT COUNT(*) FROM users").await?;
        let departments = self.count("SELECT COUNT(*) FROM departments").await?;
        let projects = self.count("SELECT COUNT(*) FROM projects").await?;
        let tasks = self.count("SELECT COUNT(*) FROM tasks").await?;
        let active_tasks = self
            .count("SELECT COUNT(*) FROM tasks WHERE status IN ('PENDING', 'IN_PROGRESS')")
            .await?;
        let completed_tasks = self
            .count("SELECT COUNT(*) FROM tasks WHERE status = 'COMPLETED'")
            .await?;

        Ok(EntityCounts {
            users,
            departments,
            projects,
            tasks,
            active_tasks,
            completed_tasks,
        })
    }

    /// Per-day creation counts since `since`
    pub async fn tasks_created_per_day(
        &self,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(NaiveDate, i64)>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT created_at::date AS day, COUNT(*)
            FROM tasks
            WHERE created_at >= $1
            GROUP BY day ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Per-day completion counts since `since`
    ///
    /// Completion time is approximated by updated_at of completed tasks.
    pub async fn tasks_completed_per_day(
        &self,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<(NaiveDate, i64)>> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT updated_at::date AS day, COUNT(*)
            FROM tasks
            WHERE status = 'COMPLETED' AND updated_at >= $1
            GROUP BY day ORDER BY day
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self, sql: &str) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
