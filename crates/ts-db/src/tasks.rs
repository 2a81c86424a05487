//! Task and task phase repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use ts_core::pagination::{PaginatedResult, Pagination};
use ts_core::traits::Id;
use ts_models::{Task, TaskPhase, TaskPriority, TaskStatus};

use crate::repository::{RepositoryError, RepositoryResult};

/// Task database row
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub estimated_hours: Option<f64>,
    pub assignee_id: Option<i64>,
    pub project_id: i64,
    pub department_id: Option<i64>,
    pub created_by: i64,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    /// Convert into the domain model, normalizing status and priority
    pub fn into_task(self) -> RepositoryResult<Task> {
        Ok(Task {
            id: Some(self.id),
            title: self.title,
            description: self.description,
            status: TaskStatus::normalize(&self.status)?,
            priority: TaskPriority::normalize(&self.priority)?,
            estimated_hours: self.estimated_hours,
            assignee_id: self.assignee_id,
            project_id: self.project_id,
            department_id: self.department_id,
            created_by: self.created_by,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        })
    }
}

/// Task phase database row
#[derive(Debug, Clone, FromRow)]
pub struct TaskPhaseRow {
    pub id: i64,
    pub task_id: i64,
    pub name: String,
    pub position: i32,
    pub status: String,
    pub estimated_time: Option<f64>,
    pub actual_time: Option<f64>,
    pub assigned_to_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TaskPhaseRow {
    pub fn into_phase(self) -> RepositoryResult<TaskPhase> {
        Ok(TaskPhase {
            id: Some(self.id),
            task_id: self.task_id,
            name: self.name,
            position: self.position,
            status: TaskStatus::normalize(&self.status)?,
            estimated_time: self.estimated_time,
            actual_time: self.actual_time,
            assigned_to_id: self.assigned_to_id,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// DTO for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskDto {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub estimated_hours: Option<f64>,
    pub assignee_id: Option<Id>,
    pub project_id: Id,
    pub department_id: Option<Id>,
    pub created_by: Id,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// DTO for updating a task; None leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskDto {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub estimated_hours: Option<Option<f64>>,
    pub assignee_id: Option<Option<Id>>,
    pub department_id: Option<Option<Id>>,
    pub start_date: Option<Option<DateTime<Utc>>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
}

/// List filter for tasks
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub assignee_id: Option<Id>,
    pub project_id: Option<Id>,
    pub department_id: Option<Id>,
    pub status: Option<TaskStatus>,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, estimated_hours, \
     assignee_id, project_id, department_id, created_by, start_date, end_date, \
     created_at, updated_at";

const PHASE_COLUMNS: &str = "id, task_id, name, position, status, estimated_time, \
     actual_time, assigned_to_id, start_date, end_date";

/// Task repository implementation
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TaskRow::into_task).transpose()
    }

    /// List tasks matching a filter, newest first
    pub async fn list(
        &self,
        filter: TaskFilter,
        pagination: Pagination,
    ) -> RepositoryResult<PaginatedResult<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE ($1::bigint IS NULL OR assignee_id = $1)
              AND ($2::bigint IS NULL OR project_id = $2)
              AND ($3::bigint IS NULL OR department_id = $3)
              AND ($4::text IS NULL OR status = $4)
            ORDER BY id DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.assignee_id)
        .bind(filter.project_id)
        .bind(filter.department_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM tasks
            WHERE ($1::bigint IS NULL OR assignee_id = $1)
              AND ($2::bigint IS NULL OR project_id = $2)
              AND ($3::bigint IS NULL OR department_id = $3)
              AND ($4::text IS NULL OR status = $4)
            "#,
        )
        .bind(filter.assignee_id)
        .bind(filter.project_id)
        .bind(filter.department_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;

        let tasks = rows
            .into_iter()
            .map(TaskRow::into_task)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(PaginatedResult::new(tasks, total, pagination))
    }

    /// Most recently touched tasks, for the dashboard snapshot
    pub async fn recent(&self, limit: i64) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY updated_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Active tasks past their deadline
    pub async fn overdue(&self, now: DateTime<Utc>) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE status IN ('PENDING', 'IN_PROGRESS') AND end_date < $1
            ORDER BY end_date ASC
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Active urgent tasks
    pub async fn urgent(&self) -> RepositoryResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM tasks
            WHERE status IN ('PENDING', 'IN_PROGRESS') AND priority = 'URGENT'
            ORDER BY id DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    pub async fn create(&self, dto: CreateTaskDto) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (
                title, description, status, priority, estimated_hours,
                assignee_id, project_id, department_id, created_by,
                start_date, end_date, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.status.as_str())
        .bind(dto.priority.as_str())
        .bind(dto.estimated_hours)
        .bind(dto.assignee_id)
        .bind(dto.project_id)
        .bind(dto.department_id)
        .bind(dto.created_by)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(&self.pool)
        .await?;

        row.into_task()
    }

    pub async fn update(&self, id: Id, dto: UpdateTaskDto) -> RepositoryResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                status = COALESCE($3, status),
                priority = COALESCE($4, priority),
                estimated_hours = CASE WHEN $5 THEN $6 ELSE estimated_hours END,
                assignee_id = CASE WHEN $7 THEN $8 ELSE assignee_id END,
                department_id = CASE WHEN $9 THEN $10 ELSE department_id END,
                start_date = CASE WHEN $11 THEN $12 ELSE start_date END,
                end_date = CASE WHEN $13 THEN $14 ELSE end_date END,
                updated_at = NOW()
            WHERE id = $15
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.status.map(|s| s.as_str()))
        .bind(dto.priority.map(|p| p.as_str()))
        .bind(dto.estimated_hours.is_some())
        .bind(dto.estimated_hours.flatten())
        .bind(dto.assignee_id.is_some())
        .bind(dto.assignee_id.flatten())
        .bind(dto.department_id.is_some())
        .bind(dto.department_id.flatten())
        .bind(dto.start_date.is_some())
        .bind(dto.start_date.flatten())
        .bind(dto.end_date.is_some())
        .bind(dto.end_date.flatten())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound { entity: "Task", id })?;

        row.into_task()
    }

    pub async fn delete(&self, id: Id) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Task", id));
        }
        Ok(())
    }

    // Phases

    pub async fn list_phases(&self, task_id: Id) -> RepositoryResult<Vec<TaskPhase>> {
        let rows = sqlx::query_as::<_, TaskPhaseRow>(&format!(
            "SELECT {PHASE_COLUMNS} FROM task_phases WHERE task_id = $1 ORDER BY position ASC"
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TaskPhaseRow::into_phase).collect()
    }

    pub async fn create_phase(&self, phase: &TaskPhase) -> RepositoryResult<TaskPhase> {
        let row = sqlx::query_as::<_, TaskPhaseRow>(&format!(
            r#"
            INSERT INTO task_phases (
                task_id, name, position, status, estimated_time, actual_time,
                assigned_to_id, start_date, end_date
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PHASE_COLUMNS}
            "#
        ))
        .bind(phase.task_id)
        .bind(&phase.name)
        .bind(phase.position)
        .bind(phase.status.as_str())
        .bind(phase.estimated_time)
        .bind(phase.actual_time)
        .bind(phase.assigned_to_id)
        .bind(phase.start_date)
        .bind(phase.end_date)
        .fetch_one(&self.pool)
        .await?;

        row.into_phase()
    }
}
