//! Feedback repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use ts_core::traits::Id;
use ts_models::Feedback;

use crate::repository::RepositoryResult;

/// Feedback database row
#[derive(Debug, Clone, FromRow)]
pub struct FeedbackRow {
    pub id: i64,
    pub task_id: i64,
    pub author_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackRow {
    pub fn into_feedback(self) -> Feedback {
        Feedback {
            id: Some(self.id),
            task_id: self.task_id,
            author_id: self.author_id,
            rating: self.rating,
            comment: self.comment,
            created_at: Some(self.created_at),
        }
    }
}

/// DTO for creating feedback
#[derive(Debug, Clone)]
pub struct CreateFeedbackDto {
    pub task_id: Id,
    pub author_id: Id,
    pub rating: i32,
    pub comment: Option<String>,
}

const FEEDBACK_COLUMNS: &str = "id, task_id, author_id, rating, comment, created_at";

/// Feedback repository implementation
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_task(&self, task_id: Id) -> RepositoryResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE task_id = $1 ORDER BY created_at DESC"
        ))
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FeedbackRow::into_feedback).collect())
    }

    pub async fn create(&self, dto: CreateFeedbackDto) -> RepositoryResult<Feedback> {
        let row = sqlx::query_as::<_, FeedbackRow>(&format!(
            r#"
            INSERT INTO feedback (task_id, author_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {FEEDBACK_COLUMNS}
            "#
        ))
        .bind(dto.task_id)
        .bind(dto.author_id)
        .bind(dto.rating)
        .bind(&dto.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_feedback())
    }
}
