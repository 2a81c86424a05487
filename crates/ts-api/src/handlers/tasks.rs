//! Task, phase, and feedback handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_core::pagination::PaginatedResult;
use ts_core::traits::Id;
use ts_db::feedback::{CreateFeedbackDto, FeedbackRepository};
use ts_db::tasks::{CreateTaskDto, TaskFilter, TaskRepository, UpdateTaskDto};
use ts_models::task::phase_completion_ratio;
use ts_models::{Feedback, Task, TaskPhase, TaskPriority, TaskStatus};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth, Paginated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub assignee_id: Option<Id>,
    pub project_id: Option<Id>,
    pub department_id: Option<Id>,
    pub status: Option<String>,
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListTasksQuery>,
    Paginated(pagination): Paginated,
) -> ApiResult<Json<PaginatedResult<Task>>> {
    let status = query
        .status
        .as_deref()
        .map(TaskStatus::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    // Field users see their own assignments only
    let mut filter = TaskFilter {
        assignee_id: query.assignee_id,
        project_id: query.project_id,
        department_id: query.department_id,
        status,
    };
    if auth.role.is_field() {
        filter.assignee_id = Some(auth.user_id);
    } else if auth.role.is_department() {
        filter.department_id = auth.department_id;
    }

    let repo = TaskRepository::new(state.db.pool().clone());
    Ok(Json(repo.list(filter, pagination).await?))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Task>> {
    let repo = TaskRepository::new(state.db.pool().clone());
    let task = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    if auth.role.is_field()
        && task.assignee_id != Some(auth.user_id)
        && task.created_by != auth.user_id
    {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(task))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub estimated_hours: Option<f64>,
    pub assignee_id: Option<Id>,
    pub project_id: Id,
    pub department_id: Option<Id>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    if !auth.can_manage_tasks() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let status = normalize_status(body.status.as_deref())?.unwrap_or_default();
    let priority = normalize_priority(body.priority.as_deref())?.unwrap_or_default();

    let repo = TaskRepository::new(state.db.pool().clone());
    let task = repo
        .create(CreateTaskDto {
            title: body.title,
            description: body.description,
            status,
            priority,
            estimated_hours: body.estimated_hours,
            assignee_id: body.assignee_id,
            project_id: body.project_id,
            department_id: body.department_id,
            created_by: auth.user_id,
            start_date: body.start_date,
            end_date: body.end_date,
        })
        .await?;

    tracing::info!(task_id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, with = "super::users::double_option")]
    pub estimated_hours: Option<Option<f64>>,
    #[serde(default, with = "super::users::double_option")]
    pub assignee_id: Option<Option<Id>>,
    #[serde(default, with = "super::users::double_option")]
    pub department_id: Option<Option<Id>>,
    #[serde(default, with = "super::users::double_option")]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "super::users::double_option")]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

/// PATCH /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    body.validate()?;

    let repo = TaskRepository::new(state.db.pool().clone());
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    // Assignees may move their own task through statuses; everything
    // else is a management action
    let is_assignee = existing.assignee_id == Some(auth.user_id);
    if !auth.can_manage_tasks() {
        let only_status = body.title.is_none()
            && body.description.is_none()
            && body.priority.is_none()
            && body.estimated_hours.is_none()
            && body.assignee_id.is_none()
            && body.department_id.is_none()
            && body.start_date.is_none()
            && body.end_date.is_none();
        if !is_assignee || !only_status {
            return Err(ApiError::Forbidden);
        }
    }

    let status = normalize_status(body.status.as_deref())?;
    let priority = normalize_priority(body.priority.as_deref())?;

    let task = repo
        .update(
            id,
            UpdateTaskDto {
                title: body.title,
                description: body.description,
                status,
                priority,
                estimated_hours: body.estimated_hours,
                assignee_id: body.assignee_id,
                department_id: body.department_id,
                start_date: body.start_date,
                end_date: body.end_date,
            },
        )
        .await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    if !auth.can_manage_tasks() {
        return Err(ApiError::Forbidden);
    }

    let repo = TaskRepository::new(state.db.pool().clone());
    repo.delete(id).await?;
    tracing::info!(task_id = id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

// Phases

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasesResponse {
    pub phases: Vec<TaskPhase>,
    /// Share of completed phases, 0-100
    pub completion: u32,
}

/// GET /api/tasks/:id/phases
pub async fn list_phases(
    State(state): State<AppState>,
    _auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<PhasesResponse>> {
    let repo = TaskRepository::new(state.db.pool().clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    let phases = repo.list_phases(id).await?;
    let completion = phase_completion_ratio(&phases);
    Ok(Json(PhasesResponse { phases, completion }))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhaseRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub position: Option<i32>,
    pub status: Option<String>,
    pub estimated_time: Option<f64>,
    pub assigned_to_id: Option<Id>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// POST /api/tasks/:id/phases
pub async fn create_phase(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<CreatePhaseRequest>,
) -> ApiResult<(StatusCode, Json<TaskPhase>)> {
    if !auth.can_manage_tasks() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let status = normalize_status(body.status.as_deref())?.unwrap_or_default();

    let repo = TaskRepository::new(state.db.pool().clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    let phase = repo
        .create_phase(&TaskPhase {
            id: None,
            task_id: id,
            name: body.name,
            position: body.position.unwrap_or(0),
            status,
            estimated_time: body.estimated_time,
            actual_time: None,
            assigned_to_id: body.assigned_to_id,
            start_date: body.start_date,
            end_date: body.end_date,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(phase)))
}

// Feedback

/// GET /api/tasks/:id/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    _auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<Feedback>>> {
    let tasks = TaskRepository::new(state.db.pool().clone());
    tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    let repo = FeedbackRepository::new(state.db.pool().clone());
    Ok(Json(repo.list_for_task(id).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    pub comment: Option<String>,
}

/// POST /api/tasks/:id/feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<CreateFeedbackRequest>,
) -> ApiResult<(StatusCode, Json<Feedback>)> {
    body.validate()?;

    let tasks = TaskRepository::new(state.db.pool().clone());
    tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Task"))?;

    let repo = FeedbackRepository::new(state.db.pool().clone());
    let feedback = repo
        .create(CreateFeedbackDto {
            task_id: id,
            author_id: auth.user_id,
            rating: body.rating,
            comment: body.comment,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

fn normalize_status(value: Option<&str>) -> ApiResult<Option<TaskStatus>> {
    value
        .map(TaskStatus::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

fn normalize_priority(value: Option<&str>) -> ApiResult<Option<TaskPriority>> {
    value
        .map(TaskPriority::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
