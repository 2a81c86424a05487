//! Project handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ts_core::traits::Id;
use ts_db::projects::{CreateProjectDto, ProjectRepository, UpdateProjectDto};
use ts_models::{Project, ProjectParticipation, ProjectRole, ProjectStatus};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub department_id: Option<Id>,
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    // Everyone sees projects; department heads default to their own
    let department_id = query.department_id.or_else(|| {
        auth.role
            .is_department()
            .then_some(auth.department_id)
            .flatten()
    });

    let repo = ProjectRepository::new(state.db.pool().clone());
    Ok(Json(repo.list(department_id).await?))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    _auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Project>> {
    let repo = ProjectRepository::new(state.db.pool().clone());
    let project = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;
    Ok(Json(project))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub department_ids: Vec<Id>,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    if !auth.can_manage_projects() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let status = body
        .status
        .as_deref()
        .map(ProjectStatus::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .unwrap_or_default();

    let repo = ProjectRepository::new(state.db.pool().clone());
    let project = repo
        .create(CreateProjectDto {
            name: body.name,
            description: body.description,
            status,
            department_ids: body.department_ids,
        })
        .await?;

    tracing::info!(project_id = project.id, "project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub department_ids: Option<Vec<Id>>,
}

/// PATCH /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    if !auth.can_manage_projects() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let status = body
        .status
        .as_deref()
        .map(ProjectStatus::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let repo = ProjectRepository::new(state.db.pool().clone());
    let project = repo
        .update(
            id,
            UpdateProjectDto {
                name: body.name,
                description: body.description,
                status,
                department_ids: body.department_ids,
            },
        )
        .await?;
    Ok(Json(project))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    if !auth.can_manage_projects() {
        return Err(ApiError::Forbidden);
    }

    let repo = ProjectRepository::new(state.db.pool().clone());
    repo.delete(id).await?;
    tracing::info!(project_id = id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/projects/:id/participants
pub async fn list_participants(
    State(state): State<AppState>,
    _auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<ProjectParticipation>>> {
    let repo = ProjectRepository::new(state.db.pool().clone());
    Ok(Json(repo.participants(id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddParticipantRequest {
    pub user_id: Id,
    pub role: Option<String>,
}

/// POST /api/projects/:id/participants
pub async fn add_participant(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<AddParticipantRequest>,
) -> ApiResult<StatusCode> {
    if !auth.can_manage_projects() {
        return Err(ApiError::Forbidden);
    }

    let role = body
        .role
        .as_deref()
        .map(ProjectRole::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .unwrap_or(ProjectRole::Participant);

    let repo = ProjectRepository::new(state.db.pool().clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Project"))?;
    repo.add_participant(id, body.user_id, role).await?;
    Ok(StatusCode::CREATED)
}
