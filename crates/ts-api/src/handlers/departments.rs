//! Department handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ts_core::traits::Id;
use ts_db::departments::{CreateDepartmentDto, DepartmentRepository, UpdateDepartmentDto};
use ts_models::Department;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

/// GET /api/departments
pub async fn list_departments(
    State(state): State<AppState>,
    _auth: Auth,
) -> ApiResult<Json<Vec<Department>>> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    Ok(Json(repo.list().await?))
}

/// GET /api/departments/:id
pub async fn get_department(
    State(state): State<AppState>,
    _auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Department>> {
    let repo = DepartmentRepository::new(state.db.pool().clone());
    let department = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Department"))?;
    Ok(Json(department))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub head_id: Option<Id>,
}

/// POST /api/departments
pub async fn create_department(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateDepartmentRequest>,
) -> ApiResult<(StatusCode, Json<Department>)> {
    if !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let repo = DepartmentRepository::new(state.db.pool().clone());
    let department = repo
        .create(CreateDepartmentDto {
            name: body.name,
            head_id: body.head_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(department)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(default, with = "super::users::double_option")]
    pub head_id: Option<Option<Id>>,
}

/// PATCH /api/departments/:id
pub async fn update_department(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<UpdateDepartmentRequest>,
) -> ApiResult<Json<Department>> {
    if !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let repo = DepartmentRepository::new(state.db.pool().clone());
    let department = repo
        .update(
            id,
            UpdateDepartmentDto {
                name: body.name,
                head_id: body.head_id,
            },
        )
        .await?;
    Ok(Json(department))
}

/// DELETE /api/departments/:id
pub async fn delete_department(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let repo = DepartmentRepository::new(state.db.pool().clone());
    repo.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
