//! User management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use ts_auth::hash_password;
use ts_core::pagination::PaginatedResult;
use ts_core::traits::Id;
use ts_db::users::{CreateUserDto, UpdateUserDto, UserRepository};
use ts_models::{Role, User, DEFAULT_CAPACITY_HOURS};
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth, Paginated};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub department_id: Option<Id>,
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<ListUsersQuery>,
    Paginated(pagination): Paginated,
) -> ApiResult<Json<PaginatedResult<User>>> {
    if !auth.can_view_analytics() {
        return Err(ApiError::Forbidden);
    }

    // Department heads only see their own department
    let department_id = if auth.role.is_department() {
        auth.department_id
    } else {
        query.department_id
    };

    let repo = UserRepository::new(state.db.pool().clone());
    let users = repo.list(department_id, pagination).await?;
    Ok(Json(users))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<User>> {
    let repo = UserRepository::new(state.db.pool().clone());
    let user = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    if !auth.can_view_workload_of(id, user.department_id) {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: String,
    pub capacity: Option<f64>,
    pub department_id: Option<Id>,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: Auth,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    let role = Role::normalize(&body.role).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let password_hash =
        hash_password(&body.password).map_err(|e| ApiError::internal(e.to_string()))?;

    let repo = UserRepository::new(state.db.pool().clone());
    let user = repo
        .create(CreateUserDto {
            name: body.name,
            email: body.email,
            password_hash,
            role,
            capacity: body.capacity.unwrap_or(DEFAULT_CAPACITY_HOURS),
            department_id: body.department_id,
        })
        .await?;

    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub role: Option<String>,
    pub capacity: Option<f64>,
    /// Present-and-null clears the department
    #[serde(default, with = "double_option")]
    pub department_id: Option<Option<Id>>,
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let is_self = auth.user_id == id;
    if !is_self && !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    body.validate()?;

    // Role and department changes are a management action even on
    // yourself
    if (body.role.is_some() || body.department_id.is_some()) && !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }

    let role = body
        .role
        .as_deref()
        .map(Role::normalize)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let password_hash = body
        .password
        .as_deref()
        .map(hash_password)
        .transpose()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let repo = UserRepository::new(state.db.pool().clone());
    let user = repo
        .update(
            id,
            UpdateUserDto {
                name: body.name,
                email: body.email,
                password_hash,
                role,
                capacity: body.capacity,
                department_id: body.department_id,
            },
        )
        .await?;

    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: Auth,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    if !auth.can_manage_users() {
        return Err(ApiError::Forbidden);
    }
    if auth.user_id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    let repo = UserRepository::new(state.db.pool().clone());
    repo.delete(id).await?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Deserializes a field that distinguishes absent from null
pub(crate) mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
