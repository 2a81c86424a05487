//! Authentication handlers
//!
//! Credential login issues the JWT and records its session entry;
//! logout revokes the entry so the token dies before its expiry.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use ts_auth::verify_password;
use ts_db::users::UserRepository;
use ts_models::User;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    body.validate()?;

    let repo = UserRepository::new(state.db.pool().clone());
    let row = repo
        .find_by_email(&body.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let verified = verify_password(&body.password, &row.password_hash)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !verified {
        return Err(ApiError::Unauthorized);
    }

    let user = row.into_user()?;
    let (token, jti) = state
        .jwt
        .issue(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    state
        .sessions
        .insert(jti, user.id.unwrap_or_default(), state.jwt.expiration_seconds());

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: Auth) -> ApiResult<Json<User>> {
    let repo = UserRepository::new(state.db.pool().clone());
    let user = repo
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(user))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: Auth,
) -> ApiResult<Json<serde_json::Value>> {
    state.sessions.revoke(&auth.token_id);
    Ok(Json(serde_json::json!({ "message": "Logged out" })))
}
