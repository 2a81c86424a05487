//! Axum extractors and shared application state

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::request::Parts,
};
use std::sync::Arc;

use ts_auth::{extract_bearer_token, AuthContext, JwtService, SessionRegistry};
use ts_core::pagination::Pagination;
use ts_db::Database;

use crate::error::ApiError;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtService>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtService) -> Self {
        Self {
            db,
            jwt: Arc::new(jwt),
            sessions: Arc::new(SessionRegistry::new()),
        }
    }
}

/// Authenticated request context
///
/// Built once per request from the bearer token; the session registry
/// is consulted so revoked tokens stop working before their expiry.
pub struct Auth {
    pub ctx: AuthContext,
    /// Token id, needed by logout
    pub token_id: String,
}

impl std::ops::Deref for Auth {
    type Target = AuthContext;

    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = extract_bearer_token(header).ok_or(ApiError::Unauthorized)?;

        let (ctx, token_id) = app_state
            .jwt
            .authenticate(token)
            .map_err(|_| ApiError::Unauthorized)?;

        if !app_state.sessions.is_live(&token_id) {
            return Err(ApiError::Unauthorized);
        }

        Ok(Auth { ctx, token_id })
    }
}

/// Pagination query parameters with defaults
pub struct Paginated(pub Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for Paginated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pagination) = Query::<Pagination>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(Pagination::default()));
        Ok(Paginated(pagination))
    }
}
