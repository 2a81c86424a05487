//! API error handling
//!
//! Maps the core taxonomy onto HTTP responses. Bodies are deliberately
//! terse: `{"error": "..."}` with no codes or correlation ids; internal
//! causes are logged server-side and never echoed to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use ts_core::{TsError, ValidationErrors};
use ts_db::RepositoryError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Forbidden,
    NotFound { resource: &'static str },
    BadRequest(String),
    Validation(ValidationErrors),
    Internal(String),
}

impl ApiError {
    pub fn not_found(resource: &'static str) -> Self {
        ApiError::NotFound { resource }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Forbidden => "Forbidden".to_string(),
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Validation(errors) => errors.full_messages().join(", "),
            ApiError::Internal(cause) => {
                tracing::error!(cause = %cause, "internal server error");
                "Internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<TsError> for ApiError {
    fn from(err: TsError) -> Self {
        match err {
            TsError::Unauthorized { .. } => ApiError::Unauthorized,
            TsError::Forbidden { .. } => ApiError::Forbidden,
            TsError::NotFound { entity, .. } => ApiError::NotFound { resource: entity },
            TsError::Validation(errors) => ApiError::Validation(errors),
            TsError::Database(cause) | TsError::Internal(cause) | TsError::Config(cause) => {
                ApiError::Internal(cause)
            }
        }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::from(TsError::from(err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut out = ValidationErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("is invalid ({})", error.code));
                out.add(field.to_string(), message);
            }
        }
        ApiError::Validation(out)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::not_found("Task").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::bad_request("nope").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_core_error_mapping() {
        let err: ApiError = TsError::forbidden("wrong role").into();
        assert!(matches!(err, ApiError::Forbidden));

        let err: ApiError = TsError::Database("connection reset".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
