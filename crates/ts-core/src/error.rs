//! Core error types for TemSafy Pro
//!
//! Every fallible operation below the HTTP layer reports through `TsError`;
//! the API layer maps it onto the response taxonomy.

use std::collections::HashMap;
use thiserror::Error;

/// Core error type for all TemSafy operations
#[derive(Error, Debug)]
pub enum TsError {
    #[error("Not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TsError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        TsError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        TsError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        TsError::Forbidden {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TsError::Internal(message.into())
    }
}

/// HTTP status code mapping for errors
impl TsError {
    pub fn status_code(&self) -> u16 {
        match self {
            TsError::NotFound { .. } => 404,
            TsError::Unauthorized { .. } => 401,
            TsError::Forbidden { .. } => 403,
            TsError::Validation(_) => 400,
            TsError::Database(_) | TsError::Internal(_) | TsError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TsError::NotFound { .. } => "not_found",
            TsError::Unauthorized { .. } => "unauthorized",
            TsError::Forbidden { .. } => "forbidden",
            TsError::Validation(_) => "validation_failed",
            TsError::Database(_) => "database_error",
            TsError::Internal(_) => "internal_error",
            TsError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection
///
/// Field errors are keyed by field name; errors not tied to a field land
/// in `base_errors`.
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: HashMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TsError::not_found("User", 7).status_code(), 404);
        assert_eq!(TsError::unauthorized("no token").status_code(), 401);
        assert_eq!(TsError::forbidden("wrong role").status_code(), 403);
        assert_eq!(TsError::Database("boom".into()).status_code(), 500);

        let mut errors = ValidationErrors::new();
        errors.add("email", "is required");
        assert_eq!(TsError::Validation(errors).status_code(), 400);
    }

    #[test]
    fn test_validation_errors_merge() {
        let mut a = ValidationErrors::new();
        a.add("name", "can't be blank");

        let mut b = ValidationErrors::new();
        b.add("name", "is too short");
        b.add_base("something else");

        a.merge(b);
        assert_eq!(a.errors.get("name").map(Vec::len), Some(2));
        assert_eq!(a.base_errors.len(), 1);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_full_messages() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "is invalid");
        let messages = errors.full_messages();
        assert_eq!(messages, vec!["email is invalid".to_string()]);
    }
}
