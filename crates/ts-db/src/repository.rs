//! Repository error types

use ts_core::traits::Id;
use ts_core::TsError;
use ts_models::UnknownVariant;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored value is not decodable: {0}")]
    Corrupt(#[from] UnknownVariant),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        RepositoryError::NotFound { entity, id }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for TsError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => TsError::not_found(entity, id),
            RepositoryError::Database(e) => TsError::Database(e.to_string()),
            RepositoryError::Corrupt(e) => TsError::Database(e.to_string()),
        }
    }
}
