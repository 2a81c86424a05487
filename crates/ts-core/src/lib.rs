//! Core types, errors, and configuration for TemSafy Pro.

pub mod config;
pub mod error;
pub mod pagination;
pub mod traits;

pub use error::{TsError, ValidationErrors};
pub use traits::Id;

/// Standard Result type for TemSafy operations
pub type TsResult<T> = Result<T, TsError>;
