//! REST API for TemSafy Pro
//!
//! Axum handlers over the repositories and the workload, analytics, and
//! sync subsystems. Every route requires an authenticated session; the
//! [`extractors::Auth`] extractor builds the per-request AuthContext at
//! the boundary.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
