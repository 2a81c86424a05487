//! Database layer for TemSafy Pro
//!
//! PostgreSQL repositories over sqlx. Row structs hold raw column
//! values; conversion into domain models runs the enum normalization,
//! so legacy spellings stored by earlier versions are still readable.

pub mod aggregates;
pub mod departments;
pub mod feedback;
pub mod pool;
pub mod projects;
pub mod repository;
pub mod tasks;
pub mod users;
pub mod workload_store;

pub use pool::{Database, DatabaseConfig};
pub use repository::{RepositoryError, RepositoryResult};
pub use workload_store::PgWorkloadStore;
