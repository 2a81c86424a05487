//! API handlers, one module per resource

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod departments;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod workload;
