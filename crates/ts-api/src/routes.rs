//! API routes

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{
    analytics, auth, dashboard, departments, projects, tasks, users, workload,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_router())
        .nest("/users", users_router())
        .nest("/departments", departments_router())
        .nest("/projects", projects_router())
        .nest("/tasks", tasks_router())
        .nest("/workload", workload_router())
        .route("/dashboard/real-time", get(dashboard::real_time))
        .route("/analytics", get(analytics::analytics))
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        // Static segment must be registered alongside the id capture
        .route("/workload", get(workload::users_workload))
        .route("/:id", get(users::get_user))
        .route("/:id", patch(users::update_user))
        .route("/:id", delete(users::delete_user))
}

fn departments_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(departments::list_departments).post(departments::create_department),
        )
        .route("/:id", get(departments::get_department))
        .route("/:id", patch(departments::update_department))
        .route("/:id", delete(departments::delete_department))
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects).post(projects::create_project))
        .route("/:id", get(projects::get_project))
        .route("/:id", patch(projects::update_project))
        .route("/:id", delete(projects::delete_project))
        .route(
            "/:id/participants",
            get(projects::list_participants).post(projects::add_participant),
        )
}

fn tasks_router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route("/:id", get(tasks::get_task))
        .route("/:id", patch(tasks::update_task))
        .route("/:id", delete(tasks::delete_task))
        .route(
            "/:id/phases",
            get(tasks::list_phases).post(tasks::create_phase),
        )
        .route(
            "/:id/feedback",
            get(tasks::list_feedback).post(tasks::create_feedback),
        )
}

fn workload_router() -> Router<AppState> {
    Router::new()
        .route("/alerts", get(workload::alerts))
        .route("/rebalance", post(workload::rebalance))
        .route("/stats", get(workload::stats))
}
