//! Health check endpoints

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use ts_db::Database;

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Health checker service
pub struct HealthChecker {
    start_time: Instant,
    db: Option<Database>,
}

impl HealthChecker {
    pub fn new(db: Option<Database>) -> Self {
        Self {
            start_time: Instant::now(),
            db,
        }
    }

    pub async fn check(&self) -> HealthReport {
        let database = match &self.db {
            Some(db) => match db.ping().await {
                Ok(()) => HealthStatus::Healthy,
                Err(err) => {
                    tracing::warn!(error = %err, "database health check failed");
                    HealthStatus::Unhealthy
                }
            },
            None => HealthStatus::Unhealthy,
        };

        HealthReport {
            status: database,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            database,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// GET /health/live — process is up
pub async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// GET /health/ready — dependencies are reachable
pub async fn readiness(
    State(checker): State<Arc<HealthChecker>>,
) -> (StatusCode, Json<HealthReport>) {
    let report = checker.check().await;
    let status = match report.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}
