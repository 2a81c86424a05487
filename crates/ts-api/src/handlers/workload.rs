//! Workload endpoints
//!
//! Thin wrappers over the workload service; all role scoping happens
//! there so the rules hold for every caller, not just HTTP.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use ts_core::traits::Id;
use ts_db::PgWorkloadStore;
use ts_workload::{
    Alert, AlertSeverity, AlertSummary, RebalanceOutcome, WorkloadFilter, WorkloadReport,
    WorkloadService, WorkloadStats,
};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

fn service(state: &AppState) -> WorkloadService<PgWorkloadStore> {
    WorkloadService::new(PgWorkloadStore::new(state.db.pool().clone()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadQuery {
    pub user_id: Option<Id>,
    pub department_id: Option<Id>,
    #[serde(default)]
    pub include_project_participants: bool,
}

/// GET /api/users/workload
pub async fn users_workload(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<WorkloadQuery>,
) -> ApiResult<Json<WorkloadReport>> {
    let report = service(&state)
        .report(
            &auth.ctx,
            WorkloadFilter {
                user_id: query.user_id,
                department_id: query.department_id,
                include_project_participants: query.include_project_participants,
            },
        )
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    pub department_id: Option<Id>,
    pub severity: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub summary: AlertSummary,
}

/// GET /api/workload/alerts
pub async fn alerts(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<AlertsQuery>,
) -> ApiResult<Json<AlertsResponse>> {
    let severity = match query.severity.as_deref() {
        None => None,
        Some("critical") => Some(AlertSeverity::Critical),
        Some("warning") => Some(AlertSeverity::Warning),
        Some(other) => {
            return Err(ApiError::bad_request(format!(
                "Unknown severity: {other}"
            )))
        }
    };

    let (alerts, summary) = service(&state)
        .alerts(&auth.ctx, query.department_id, severity)
        .await?;
    Ok(Json(AlertsResponse { alerts, summary }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: RebalanceOutcome,
}

/// POST /api/workload/rebalance
pub async fn rebalance(
    State(state): State<AppState>,
    auth: Auth,
) -> ApiResult<Json<RebalanceResponse>> {
    let outcome = service(&state).rebalance(&auth.ctx).await?;

    let message = if outcome.rebalanced {
        format!("Rebalanced {} task(s)", outcome.tasks_rebalanced)
    } else {
        "No rebalancing needed".to_string()
    };
    Ok(Json(RebalanceResponse { message, outcome }))
}

/// GET /api/workload/stats
pub async fn stats(State(state): State<AppState>, auth: Auth) -> ApiResult<Json<WorkloadStats>> {
    let stats = service(&state).stats(&auth.ctx).await?;
    Ok(Json(stats))
}
