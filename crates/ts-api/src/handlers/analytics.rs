//! Analytics endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_analytics::{completion_rate, trend_series, AnalyticsOverview, EntityTotals, GroupCount, TrendPoint};
use ts_db::aggregates::AggregateRepository;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

const DEFAULT_WINDOW_DAYS: u32 = 30;
const MAX_WINDOW_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    #[serde(flatten)]
    pub overview: AnalyticsOverview,
    pub trend: Vec<TrendPoint>,
}

/// GET /api/analytics
pub async fn analytics(
    State(state): State<AppState>,
    auth: Auth,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Json<AnalyticsResponse>> {
    if !auth.can_view_analytics() {
        return Err(ApiError::Forbidden);
    }

    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS).min(MAX_WINDOW_DAYS).max(1);

    let repo = AggregateRepository::new(state.db.pool().clone());
    let counts = repo.entity_counts().await?;

    let group = |rows: Vec<(String, i64)>| {
        rows.into_iter()
            .map(|(key, count)| GroupCount::new(key, count))
            .collect::<Vec<_>>()
    };

    let users_by_role = group(repo.users_by_role().await?);
    let tasks_by_status = group(repo.tasks_by_status().await?);
    let tasks_by_priority = group(repo.tasks_by_priority().await?);
    let projects_by_status = group(repo.projects_by_status().await?);

    let now = Utc::now();
    let since = now - Duration::days(days as i64 - 1);
    let created = repo.tasks_created_per_day(since).await?;
    let completed = repo.tasks_completed_per_day(since).await?;
    let trend = trend_series(days, now.date_naive(), &created, &completed);

    let overview = AnalyticsOverview {
        totals: EntityTotals {
            users: counts.users,
            departments: counts.departments,
            projects: counts.projects,
            tasks: counts.tasks,
        },
        users_by_role,
        tasks_by_status,
        tasks_by_priority,
        projects_by_status,
        completion_rate: completion_rate(counts.completed_tasks, counts.tasks),
    };

    Ok(Json(AnalyticsResponse { overview, trend }))
}
