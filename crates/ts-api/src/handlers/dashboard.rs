//! Dashboard snapshot endpoint
//!
//! The unified payload the polling layer consumes. The handler is an
//! idempotent read; change detection and diffing happen client-side in
//! ts-sync.

use axum::{extract::State, Json};
use chrono::Utc;
use ts_db::projects::ProjectRepository;
use ts_db::tasks::TaskRepository;
use ts_db::{aggregates::AggregateRepository, PgWorkloadStore};
use ts_models::{Project, Task};
use ts_sync::{
    CriticalItems, DashboardSnapshot, ProjectDigest, RecentActivity, SnapshotSummary, TaskDigest,
};
use ts_workload::{team_summary, WorkloadFilter, WorkloadService};

use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

const RECENT_LIMIT: i64 = 20;

fn task_digest(task: &Task) -> TaskDigest {
    TaskDigest {
        id: task.id.unwrap_or_default(),
        title: task.title.clone(),
        status: task.status,
        priority: task.priority,
        assignee_id: task.assignee_id,
        department_id: task.department_id,
        created_by: task.created_by,
        end_date: task.end_date,
    }
}

fn project_digest(project: &Project) -> ProjectDigest {
    ProjectDigest {
        id: project.id.unwrap_or_default(),
        name: project.name.clone(),
        status: project.status,
        department_ids: project.department_ids.clone(),
    }
}

/// GET /api/dashboard/real-time
pub async fn real_time(
    State(state): State<AppState>,
    auth: Auth,
) -> ApiResult<Json<DashboardSnapshot>> {
    let pool = state.db.pool().clone();
    let aggregates = AggregateRepository::new(pool.clone());
    let tasks = TaskRepository::new(pool.clone());
    let projects = ProjectRepository::new(pool.clone());

    let counts = aggregates.entity_counts().await?;
    let now = Utc::now();
    let overdue = tasks.overdue(now).await?;
    let urgent = tasks.urgent().await?;
    let recent_tasks = tasks.recent(RECENT_LIMIT).await?;
    let recent_projects = projects.recent(RECENT_LIMIT).await?;

    // Workload rollup scoped to what this viewer may see
    let workload_service = WorkloadService::new(PgWorkloadStore::new(pool));
    let report = workload_service
        .report(&auth.ctx, WorkloadFilter::default())
        .await?;
    let workload = report
        .team_summary
        .unwrap_or_else(|| team_summary(&report.users));

    let snapshot = DashboardSnapshot {
        summary: SnapshotSummary {
            users: counts.users,
            departments: counts.departments,
            projects: counts.projects,
            active_tasks: counts.active_tasks,
            completed_tasks: counts.completed_tasks,
        },
        critical: CriticalItems {
            overdue_tasks: overdue.iter().map(task_digest).collect(),
            urgent_tasks: urgent.iter().map(task_digest).collect(),
        },
        workload,
        recent: RecentActivity {
            tasks: recent_tasks.iter().map(task_digest).collect(),
            projects: recent_projects.iter().map(project_digest).collect(),
        },
        timestamp: now,
    };

    Ok(Json(snapshot))
}
