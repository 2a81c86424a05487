//! Task and task phase models
//!
//! Tasks drive the workload hour totals while their status is active
//! (Pending or InProgress). Status and priority are closed enums with
//! legacy-alias normalization (`TODO` -> Pending, `CRITICAL` -> Urgent).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::UnknownVariant;

/// Task status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Normalize a status string, accepting the legacy `TODO` alias
    pub fn normalize(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "TODO" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            "CANCELLED" => Ok(TaskStatus::Cancelled),
            other => Err(UnknownVariant::new("task status", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Active tasks count toward workload hours
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Normalize a priority string, accepting the legacy `CRITICAL` alias
    pub fn normalize(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(TaskPriority::Low),
            "MEDIUM" => Ok(TaskPriority::Medium),
            "HIGH" => Ok(TaskPriority::High),
            "URGENT" | "CRITICAL" => Ok(TaskPriority::Urgent),
            other => Err(UnknownVariant::new("task priority", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

/// Task entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub priority: TaskPriority,

    pub estimated_hours: Option<f64>,

    pub assignee_id: Option<Id>,

    pub project_id: Id,

    pub department_id: Option<Id>,

    pub created_by: Id,

    pub start_date: Option<DateTime<Utc>>,

    /// Deadline; active tasks past this are overdue
    pub end_date: Option<DateTime<Utc>>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_active()
            && self.end_date.map(|end| end < now).unwrap_or(false)
    }

    pub fn is_urgent(&self) -> bool {
        self.priority == TaskPriority::Urgent
    }
}

impl Identifiable for Task {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Task {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Task {
    const TABLE_NAME: &'static str = "tasks";
    const TYPE_NAME: &'static str = "Task";
}

/// Phase status within a task
pub type PhaseStatus = TaskStatus;

/// Task phase entity
///
/// Phases subdivide a task; their completion ratio feeds project
/// progress views.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskPhase {
    pub id: Option<Id>,

    pub task_id: Id,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Sort position within the task
    #[serde(default)]
    pub position: i32,

    #[serde(default)]
    pub status: PhaseStatus,

    pub estimated_time: Option<f64>,
    pub actual_time: Option<f64>,

    pub assigned_to_id: Option<Id>,

    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TaskPhase {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Completion ratio over a task's phases, as a 0-100 percentage
pub fn phase_completion_ratio(phases: &[TaskPhase]) -> u32 {
    if phases.is_empty() {
        return 0;
    }
    let completed = phases.iter().filter(|p| p.is_completed()).count();
    ((completed as f64 / phases.len() as f64) * 100.0).round() as u32
}
