//! Project model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::UnknownVariant;

/// Project status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub fn normalize(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(ProjectStatus::Active),
            "ON_HOLD" => Ok(ProjectStatus::OnHold),
            "COMPLETED" => Ok(ProjectStatus::Completed),
            "ARCHIVED" => Ok(ProjectStatus::Archived),
            other => Err(UnknownVariant::new("project status", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::OnHold => "ON_HOLD",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Archived => "ARCHIVED",
        }
    }
}

/// Role within a project
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    Manager,
    Participant,
}

impl ProjectRole {
    pub fn normalize(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MANAGER" => Ok(ProjectRole::Manager),
            "PARTICIPANT" => Ok(ProjectRole::Participant),
            other => Err(UnknownVariant::new("project role", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Manager => "MANAGER",
            ProjectRole::Participant => "PARTICIPANT",
        }
    }
}

/// Membership of a user in a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParticipation {
    pub project_id: Id,
    pub user_id: Id,
    pub role: ProjectRole,
}

/// Project entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub status: ProjectStatus,

    /// Departments this project spans
    #[serde(default)]
    pub department_ids: Vec<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            status: ProjectStatus::Active,
            department_ids: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Project {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Project {
    const TABLE_NAME: &'static str = "projects";
    const TYPE_NAME: &'static str = "Project";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_normalize() {
        assert_eq!(ProjectStatus::normalize("active"), Ok(ProjectStatus::Active));
        assert_eq!(ProjectStatus::normalize("ON_HOLD"), Ok(ProjectStatus::OnHold));
        assert!(ProjectStatus::normalize("PAUSED").is_err());
    }

    #[test]
    fn test_project_role_normalize() {
        assert_eq!(ProjectRole::normalize("MANAGER"), Ok(ProjectRole::Manager));
        assert!(ProjectRole::normalize("OWNER").is_err());
    }
}
