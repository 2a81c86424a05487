//! Role policy
//!
//! A single closed role type with the capability checks every handler
//! gates on. Legacy inputs (`DEPARTMENT_HEAD`) are normalized here and
//! nowhere else.

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    /// Department head
    Department,
    Field,
}

impl Role {
    /// Normalize a role string, accepting legacy aliases
    pub fn normalize(value: &str) -> Result<Self, UnknownVariant> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "DEPARTMENT" | "DEPARTMENT_HEAD" => Ok(Role::Department),
            "FIELD" => Ok(Role::Field),
            other => Err(UnknownVariant::new("role", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Department => "DEPARTMENT",
            Role::Field => "FIELD",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn is_manager(&self) -> bool {
        matches!(self, Role::Manager)
    }

    pub fn is_department(&self) -> bool {
        matches!(self, Role::Department)
    }

    pub fn is_field(&self) -> bool {
        matches!(self, Role::Field)
    }

    /// Create, update, and delete accounts
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    pub fn can_manage_projects(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Department)
    }

    pub fn can_manage_tasks(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Department)
    }

    /// Workload and analytics dashboards
    pub fn can_view_analytics(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager | Role::Department)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::normalize(s)
    }
}
