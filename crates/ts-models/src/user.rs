//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

use crate::role::Role;

/// Weekly capacity default, in hours
pub const DEFAULT_CAPACITY_HOURS: f64 = 8.0;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    pub role: Role,

    /// Weekly capacity in hours
    #[serde(default = "default_capacity")]
    pub capacity: f64,

    pub department_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_capacity() -> f64 {
    DEFAULT_CAPACITY_HOURS
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            role,
            capacity: DEFAULT_CAPACITY_HOURS,
            department_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn in_department(mut self, department_id: Id) -> Self {
        self.department_id = Some(department_id);
        self
    }
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder() {
        let user = User::new("Aycha", "aycha@example.com", Role::Field)
            .with_capacity(40.0)
            .in_department(3);
        assert_eq!(user.capacity, 40.0);
        assert_eq!(user.department_id, Some(3));
        assert!(user.is_new_record());
    }

    #[test]
    fn test_default_capacity() {
        let user = User::new("Sam", "sam@example.com", Role::Field);
        assert_eq!(user.capacity, DEFAULT_CAPACITY_HOURS);
    }
}
