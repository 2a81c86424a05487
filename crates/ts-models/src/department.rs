//! Department model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// Department entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Department head
    pub head_id: Option<Id>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            head_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for Department {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Department {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Department {
    const TABLE_NAME: &'static str = "departments";
    const TYPE_NAME: &'static str = "Department";
}
