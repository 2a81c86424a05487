//! Task feedback model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// Feedback left on a task
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Option<Id>,

    pub task_id: Id,

    pub author_id: Id,

    /// 1-5 rating
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,

    pub comment: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Identifiable for Feedback {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Feedback {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

impl Entity for Feedback {
    const TABLE_NAME: &'static str = "feedback";
    const TYPE_NAME: &'static str = "Feedback";
}
