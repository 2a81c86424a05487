//! Grouped counts and ratios

use serde::{Deserialize, Serialize};

/// One bucket of a group-by count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

impl GroupCount {
    pub fn new(key: impl Into<String>, count: i64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/// Plain entity totals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EntityTotals {
    pub users: i64,
    pub departments: i64,
    pub projects: i64,
    pub tasks: i64,
}

/// The analytics endpoint's payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub totals: EntityTotals,
    pub users_by_role: Vec<GroupCount>,
    pub tasks_by_status: Vec<GroupCount>,
    pub tasks_by_priority: Vec<GroupCount>,
    pub projects_by_status: Vec<GroupCount>,
    /// Completed tasks over all tasks, as a rounded percentage
    pub completion_rate: u32,
}

/// Completed over total, as a rounded percentage; 0 when total is 0
pub fn completion_rate(completed: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_rate() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(0, 10), 0);
        assert_eq!(completion_rate(10, 10), 100);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        // Half rounds up
        assert_eq!(completion_rate(1, 8), 13);
    }
}
