//! Per-request authentication context

use serde::{Deserialize, Serialize};
use ts_core::traits::Id;
use ts_models::Role;

/// Identity assertion threaded through every handler and use case
///
/// Constructed once per request at the HTTP boundary from a validated
/// token; never read from global state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: Id,
    pub role: Role,
    pub department_id: Option<Id>,
}

impl AuthContext {
    pub fn new(user_id: Id, role: Role, department_id: Option<Id>) -> Self {
        Self {
            user_id,
            role,
            department_id,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    pub fn can_manage_users(&self) -> bool {
        self.role.can_manage_users()
    }

    pub fn can_manage_projects(&self) -> bool {
        self.role.can_manage_projects()
    }

    pub fn can_manage_tasks(&self) -> bool {
        self.role.can_manage_tasks()
    }

    pub fn can_view_analytics(&self) -> bool {
        self.role.can_view_analytics()
    }

    /// Whether this user may see another user's workload detail
    pub fn can_view_workload_of(&self, user_id: Id, department_id: Option<Id>) -> bool {
        if self.user_id == user_id {
            return true;
        }
        // Admins and managers see everyone
        if self.role.can_view_analytics() && !self.role.is_department() {
            return true;
        }
        // Department heads see their own department only
        if self.role.is_department() {
            return self.department_id.is_some() && self.department_id == department_id;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_delegation() {
        let ctx = AuthContext::new(1, Role::Manager, None);
        assert!(ctx.can_manage_users());
        assert!(ctx.can_view_analytics());

        let ctx = AuthContext::new(2, Role::Field, Some(1));
        assert!(!ctx.can_manage_users());
        assert!(!ctx.can_view_analytics());
    }

    #[test]
    fn test_view_workload_scoping() {
        let field = AuthContext::new(2, Role::Field, Some(1));
        assert!(field.can_view_workload_of(2, Some(1)));
        assert!(!field.can_view_workload_of(3, Some(1)));

        let head = AuthContext::new(5, Role::Department, Some(1));
        assert!(head.can_view_workload_of(3, Some(1)));
        assert!(!head.can_view_workload_of(3, Some(2)));

        let manager = AuthContext::new(9, Role::Manager, None);
        assert!(manager.can_view_workload_of(3, Some(2)));
    }
}
