//! Greedy task rebalancing
//!
//! Planning is pure: given every user's current load and the movable
//! tasks of overloaded users, produce the list of reassignments. The
//! service applies the plan one task at a time; there is no transaction
//! around the pass, so a failure partway leaves prior reassignments
//! committed.

use serde::{Deserialize, Serialize};
use ts_core::traits::Id;

/// Fixed weekly baseline the heuristic measures against, independent of
/// each user's own capacity field.
pub const REBALANCE_BASELINE_HOURS: f64 = 40.0;

/// Percentage above which a user counts as overloaded
pub const OVERLOADED_THRESHOLD: f64 = 90.0;

/// Percentage below which a user counts as available
pub const AVAILABLE_THRESHOLD: f64 = 70.0;

/// A reassignment must keep the target's projected load below this
pub const TARGET_CAP: f64 = 80.0;

/// At most this many tasks move away from one overloaded user per pass
pub const MAX_TASKS_PER_USER: usize = 3;

/// A user's current assigned-hours total
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserLoad {
    pub user_id: Id,
    pub current_hours: f64,
}

/// A movable task: pending, not urgent, owned by an overloaded user
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTask {
    pub task_id: Id,
    pub owner_id: Id,
    pub estimated_hours: f64,
}

/// One planned move
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reassignment {
    pub task_id: Id,
    pub from_user: Id,
    pub to_user: Id,
    pub hours: f64,
}

/// The full plan for one pass
#[derive(Debug, Clone, Default)]
pub struct RebalancePlan {
    pub reassignments: Vec<Reassignment>,
    pub overloaded_users: usize,
    pub available_users: usize,
}

impl RebalancePlan {
    pub fn is_noop(&self) -> bool {
        self.reassignments.is_empty()
    }
}

/// Result of an executed pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceOutcome {
    pub rebalanced: bool,
    pub tasks_rebalanced: usize,
    pub overloaded_users: usize,
    pub available_users: usize,
}

/// Workload percentage against the fixed baseline, capped at 200
pub fn workload_percentage(current_hours: f64) -> f64 {
    (current_hours / REBALANCE_BASELINE_HOURS * 100.0).min(200.0)
}

/// Plan a rebalancing pass
///
/// `candidates` holds the movable tasks per overloaded user; callers
/// fetch them pre-filtered (pending, non-urgent). The planner takes the
/// largest tasks first, capped at [`MAX_TASKS_PER_USER`] per owner, and
/// greedily targets whichever available user currently carries the
/// least, recomputing after every move. Greedy, not globally optimal:
/// a pass is not guaranteed to drain any overloaded user.
pub fn plan_rebalance(loads: &[UserLoad], candidates: &[CandidateTask]) -> RebalancePlan {
    let mut overloaded: Vec<(Id, f64)> = loads
        .iter()
        .filter(|l| workload_percentage(l.current_hours) > OVERLOADED_THRESHOLD)
        .map(|l| (l.user_id, workload_percentage(l.current_hours)))
        .collect();
    let mut available: Vec<(Id, f64)> = loads
        .iter()
        .filter(|l| workload_percentage(l.current_hours) < AVAILABLE_THRESHOLD)
        .map(|l| (l.user_id, workload_percentage(l.current_hours)))
        .collect();

    let mut plan = RebalancePlan {
        reassignments: Vec::new(),
        overloaded_users: overloaded.len(),
        available_users: available.len(),
    };

    if overloaded.is_empty() || available.is_empty() {
        return plan;
    }

    // Heaviest users first, so the pass helps where it matters most
    overloaded.sort_by(|a, b| b.1.total_cmp(&a.1));

    for (owner_id, _) in &overloaded {
        let mut movable: Vec<&CandidateTask> = candidates
            .iter()
            .filter(|c| c.owner_id == *owner_id)
            .collect();
        movable.sort_by(|a, b| b.estimated_hours.total_cmp(&a.estimated_hours));

        for candidate in movable.into_iter().take(MAX_TASKS_PER_USER) {
            let Some(target) = available
                .iter_mut()
                .min_by(|a, b| a.1.total_cmp(&b.1))
            else {
                break;
            };

            let delta = candidate.estimated_hours / REBALANCE_BASELINE_HOURS * 100.0;
            if target.1 + delta >= TARGET_CAP {
                // Would push the lightest available user past the cap; no
                // other target can take it either, so skip this task.
                continue;
            }

            target.1 += delta;
            plan.reassignments.push(Reassignment {
                task_id: candidate.task_id,
                from_user: *owner_id,
                to_user: target.0,
                hours: candidate.estimated_hours,
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(user_id: Id, hours: f64) -> UserLoad {
        UserLoad {
            user_id,
            current_hours: hours,
        }
    }

    fn candidate(task_id: Id, owner_id: Id, hours: f64) -> CandidateTask {
        CandidateTask {
            task_id,
            owner_id,
            estimated_hours: hours,
        }
    }

    #[test]
    fn test_workload_percentage_capped() {
        assert_eq!(workload_percentage(20.0), 50.0);
        assert_eq!(workload_percentage(40.0), 100.0);
        assert_eq!(workload_percentage(120.0), 200.0);
    }

    #[test]
    fn test_noop_without_overloaded() {
        let plan = plan_rebalance(&[load(1, 10.0), load(2, 20.0)], &[]);
        assert!(plan.is_noop());
        assert_eq!(plan.overloaded_users, 0);
        assert_eq!(plan.available_users, 2);
    }

    #[test]
    fn test_noop_without_available() {
        let loads = [load(1, 45.0), load(2, 40.0)];
        let plan = plan_rebalance(&loads, &[candidate(1, 1, 5.0)]);
        assert!(plan.is_noop());
        assert_eq!(plan.overloaded_users, 1);
        assert_eq!(plan.available_users, 0);
    }

    #[test]
    fn test_basic_rebalance_largest_first() {
        // Overloaded: 45h (112.5%); available: 5h (12.5%)
        let loads = [load(1, 45.0), load(2, 5.0)];
        let candidates = [
            candidate(10, 1, 5.0),
            candidate(11, 1, 10.0),
            candidate(12, 1, 8.0),
        ];
        let plan = plan_rebalance(&loads, &candidates);

        assert_eq!(plan.reassignments.len(), 3);
        // Largest task moves first
        assert_eq!(plan.reassignments[0].task_id, 11);
        assert_eq!(plan.reassignments[0].to_user, 2);
        // Projected target load after all three: 12.5 + 25 + 20 + 12.5 = 70 < 80
        assert_eq!(plan.reassignments[1].task_id, 12);
        assert_eq!(plan.reassignments[2].task_id, 10);
    }

    #[test]
    fn test_target_cap_respected() {
        // Available user at 25h (62.5%); a 10h task projects to 87.5 -> skip
        let loads = [load(1, 45.0), load(2, 25.0)];
        let candidates = [candidate(10, 1, 10.0), candidate(11, 1, 4.0)];
        let plan = plan_rebalance(&loads, &candidates);

        // 10h task skipped, 4h task fits (62.5 + 10 = 72.5 < 80)
        assert_eq!(plan.reassignments.len(), 1);
        assert_eq!(plan.reassignments[0].task_id, 11);
    }

    #[test]
    fn test_cap_is_exclusive_at_80() {
        // 62.5% + 7h (17.5%) = exactly 80 -> must be skipped
        let loads = [load(1, 45.0), load(2, 25.0)];
        let plan = plan_rebalance(&loads, &[candidate(10, 1, 7.0)]);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_at_most_three_tasks_per_user() {
        let loads = [load(1, 60.0), load(2, 0.0)];
        let candidates: Vec<_> = (0..5).map(|i| candidate(10 + i, 1, 1.0)).collect();
        let plan = plan_rebalance(&loads, &candidates);
        assert_eq!(plan.reassignments.len(), 3);
    }

    #[test]
    fn test_greedy_targets_lightest_and_updates_inline() {
        // Two available users; the in-pass counter must shift targets
        let loads = [load(1, 60.0), load(2, 0.0), load(3, 8.0)];
        let candidates = [
            candidate(10, 1, 12.0), // -> user 2 (0% -> 30%)
            candidate(11, 1, 10.0), // -> user 3 (20% -> 45%)
            candidate(12, 1, 8.0),  // -> user 2 (30% -> 50%)
        ];
        let plan = plan_rebalance(&loads, &candidates);

        assert_eq!(plan.reassignments[0].to_user, 2);
        assert_eq!(plan.reassignments[1].to_user, 3);
        assert_eq!(plan.reassignments[2].to_user, 2);
    }

    #[test]
    fn test_spec_example_scenario() {
        // One overloaded (45h, tasks [10, 8, 5]) and one available (5h):
        // the 10h task projects 12.5 + 25 = 37.5 < 80 and moves first.
        let loads = [load(1, 45.0), load(2, 5.0)];
        let candidates = [
            candidate(10, 1, 10.0),
            candidate(11, 1, 8.0),
            candidate(12, 1, 5.0),
        ];
        let plan = plan_rebalance(&loads, &candidates);
        assert!(plan.reassignments.len() >= 1);
        assert_eq!(plan.reassignments[0].task_id, 10);
        assert_eq!(plan.reassignments[0].hours, 10.0);
    }
}
