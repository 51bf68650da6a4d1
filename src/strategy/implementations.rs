// src/strategy/implementations.rs

use crate::strategy::q_learning::PolicySnapshot;
use crate::strategy::traits::{DecisionContext, OrderPolicy};
use crate::{State, NUM_ECHELONS};

// =========================================================================
// 1. One-for-One Policy
// =========================================================================

/// Every echelon adds what it was last ordered on top of the incoming order.
/// Ignores inventory entirely.
#[derive(Debug, Clone, Default)]
pub struct OneForOnePolicy;

impl OneForOnePolicy {
    pub fn new() -> Self {
        Self
    }
}

impl OrderPolicy for OneForOnePolicy {
    fn name(&self) -> &str {
        "1-for-1"
    }

    fn select_action(&mut self, context: &DecisionContext) -> State {
        context.orders_received
    }
}

// =========================================================================
// 2. Fixed Adjustment Policy
// =========================================================================

/// A constant adjustment per echelon, whatever the state.
#[derive(Debug, Clone)]
pub struct FixedAdjustmentPolicy {
    name: String,
    adjustments: State,
}

impl FixedAdjustmentPolicy {
    pub fn new(name: impl Into<String>, adjustments: State) -> Self {
        Self {
            name: name.into(),
            adjustments,
        }
    }

    /// Adjustments of the approximate genetic-algorithm solution of the
    /// paper's test problem.
    pub fn ga_based() -> Self {
        Self::new("GA-Based", [1, 2, 1, 0])
    }

    /// Orders always pass the incoming quantity straight through.
    pub fn no_adjustment() -> Self {
        Self::new("No-Adjustment", [0; NUM_ECHELONS])
    }
}

impl OrderPolicy for FixedAdjustmentPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_action(&mut self, _context: &DecisionContext) -> State {
        self.adjustments
    }
}

// =========================================================================
// 3. Greedy Table Policy
// =========================================================================

/// Replays a learned policy snapshot. Coded states missing from the snapshot
/// get no adjustment.
#[derive(Debug, Clone)]
pub struct GreedyTablePolicy {
    name: String,
    policy: PolicySnapshot,
}

impl GreedyTablePolicy {
    pub fn new(name: impl Into<String>, policy: PolicySnapshot) -> Self {
        Self {
            name: name.into(),
            policy,
        }
    }

    pub fn policy(&self) -> &PolicySnapshot {
        &self.policy
    }
}

impl OrderPolicy for GreedyTablePolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_action(&mut self, context: &DecisionContext) -> State {
        self.policy.action_for(&context.coded_state).adjustments()
    }
}
