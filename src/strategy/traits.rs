// src/strategy/traits.rs

use std::fmt::Debug;

use crate::simulation::coding::CodedState;
use crate::simulation::engine::SupplyChainEnv;
use crate::State;

/// What a policy gets to see before choosing the period's adjustments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionContext {
    /// Period about to be simulated.
    pub time: usize,
    pub inventory: State,
    pub coded_state: CodedState,
    /// Orders received last period; index 0 is the last customer demand.
    pub orders_received: State,
}

impl DecisionContext {
    pub fn observe(env: &SupplyChainEnv) -> Self {
        Self {
            time: env.current_time(),
            inventory: env.state(),
            coded_state: env.coded_state(),
            orders_received: *env.orders_received(),
        }
    }
}

/// One observed step, as handed to learning policies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: State,
    pub adjustments: State,
    pub reward: f64,
    pub next_state: State,
    pub done: bool,
}

/// Decision-making logic driving all four echelons.
///
/// Fixed-rule policies leave `observe_transition` as a no-op.
pub trait OrderPolicy: Debug {
    /// Label used in logs and report file names.
    fn name(&self) -> &str;

    /// Called after every environment reset.
    fn reset_for_episode(&mut self) {}

    /// Per-echelon order adjustments for the coming period.
    fn select_action(&mut self, context: &DecisionContext) -> State;

    /// Feed back the outcome of the last `select_action`.
    fn observe_transition(&mut self, _transition: &Transition) {}
}
