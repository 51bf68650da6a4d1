// src/simulation/evaluation.rs

use log::info;
use serde::Serialize;

use crate::simulation::engine::SupplyChainEnv;
use crate::strategy::traits::{DecisionContext, OrderPolicy, Transition};
use crate::{Int, NUM_ECHELONS};

/// Time series of one evaluation run, recorded after every step. All series
/// have one entry per simulated period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationLog {
    pub inventory_history: [Vec<Int>; NUM_ECHELONS],
    pub order_history: [Vec<Int>; NUM_ECHELONS],
    pub period_costs: Vec<f64>,
}

impl EvaluationLog {
    pub fn len(&self) -> usize {
        self.period_costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.period_costs.is_empty()
    }

    fn record(&mut self, env: &SupplyChainEnv, period_cost: f64) {
        for i in 0..NUM_ECHELONS {
            self.inventory_history[i].push(env.inventory_position()[i]);
            self.order_history[i].push(env.orders_received()[i]);
        }
        self.period_costs.push(period_cost);
    }

    /// Running total of the period costs.
    pub fn cumulative_costs(&self) -> Vec<f64> {
        self.period_costs
            .iter()
            .scan(0.0, |total, cost| {
                *total += cost;
                Some(*total)
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub strategy: String,
    /// Positive total cost over the run.
    pub total_cost: f64,
    pub log: EvaluationLog,
}

/// Reset `env` and replay `policy` until the horizon.
///
/// Transitions are not fed back, so a learning policy is left unchanged.
pub fn evaluate_strategy(
    env: &mut SupplyChainEnv,
    policy: &mut dyn OrderPolicy,
) -> EvaluationResult {
    env.reset();
    policy.reset_for_episode();

    let mut log = EvaluationLog::default();
    let mut total_reward = 0.0;
    let mut done = env.is_done();
    while !done {
        let context = DecisionContext::observe(env);
        let adjustments = policy.select_action(&context);
        let outcome = env.step(&adjustments);
        log.record(env, outcome.info.period_cost.unwrap_or(0.0));
        total_reward += outcome.reward;
        done = outcome.done;
    }

    let total_cost = -total_reward;
    info!("[{}] evaluated over {} periods, total cost {}", policy.name(), log.len(), total_cost);
    EvaluationResult {
        strategy: policy.name().to_string(),
        total_cost,
        log,
    }
}

/// Run one episode and hand every transition to the policy.
///
/// Returns the episode's total reward.
pub fn run_learning_episode(env: &mut SupplyChainEnv, policy: &mut dyn OrderPolicy) -> f64 {
    let mut state = env.reset();
    policy.reset_for_episode();

    let mut total_reward = 0.0;
    let mut done = env.is_done();
    while !done {
        let context = DecisionContext::observe(env);
        let adjustments = policy.select_action(&context);
        let outcome = env.step(&adjustments);
        policy.observe_transition(&Transition {
            state,
            adjustments,
            reward: outcome.reward,
            next_state: outcome.state,
            done: outcome.done,
        });
        state = outcome.state;
        total_reward += outcome.reward;
        done = outcome.done;
    }
    total_reward
}
