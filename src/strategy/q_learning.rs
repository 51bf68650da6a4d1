// src/strategy/q_learning.rs
//
// Tabular Q-learning over the coded state. The value table maps each coded
// state to a dense array with one entry per joint action.

use itertools::Itertools;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::simulation::coding::{code_state, CodedState};
use crate::simulation::engine::SupplyChainEnv;
use crate::simulation::evaluation::{evaluate_strategy, EvaluationLog};
use crate::strategy::action::{Action, ActionSpace};
use crate::strategy::implementations::GreedyTablePolicy;
use crate::strategy::traits::{DecisionContext, OrderPolicy, Transition};
use crate::{BeerGameError, Result, State};

/// Lowest exploration probability reached at the end of an episode.
pub const STEP_EXPLORATION_FLOOR: f64 = 0.02;

const PROGRESS_EVERY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub action_range: usize,
    /// Fixed seed for reproducible training; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.17,
            discount_factor: 1.0,
            action_range: 4,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSchedule {
    pub episodes: usize,
    pub max_steps: usize,
    pub initial_exploration: f64,
    pub final_exploration: f64,
}

impl Default for TrainingSchedule {
    fn default() -> Self {
        Self {
            episodes: 500,
            max_steps: 35,
            initial_exploration: 0.98,
            final_exploration: 0.1,
        }
    }
}

impl TrainingSchedule {
    /// Exploration at the start of `episode`, linear from initial to final.
    pub fn episode_exploration(&self, episode: usize) -> f64 {
        let span = self.initial_exploration - self.final_exploration;
        self.initial_exploration - episode as f64 * span / self.episodes as f64
    }

    /// Exploration at `step` of an episode that started at `episode_exploration`,
    /// linear toward [`STEP_EXPLORATION_FLOOR`].
    pub fn step_exploration(&self, episode_exploration: f64, step: usize) -> f64 {
        episode_exploration
            - step as f64 * (episode_exploration - STEP_EXPLORATION_FLOOR) / self.max_steps as f64
    }
}

/// Values of every joint action in one coded state, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionValues {
    values: Vec<f64>,
}

impl ActionValues {
    pub fn zeros(space: &ActionSpace) -> Self {
        Self {
            values: vec![0.0; space.size()],
        }
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the first maximum in scan order. Ties go to the lowest index,
    /// so an untouched row yields action `(0, 0, 0, 0)`.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate().skip(1) {
            if v > self.values[best] {
                best = i;
            }
        }
        best
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Lazily grown map from coded state to [`ActionValues`].
#[derive(Debug, Clone)]
pub struct QTable {
    space: ActionSpace,
    rows: HashMap<CodedState, ActionValues>,
}

impl QTable {
    pub fn new(space: ActionSpace) -> Self {
        Self {
            space,
            rows: HashMap::new(),
        }
    }

    pub fn space(&self) -> &ActionSpace {
        &self.space
    }

    /// Number of coded states seen so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, state: &CodedState) -> bool {
        self.rows.contains_key(state)
    }

    pub fn get(&self, state: &CodedState) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// The row for `state`, inserting an all-zero row on first access.
    pub fn get_or_insert(&mut self, state: CodedState) -> &mut ActionValues {
        let space = self.space;
        self.rows
            .entry(state)
            .or_insert_with(|| ActionValues::zeros(&space))
    }

    /// Value of `action` in `state`; zero for unseen states.
    pub fn value(&self, state: &CodedState, action: &Action) -> Result<f64> {
        let index = self.space.index_of(action)?;
        Ok(self.rows.get(state).map_or(0.0, |row| row.get(index)))
    }

    /// Greedy action of a seen state, without inserting.
    pub fn greedy_action(&self, state: &CodedState) -> Option<Action> {
        self.rows
            .get(state)
            .map(|row| self.space.action_at(row.argmax()))
    }

    pub fn states(&self) -> impl Iterator<Item = &CodedState> {
        self.rows.keys()
    }

    /// Every `(state, action, value)` of the seen states, ordered by state,
    /// then by action index.
    pub fn entries(&self) -> Vec<(CodedState, Action, f64)> {
        let space = self.space;
        self.rows
            .iter()
            .sorted_by_key(|(state, _)| **state)
            .flat_map(|(&state, row)| {
                space
                    .iter()
                    .zip(row.as_slice().iter().copied())
                    .map(move |(action, value)| (state, action, value))
            })
            .collect()
    }
}

/// Greedy action per coded state, taken from a [`QTable`] at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<PolicyEntry>", from = "Vec<PolicyEntry>")]
pub struct PolicySnapshot {
    actions: BTreeMap<CodedState, Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub state: CodedState,
    pub action: Action,
}

impl From<PolicySnapshot> for Vec<PolicyEntry> {
    fn from(snapshot: PolicySnapshot) -> Self {
        snapshot
            .actions
            .into_iter()
            .map(|(state, action)| PolicyEntry { state, action })
            .collect()
    }
}

impl From<Vec<PolicyEntry>> for PolicySnapshot {
    fn from(entries: Vec<PolicyEntry>) -> Self {
        Self {
            actions: entries.into_iter().map(|e| (e.state, e.action)).collect(),
        }
    }
}

impl PolicySnapshot {
    pub fn insert(&mut self, state: CodedState, action: Action) {
        self.actions.insert(state, action);
    }

    pub fn get(&self, state: &CodedState) -> Option<&Action> {
        self.actions.get(state)
    }

    /// Action for `state`, no adjustment when the state was never visited.
    pub fn action_for(&self, state: &CodedState) -> Action {
        self.actions.get(state).copied().unwrap_or(Action::NO_ADJUSTMENT)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CodedState, &Action)> {
        self.actions.iter()
    }
}

/// The reinforcement-learning ordering mechanism.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    learning_rate: f64,
    discount_factor: f64,
    table: QTable,
    rng: StdRng,
    episode_rewards: Vec<f64>,
}

impl QLearningAgent {
    pub const NAME: &'static str = "RLOM";

    pub fn new(config: &LearnerConfig) -> Result<Self> {
        if !(config.learning_rate > 0.0 && config.learning_rate <= 1.0) {
            return Err(BeerGameError::config(format!(
                "learning_rate must be in (0, 1], got {}",
                config.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&config.discount_factor) {
            return Err(BeerGameError::config(format!(
                "discount_factor must be in [0, 1], got {}",
                config.discount_factor
            )));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            learning_rate: config.learning_rate,
            discount_factor: config.discount_factor,
            table: QTable::new(ActionSpace::new(config.action_range)?),
            rng,
            episode_rewards: Vec::new(),
        })
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn space(&self) -> &ActionSpace {
        self.table.space()
    }

    /// Total reward of every episode trained so far, oldest first.
    pub fn episode_rewards(&self) -> &[f64] {
        &self.episode_rewards
    }

    /// Epsilon-greedy selection: with probability `exploration_prob` one
    /// uniform draw per echelon, otherwise the greedy action of the coded state.
    pub fn choose_action(&mut self, state: &State, exploration_prob: f64) -> Action {
        let coded = code_state(state);
        if self.rng.gen::<f64>() < exploration_prob {
            let space = *self.table.space();
            space.sample(&mut self.rng)
        } else {
            let index = self.table.get_or_insert(coded).argmax();
            self.table.space().action_at(index)
        }
    }

    /// One-step Q-learning update of `action` taken in `state`.
    pub fn update_q_table(
        &mut self,
        state: &State,
        action: &Action,
        reward: f64,
        next_state: &State,
    ) -> Result<()> {
        let index = self.table.space().index_of(action)?;
        let coded = code_state(state);
        let coded_next = code_state(next_state);

        let next_max = self.table.get_or_insert(coded_next).max();
        let row = self.table.get_or_insert(coded);
        let current = row.get(index);
        let target = reward + self.discount_factor * next_max;
        row.set(index, current + self.learning_rate * (target - current));
        Ok(())
    }

    /// Train against `env` and return the total reward of each episode.
    pub fn train(
        &mut self,
        env: &mut SupplyChainEnv,
        schedule: &TrainingSchedule,
    ) -> Result<Vec<f64>> {
        let mut rewards = Vec::with_capacity(schedule.episodes);
        for episode in 0..schedule.episodes {
            let mut state = env.reset();
            let exploration = schedule.episode_exploration(episode);
            let mut total_reward = 0.0;

            for step in 0..schedule.max_steps {
                let step_exploration = schedule.step_exploration(exploration, step);
                let action = self.choose_action(&state, step_exploration);
                let outcome = env.step(&action.adjustments());
                self.update_q_table(&state, &action, outcome.reward, &outcome.state)?;
                state = outcome.state;
                total_reward += outcome.reward;
                if outcome.done {
                    break;
                }
            }

            rewards.push(total_reward);
            if (episode + 1) % PROGRESS_EVERY == 0 {
                info!(
                    "Episode: {}/{}, Total Reward: {}, Total Cost: {}, States: {}",
                    episode + 1,
                    schedule.episodes,
                    total_reward,
                    -total_reward,
                    self.table.len()
                );
            }
        }
        self.episode_rewards.extend_from_slice(&rewards);
        Ok(rewards)
    }

    /// Greedy action of every coded state seen so far.
    pub fn get_optimal_policy(&self) -> PolicySnapshot {
        let mut policy = PolicySnapshot::default();
        for state in self.table.states() {
            if let Some(action) = self.table.greedy_action(state) {
                policy.insert(*state, action);
            }
        }
        policy
    }

    /// Replay `policy` (the current greedy policy when `None`) and return the
    /// total cost with the per-period costs.
    pub fn evaluate_policy(
        &self,
        env: &mut SupplyChainEnv,
        policy: Option<&PolicySnapshot>,
    ) -> (f64, Vec<f64>) {
        let policy = match policy {
            Some(p) => p.clone(),
            None => self.get_optimal_policy(),
        };
        let result = evaluate_strategy(env, &mut GreedyTablePolicy::new(Self::NAME, policy));
        (result.total_cost, result.log.period_costs)
    }

    /// Replay the current greedy policy and return the total cost with the full log.
    pub fn evaluate(&self, env: &mut SupplyChainEnv) -> (f64, EvaluationLog) {
        let mut replay = GreedyTablePolicy::new(Self::NAME, self.get_optimal_policy());
        let result = evaluate_strategy(env, &mut replay);
        (result.total_cost, result.log)
    }
}

impl OrderPolicy for QLearningAgent {
    fn name(&self) -> &str {
        Self::NAME
    }

    /// Greedy on the table; unseen states get no adjustment and are not inserted.
    fn select_action(&mut self, context: &DecisionContext) -> State {
        self.table
            .greedy_action(&context.coded_state)
            .unwrap_or(Action::NO_ADJUSTMENT)
            .adjustments()
    }

    fn observe_transition(&mut self, transition: &Transition) {
        let result = self
            .space()
            .validate(&transition.adjustments)
            .and_then(|action| {
                self.update_q_table(
                    &transition.state,
                    &action,
                    transition.reward,
                    &transition.next_state,
                )
            });
        if let Err(e) = result {
            warn!("Skipping transition: {e}");
        }
    }
}
