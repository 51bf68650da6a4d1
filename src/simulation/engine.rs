// src/simulation/engine.rs

use log::debug;
use serde::Serialize;

use crate::model::echelon::Echelon;
use crate::model::pipeline::{Pipeline, Shipment};
use crate::simulation::coding::{code_state, CodedState};
use crate::simulation::config::SimulationConfig;
use crate::simulation::phases::{self, Pipelines};
use crate::{Result, State, NUM_ECHELONS};

/// Extra data returned by a step. `period_cost` is `None` when the step was a
/// no-op on a terminal environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StepInfo {
    pub period_cost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub state: State,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

/// The four-echelon chain. Owned by whichever policy is driving it; build a
/// fresh one per strategy run.
#[derive(Debug, Clone)]
pub struct SupplyChainEnv {
    config: SimulationConfig,

    inventory_position: State,
    pipelines: Pipelines,
    orders_received: State,
    current_time: usize,

    period_costs: Vec<f64>,
    total_cost: f64,
}

impl Default for SupplyChainEnv {
    /// The paper's test problem. The default config always validates.
    fn default() -> Self {
        Self::from_validated(SimulationConfig::default())
    }
}

impl SupplyChainEnv {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: SimulationConfig) -> Self {
        let mut env = Self {
            inventory_position: [config.initial_inventory; NUM_ECHELONS],
            pipelines: Default::default(),
            orders_received: [0; NUM_ECHELONS],
            current_time: 0,
            period_costs: Vec::with_capacity(config.time_horizon),
            total_cost: 0.0,
            config,
        };
        env.reset();
        env
    }

    /// Restore the starting snapshot and return the inventory vector.
    /// The demand and lead-time schedules are left untouched.
    pub fn reset(&mut self) -> State {
        self.inventory_position = [self.config.initial_inventory; NUM_ECHELONS];
        let seeds: Vec<Shipment> = self
            .config
            .initial_shipments
            .iter()
            .map(|&(qty, delay)| Shipment::new(qty, delay))
            .collect();
        self.pipelines = std::array::from_fn(|_| Pipeline::from_shipments(seeds.clone()));
        self.orders_received = [0; NUM_ECHELONS];
        self.current_time = 0;
        self.period_costs.clear();
        self.total_cost = 0.0;
        self.state()
    }

    /// Advance one period with the given per-echelon order adjustments.
    ///
    /// A terminal environment is a fixed point: the call returns the current
    /// state, zero reward and `done` without changing anything.
    pub fn step(&mut self, adjustments: &State) -> StepOutcome {
        if self.is_done() {
            return StepOutcome {
                state: self.state(),
                reward: 0.0,
                done: true,
                info: StepInfo::default(),
            };
        }

        let t = self.current_time;
        let lead_time = self.config.lead_times[t];

        phases::receive_shipments(&mut self.inventory_position, &mut self.pipelines);

        self.orders_received[0] = self.config.customer_demand[t];
        phases::fulfill_orders(
            &mut self.inventory_position,
            &mut self.pipelines,
            &self.orders_received,
            lead_time,
        );

        phases::place_orders(
            &mut self.orders_received,
            &mut self.pipelines,
            adjustments,
            lead_time,
        );

        let cost = phases::period_cost(
            &self.inventory_position,
            self.config.holding_cost,
            self.config.backlog_cost,
        );
        self.period_costs.push(cost);
        self.total_cost += cost;
        self.current_time += 1;

        if self.current_time % 5 == 0 {
            debug!(
                "Period {}: inventory {:?}, orders {:?}, period cost {:.1}, total {:.1}",
                self.current_time,
                self.inventory_position,
                self.orders_received,
                cost,
                self.total_cost
            );
        }

        StepOutcome {
            state: self.state(),
            reward: -cost,
            done: self.is_done(),
            info: StepInfo {
                period_cost: Some(cost),
            },
        }
    }

    /// Copy of the inventory vector.
    pub fn state(&self) -> State {
        self.inventory_position
    }

    pub fn coded_state(&self) -> CodedState {
        code_state(&self.inventory_position)
    }

    pub fn code_state(&self, state: &State) -> CodedState {
        code_state(state)
    }

    pub fn is_done(&self) -> bool {
        self.current_time >= self.config.time_horizon
    }

    pub fn inventory_position(&self) -> &State {
        &self.inventory_position
    }

    pub fn orders_received(&self) -> &State {
        &self.orders_received
    }

    pub fn pipeline(&self, echelon: Echelon) -> &Pipeline {
        &self.pipelines[echelon.index()]
    }

    pub fn current_time(&self) -> usize {
        self.current_time
    }

    pub fn time_horizon(&self) -> usize {
        self.config.time_horizon
    }

    pub fn period_costs(&self) -> &[f64] {
        &self.period_costs
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
