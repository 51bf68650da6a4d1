// src/simulation/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::io::demand::Scenario;
use crate::strategy::q_learning::{LearnerConfig, TrainingSchedule};
use crate::{BeerGameError, Int, Result};

/// Demand of the paper's main test problem.
pub const DEFAULT_CUSTOMER_DEMAND: [Int; 35] = [
    15, 10, 8, 14, 9, 3, 13, 2, 13, 11, 3, 4, 6, 11, 15, 12, 15, 4, 12, 3, 13, 10, 15, 15, 3, 11,
    1, 13, 10, 10, 0, 0, 8, 0, 14,
];

/// Lead times of the paper's main test problem.
pub const DEFAULT_LEAD_TIMES: [u32; 35] = [
    2, 0, 2, 4, 4, 4, 0, 2, 4, 1, 1, 0, 0, 1, 1, 0, 1, 1, 2, 1, 1, 1, 4, 2, 2, 1, 4, 3, 4, 1, 4, 0,
    3, 3, 4,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub time_horizon: usize,
    /// Exogenous demand at the retailer, indexed by period.
    pub customer_demand: Vec<Int>,
    /// Shipping delay applied to everything dispatched in a period.
    pub lead_times: Vec<u32>,
    pub initial_inventory: Int,
    /// `(quantity, periods_remaining)` seeded into every echelon's pipeline on reset.
    pub initial_shipments: Vec<(Int, u32)>,
    pub holding_cost: f64,
    pub backlog_cost: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_horizon: 35,
            customer_demand: DEFAULT_CUSTOMER_DEMAND.to_vec(),
            lead_times: DEFAULT_LEAD_TIMES.to_vec(),
            initial_inventory: 12,
            initial_shipments: vec![(4, 1), (4, 2)],
            holding_cost: 1.0,
            backlog_cost: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Config with the default chain parameters and the given schedules.
    pub fn with_schedules(
        customer_demand: Vec<Int>,
        lead_times: Vec<u32>,
        time_horizon: usize,
    ) -> Self {
        Self {
            time_horizon,
            customer_demand,
            lead_times,
            ..Self::default()
        }
    }

    /// Rejects configs the engine cannot run to the horizon without
    /// indexing past a schedule.
    pub fn validate(&self) -> Result<()> {
        if self.time_horizon == 0 {
            return Err(BeerGameError::config("time_horizon must be positive"));
        }
        if self.customer_demand.len() < self.time_horizon {
            return Err(BeerGameError::config(format!(
                "customer_demand has {} periods, time_horizon is {}",
                self.customer_demand.len(),
                self.time_horizon
            )));
        }
        if self.lead_times.len() < self.time_horizon {
            return Err(BeerGameError::config(format!(
                "lead_times has {} periods, time_horizon is {}",
                self.lead_times.len(),
                self.time_horizon
            )));
        }
        if self.customer_demand.iter().any(|&d| d < 0) {
            return Err(BeerGameError::config("customer_demand must be non-negative"));
        }
        if self.initial_shipments.iter().any(|&(qty, _)| qty < 0) {
            return Err(BeerGameError::config("initial shipment quantities must be non-negative"));
        }
        if self.holding_cost < 0.0 || self.backlog_cost < 0.0 {
            return Err(BeerGameError::config("cost parameters must be non-negative"));
        }
        Ok(())
    }
}

/// Top-level settings of a strategy comparison run, read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub scenario: Scenario,
    pub environment: SimulationConfig,
    pub learner: LearnerConfig,
    pub training: TrainingSchedule,
    pub output_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::Paper,
            environment: SimulationConfig::default(),
            learner: LearnerConfig::default(),
            training: TrainingSchedule::default(),
            output_dir: PathBuf::from("results"),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The environment config with the scenario's schedules applied.
    pub fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = self.environment.clone();
        if let Some((demand, lead_times)) = self.scenario.schedules(config.time_horizon)? {
            config.customer_demand = demand;
            config.lead_times = lead_times;
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.customer_demand.len(), config.time_horizon);
        assert_eq!(config.lead_times.len(), config.time_horizon);
    }

    #[test]
    fn test_short_schedule_is_rejected() {
        let config = SimulationConfig::with_schedules(vec![4; 10], vec![2; 35], 35);
        assert!(matches!(config.validate(), Err(BeerGameError::Config(_))));

        let config = SimulationConfig::with_schedules(vec![4; 35], vec![2; 34], 35);
        assert!(matches!(config.validate(), Err(BeerGameError::Config(_))));
    }

    #[test]
    fn test_longer_schedule_is_accepted() {
        let config = SimulationConfig::with_schedules(vec![4; 50], vec![1; 50], 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_horizon_and_negative_costs_are_rejected() {
        let config = SimulationConfig {
            time_horizon: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        let config = SimulationConfig {
            backlog_cost: -1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExperimentConfig::from_toml_str(
            r#"
output_dir = "out"

[training]
episodes = 20

[learner]
seed = 7
"#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.training.episodes, 20);
        assert_eq!(config.training.max_steps, 35);
        assert_eq!(config.learner.seed, Some(7));
        assert_eq!(config.learner.action_range, 4);
        assert_eq!(config.scenario, Scenario::Paper);
        assert_eq!(config.environment, SimulationConfig::default());
    }

    #[test]
    fn test_scenario_overrides_schedules() {
        let config = ExperimentConfig::from_toml_str(
            r#"
[scenario]
kind = "constant"
demand = 6
lead_time = 1

[environment]
time_horizon = 12
"#,
        )
        .unwrap();

        let sim = config.simulation_config().unwrap();
        assert_eq!(sim.time_horizon, 12);
        assert_eq!(sim.customer_demand, vec![6; 12]);
        assert_eq!(sim.lead_times, vec![1; 12]);
    }

    #[test]
    fn test_invalid_toml_is_a_toml_error() {
        let err = ExperimentConfig::from_toml_str("training = 3").unwrap_err();
        assert!(matches!(err, BeerGameError::Toml(_)));
    }

    #[test]
    fn test_read_sample_config() {
        let config = ExperimentConfig::load("./beer_game.toml").expect("sample config parses");
        assert!(config.simulation_config().is_ok());
    }
}
