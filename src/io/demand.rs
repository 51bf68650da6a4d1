// src/io/demand.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::{BeerGameError, Int, Result};

/// Where the demand and lead-time schedules of a run come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scenario {
    /// Keep the schedules of the environment config (the paper's test problem
    /// unless overridden).
    Paper,
    Constant { demand: Int, lead_time: u32 },
    /// Classic Beer Game step from 4 to 8 after the fourth period.
    Step { lead_time: u32 },
    /// Normal demand with uniform lead times, drawn from a seeded generator.
    Normal {
        mean: f64,
        std_dev: f64,
        max_lead_time: u32,
        seed: u64,
    },
}

impl Scenario {
    /// `(customer_demand, lead_times)` covering `periods`, or `None` for
    /// [`Scenario::Paper`].
    pub fn schedules(&self, periods: usize) -> Result<Option<(Vec<Int>, Vec<u32>)>> {
        let schedules = match *self {
            Scenario::Paper => return Ok(None),
            Scenario::Constant { demand, lead_time } => {
                (generate_constant_demand(periods, demand), vec![lead_time; periods])
            }
            Scenario::Step { lead_time } => {
                (generate_classic_beer_game_demand(periods), vec![lead_time; periods])
            }
            Scenario::Normal {
                mean,
                std_dev,
                max_lead_time,
                seed,
            } => {
                let mut rng = StdRng::seed_from_u64(seed);
                let demand = generate_normal_demand(&mut rng, periods, mean, std_dev)?;
                let lead_times = generate_uniform_lead_times(&mut rng, periods, max_lead_time);
                (demand, lead_times)
            }
        };
        Ok(Some(schedules))
    }
}

/// Generates a demand schedule where every week has the exact same order amount.
/// Useful for testing stability (e.g., step-response tests).
pub fn generate_constant_demand(periods: usize, value: Int) -> Vec<Int> {
    vec![value; periods]
}

/// Generates a demand schedule based on a Normal (Bell Curve) distribution.
///
/// Samples are rounded to the nearest integer and negative draws are clamped
/// to 0 (demand cannot be negative).
pub fn generate_normal_demand<R: Rng + ?Sized>(
    rng: &mut R,
    periods: usize,
    mean: f64,
    std_dev: f64,
) -> Result<Vec<Int>> {
    if !(std_dev >= 0.0 && std_dev.is_finite()) {
        return Err(BeerGameError::config(format!(
            "normal demand std_dev must be finite and non-negative, got {std_dev}"
        )));
    }
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| BeerGameError::config(format!("normal demand ({mean}, {std_dev}): {e}")))?;

    Ok((0..periods)
        .map(|_| normal.sample(&mut *rng).round().max(0.0) as Int)
        .collect())
}

/// Lead times drawn uniformly from `0..=max_lead_time`.
pub fn generate_uniform_lead_times<R: Rng + ?Sized>(
    rng: &mut R,
    periods: usize,
    max_lead_time: u32,
) -> Vec<u32> {
    (0..periods).map(|_| rng.gen_range(0..=max_lead_time)).collect()
}

/// Generates a "Step" pattern (4 weeks of 4, then 8 for the rest).
/// This is the classic scenario used in the MIT Beer Game to trigger the Bullwhip effect.
pub fn generate_classic_beer_game_demand(periods: usize) -> Vec<Int> {
    (0..periods).map(|w| if w < 4 { 4 } else { 8 }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_step() {
        assert_eq!(generate_classic_beer_game_demand(6), vec![4, 4, 4, 4, 8, 8]);
    }

    #[test]
    fn test_normal_demand_is_seeded_and_non_negative() {
        let a = generate_normal_demand(&mut StdRng::seed_from_u64(1), 200, 2.0, 5.0).unwrap();
        let b = generate_normal_demand(&mut StdRng::seed_from_u64(1), 200, 2.0, 5.0).unwrap();
        assert_eq!(a, b);
        assert!(a.iter().all(|&d| d >= 0));
        assert!(a.contains(&0), "clamping should hit zero with this mean");
    }

    #[test]
    fn test_invalid_std_dev_is_a_config_error() {
        let result = generate_normal_demand(&mut StdRng::seed_from_u64(1), 5, 10.0, -1.0);
        assert!(matches!(result, Err(BeerGameError::Config(_))));

        let result = generate_normal_demand(&mut StdRng::seed_from_u64(1), 5, 10.0, f64::NAN);
        assert!(matches!(result, Err(BeerGameError::Config(_))));

        let scenario = Scenario::Normal {
            mean: 10.0,
            std_dev: -3.0,
            max_lead_time: 2,
            seed: 1,
        };
        assert!(matches!(scenario.schedules(5), Err(BeerGameError::Config(_))));
    }

    #[test]
    fn test_lead_times_in_range() {
        let lead_times = generate_uniform_lead_times(&mut StdRng::seed_from_u64(9), 300, 4);
        assert!(lead_times.iter().all(|&l| l <= 4));
        assert!(lead_times.contains(&0) && lead_times.contains(&4));
    }

    #[test]
    fn test_scenario_schedules() {
        assert_eq!(Scenario::Paper.schedules(35).unwrap(), None);

        let (demand, lead_times) = Scenario::Step { lead_time: 2 }.schedules(10).unwrap().unwrap();
        assert_eq!(demand.len(), 10);
        assert_eq!(lead_times, vec![2; 10]);

        let normal = Scenario::Normal {
            mean: 10.0,
            std_dev: 3.0,
            max_lead_time: 4,
            seed: 5,
        };
        assert_eq!(normal.schedules(35).unwrap(), normal.schedules(35).unwrap());
    }

    #[test]
    fn test_scenario_toml_tag() {
        let scenario: Scenario = toml::from_str(
            r#"
kind = "normal"
mean = 10.0
std_dev = 2.5
max_lead_time = 3
seed = 99
"#,
        )
        .unwrap();
        assert_eq!(
            scenario,
            Scenario::Normal {
                mean: 10.0,
                std_dev: 2.5,
                max_lead_time: 3,
                seed: 99
            }
        );
    }
}
