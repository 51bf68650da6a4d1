// src/strategy/action.rs

use itertools::Itertools;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BeerGameError, Int, Result, State, NUM_ECHELONS};

/// One order adjustment per echelon, each in `0..action_range`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(pub [usize; NUM_ECHELONS]);

impl Action {
    /// Leave every order at the incoming quantity.
    pub const NO_ADJUSTMENT: Action = Action([0; NUM_ECHELONS]);

    /// The adjustments in the form the environment takes.
    pub fn adjustments(&self) -> State {
        self.0.map(|a| a as Int)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(","))
    }
}

/// The joint action space: `range^4` tuples laid out row-major, echelon 0
/// on the slowest axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpace {
    range: usize,
}

impl ActionSpace {
    pub fn new(range: usize) -> Result<Self> {
        if range == 0 {
            return Err(BeerGameError::config("action_range must be positive"));
        }
        Ok(Self { range })
    }

    pub fn range(&self) -> usize {
        self.range
    }

    /// Number of joint actions.
    pub fn size(&self) -> usize {
        self.range.pow(NUM_ECHELONS as u32)
    }

    pub fn contains(&self, action: &Action) -> bool {
        action.0.iter().all(|&a| a < self.range)
    }

    /// Flat row-major index of `action`.
    pub fn index_of(&self, action: &Action) -> Result<usize> {
        if !self.contains(action) {
            return Err(BeerGameError::invalid_action(format!(
                "{:?} outside 0..{}",
                action.0, self.range
            )));
        }
        Ok(action.0.iter().fold(0, |acc, &a| acc * self.range + a))
    }

    /// Inverse of [`ActionSpace::index_of`]; `index` must be below `size()`.
    pub fn action_at(&self, index: usize) -> Action {
        let mut rest = index;
        let mut action = [0; NUM_ECHELONS];
        for slot in action.iter_mut().rev() {
            *slot = rest % self.range;
            rest /= self.range;
        }
        Action(action)
    }

    /// Check raw adjustments coming from outside the learner.
    pub fn validate(&self, adjustments: &State) -> Result<Action> {
        if let Some(bad) = adjustments.iter().find(|&&a| a < 0 || a as usize >= self.range) {
            return Err(BeerGameError::invalid_action(format!(
                "adjustment {bad} in {adjustments:?} outside 0..{}",
                self.range
            )));
        }
        Ok(Action(adjustments.map(|a| a as usize)))
    }

    /// One independent uniform draw per echelon.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Action {
        let mut action = [0; NUM_ECHELONS];
        for slot in action.iter_mut() {
            *slot = rng.gen_range(0..self.range);
        }
        Action(action)
    }

    /// All joint actions in index order.
    pub fn iter(&self) -> impl Iterator<Item = Action> {
        std::iter::repeat(0..self.range)
            .take(NUM_ECHELONS)
            .multi_cartesian_product()
            .map(|v| Action([v[0], v[1], v[2], v[3]]))
    }
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self { range: 4 }
    }
}
