// src/simulation/coding.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Int, State, NUM_ECHELONS};

/// Number of ordinal inventory bands.
pub const NUM_BANDS: u8 = 9;

/// Lower bounds of bands 2..=9; anything below the first bound is band 1.
const BAND_LOWER_BOUNDS: [Int; 8] = [-6, -3, 0, 3, 6, 10, 15, 20];

/// Banded inventory of every echelon, each in `1..=9`. Many raw states share
/// one coded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CodedState(pub [u8; NUM_ECHELONS]);

impl fmt::Display for CodedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({a},{b},{c},{d})")
    }
}

/// Band of a single inventory position: 1 is deep backlog, 9 is a large surplus.
pub fn code_inventory(inventory: Int) -> u8 {
    1 + BAND_LOWER_BOUNDS
        .iter()
        .take_while(|&&bound| inventory >= bound)
        .count() as u8
}

pub fn code_state(state: &State) -> CodedState {
    CodedState(state.map(code_inventory))
}
