pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use crate::error::BeerGameError;

/// Signed unit quantity (inventory, orders, shipments).
pub type Int = i32;

/// Number of echelons in the chain.
pub const NUM_ECHELONS: usize = 4;

/// Raw inventory position of every echelon, retailer first.
pub type State = [Int; NUM_ECHELONS];

pub type Result<T> = std::result::Result<T, BeerGameError>;
