pub mod action;
pub mod implementations;
pub mod q_learning;
pub mod traits;
