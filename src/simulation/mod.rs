pub mod coding;
pub mod config;
pub mod engine;
pub mod evaluation;
pub mod phases;
