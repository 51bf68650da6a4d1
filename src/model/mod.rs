pub mod echelon;
pub mod pipeline;
