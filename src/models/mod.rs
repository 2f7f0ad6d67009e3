// Core data models for stageboard
// These structs represent the domain entities persisted in stage records

pub mod task;
pub mod stage;

pub use task::*;
pub use stage::*;
