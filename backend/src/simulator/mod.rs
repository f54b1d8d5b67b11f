//! Event-stepping simulation engine

pub mod engine;

pub use engine::{Phase, RunOutcome, Simulator};
