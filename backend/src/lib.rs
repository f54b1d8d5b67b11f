//! Queue Simulator Core - Rust Engine
//!
//! Discrete-event simulator of a single-stage queueing network: Poisson
//! sources feed a bounded priority buffer that is drained by a pool of
//! fixed-duration processors.
//!
//! # Architecture
//!
//! - **models**: Domain types (Request, Source, Processor, Buffer, events)
//! - **managers**: Production (arrivals, admission) and selection (dispatch, completion)
//! - **simulator**: Event-stepping state machine
//! - **analysis**: Result tables and the sample-size search
//! - **config**: Parameter lists to component instances
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG per source)
//! 2. Buffer occupancy never exceeds its capacity
//! 3. Every generated request ends up either rejected or served
//!
//! # Example
//!
//! ```rust
//! use queue_simulator_core_rs::{analyze, SimulationConfig};
//!
//! let config = SimulationConfig::from_json(
//!     r#"{"sources":[1.0,0.5],"processors":[0.8],"bufferCapacity":2,"requestsCount":100,"seed":7}"#,
//! ).unwrap();
//!
//! let mut simulator = config.build_simulator().unwrap();
//! simulator.run_to_completion();
//!
//! let report = analyze(&simulator).unwrap();
//! assert_eq!(report.sources.len(), 2);
//! assert_eq!(simulator.progress(), 100);
//! ```

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod managers;
pub mod models;
pub mod rng;
pub mod simulator;

// Re-exports for convenience
pub use analysis::{
    analyze, AnalysisReport, ProcessorStats, SampleSizeSearch, SearchOutcome, SourceStats,
    Termination,
};
pub use config::SimulationConfig;
pub use error::SimulationError;
pub use managers::{Completion, ProductionManager, SelectionManager};
pub use models::{
    Buffer, BufferSnapshot, EventLog, EventType, Processor, ProcessorSnapshot, Request, RequestId,
    SimulatorEvent, Source,
};
pub use rng::RngManager;
pub use simulator::{Phase, RunOutcome, Simulator};
