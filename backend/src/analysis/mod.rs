//! Result computation for finished simulations
//!
//! - **analyzer**: per-source and per-processor statistics tables
//! - **sample_size**: iterative search for a budget giving a stable
//!   rejection probability estimate

pub mod analyzer;
pub mod sample_size;

pub use analyzer::{analyze, AnalysisReport, ProcessorStats, SourceStats};
pub use sample_size::{SampleSizeSearch, SearchOutcome, Termination};
