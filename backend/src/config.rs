//! Simulation configuration
//!
//! Translates raw parameter lists into fresh component instances. Every
//! `build_*` call produces an independent object graph, so repeated runs
//! (e.g. the sample-size search) never share mutable state.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "sources": [1.0, 0.5],
//!   "processors": [0.8, 1.2],
//!   "bufferCapacity": 3,
//!   "requestsCount": 1000,
//!   "seed": 42
//! }
//! ```
//!
//! `seed` is optional and defaults to [`DEFAULT_SEED`].

use crate::error::{ensure_positive, SimulationError};
use crate::models::{Buffer, Processor, Source};
use crate::rng::RngManager;
use crate::simulator::Simulator;
use serde::{Deserialize, Serialize};

/// Seed used when a configuration does not name one
pub const DEFAULT_SEED: u64 = 12345;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Parameters of one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Arrival rate of each source, in source-index order
    pub sources: Vec<f64>,

    /// Fixed service duration of each processor, in processor-index order
    pub processors: Vec<f64>,

    pub buffer_capacity: usize,

    /// Number of arrivals to generate
    pub requests_count: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl SimulationConfig {
    /// Parse and validate a JSON configuration
    ///
    /// # Errors
    /// `ConfigParse` for malformed JSON, `InvalidParameter`/`InvalidConfig`
    /// when validation fails.
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimulationError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter before any component is built
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.sources.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one source".to_string(),
            ));
        }
        if self.processors.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one processor".to_string(),
            ));
        }
        for &rate in &self.sources {
            ensure_positive("source rate", rate)?;
        }
        for &duration in &self.processors {
            ensure_positive("processor service duration", duration)?;
        }
        if self.buffer_capacity == 0 {
            return Err(SimulationError::invalid_parameter(
                "buffer capacity",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Fresh sources, each on its own stream derived from `seed`
    pub fn create_sources(&self, seed: u64) -> Result<Vec<Source>, SimulationError> {
        self.sources
            .iter()
            .enumerate()
            .map(|(index, &rate)| Source::new(index, rate, RngManager::for_stream(seed, index as u64)))
            .collect()
    }

    pub fn create_buffer(&self) -> Result<Buffer, SimulationError> {
        Buffer::new(self.buffer_capacity)
    }

    pub fn create_processors(&self) -> Result<Vec<Processor>, SimulationError> {
        self.processors
            .iter()
            .enumerate()
            .map(|(index, &duration)| Processor::new(index, duration))
            .collect()
    }

    /// Simulator with this configuration's budget and seed
    pub fn build_simulator(&self) -> Result<Simulator, SimulationError> {
        self.build_simulator_with(self.requests_count, self.seed)
    }

    /// Simulator with an overridden budget and seed
    pub fn build_simulator_with(
        &self,
        request_budget: usize,
        seed: u64,
    ) -> Result<Simulator, SimulationError> {
        self.validate()?;
        Simulator::new(
            self.create_sources(seed)?,
            self.create_buffer()?,
            self.create_processors()?,
            request_budget,
        )
    }
}
