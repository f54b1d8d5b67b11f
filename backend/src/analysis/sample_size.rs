//! Sample-size search
//!
//! Repeats full simulations, re-estimating the request budget needed for
//! the rejection probability to reach a target relative precision:
//!
//! ```text
//! n_next = round(Ta² · (1 - p) / (p · d²))
//! ```
//!
//! The search stops when two consecutive estimates agree within
//! `d · p_prev`, or when an estimate is degenerate (0 or 1), in which case
//! the degenerate run is discarded and the previous valid one is kept.
//! Each iteration builds a fresh object graph with its own seed.

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::simulator::{RunOutcome, Simulator};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;
use tracing::{debug, info, warn};

/// Student's t critical value for the search
pub const CRITICAL_VALUE: f64 = 1.643;

/// Target relative precision of the rejection probability
pub const RELATIVE_PRECISION: f64 = 0.1;

pub const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Why the search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Two consecutive estimates agreed within the precision
    Converged,
    /// An estimate of 0 or 1 ended the search; the kept run precedes it
    Degenerate,
    /// `max_iterations` runs completed without convergence
    IterationLimit,
}

/// Kept run of a sample-size search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The finished simulator of the kept run
    pub simulator: Simulator,
    /// Budget the kept run was simulated with
    pub budget: usize,
    pub reject_probability: f64,
    /// Iteration (1-based) that produced the kept run
    pub iterations: usize,
    pub termination: Termination,
}

/// Search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeSearch {
    pub initial_budget: usize,
    pub critical_value: f64,
    pub precision: f64,
    pub max_iterations: usize,
}

impl Default for SampleSizeSearch {
    fn default() -> Self {
        Self {
            initial_budget: 100,
            critical_value: CRITICAL_VALUE,
            precision: RELATIVE_PRECISION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SampleSizeSearch {
    pub fn new(initial_budget: usize) -> Self {
        Self {
            initial_budget,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.initial_budget == 0 {
            return Err(SimulationError::invalid_parameter(
                "initial budget",
                "must be at least 1",
            ));
        }
        if self.max_iterations == 0 {
            return Err(SimulationError::invalid_parameter(
                "max iterations",
                "must be at least 1",
            ));
        }
        crate::error::ensure_positive("critical value", self.critical_value)?;
        crate::error::ensure_positive("precision", self.precision)?;
        Ok(())
    }

    /// Budget estimate for an observed rejection probability `p` in (0, 1)
    pub fn next_budget(&self, p: f64) -> usize {
        let ta = self.critical_value;
        let d = self.precision;
        let estimate = (ta * ta * (1.0 - p) / (p * d * d)).round();
        if estimate >= 1.0 {
            estimate as usize
        } else {
            1
        }
    }

    /// Whether two consecutive estimates agree
    ///
    /// The tolerance is relative to the previous estimate and uses the same
    /// `precision` as the budget formula: `|p_prev - p| < precision · p_prev`.
    pub fn has_converged(&self, previous: f64, p: f64) -> bool {
        (previous - p).abs() < self.precision * previous
    }

    /// Run the search to completion
    ///
    /// Returns `Ok(None)` when no non-degenerate run was produced.
    pub fn run(&self, config: &SimulationConfig) -> Result<Option<SearchOutcome>, SimulationError> {
        self.run_until_cancelled(config, &AtomicBool::new(false))
    }

    /// Run the search, checking `cancel` once per simulation step
    ///
    /// Returns `Ok(None)` when cancelled or when no non-degenerate run was produced.
    pub fn run_until_cancelled(
        &self,
        config: &SimulationConfig,
        cancel: &AtomicBool,
    ) -> Result<Option<SearchOutcome>, SimulationError> {
        self.validate()?;
        config.validate()?;

        let mut budget = self.initial_budget;
        // (budget, probability) of the previous valid run
        let mut previous: Option<(usize, f64)> = None;
        let mut kept: Option<SearchOutcome> = None;

        for iteration in 1..=self.max_iterations {
            let mut simulator =
                config.build_simulator_with(budget, iteration_seed(config.seed, iteration))?;
            if simulator.run_until_cancelled(cancel) == RunOutcome::Cancelled {
                info!(iteration, budget, "Sample size search cancelled");
                return Ok(None);
            }

            let p = simulator.rejected_count() as f64 / budget as f64;

            if p == 0.0 || p == 1.0 {
                warn!(
                    iteration,
                    budget,
                    reject_probability = p,
                    "Degenerate rejection probability; keeping previous run"
                );
                return Ok(kept.map(|outcome| SearchOutcome {
                    termination: Termination::Degenerate,
                    ..outcome
                }));
            }

            let difference = previous.map(|(_, prev)| (prev - p).abs());
            let tolerance = previous.map(|(_, prev)| self.precision * prev);
            debug!(
                iteration,
                previous_budget = ?previous.map(|(n, _)| n),
                previous_probability = ?previous.map(|(_, prev)| prev),
                budget,
                reject_probability = p,
                difference = ?difference,
                tolerance = ?tolerance,
                "Search iteration finished"
            );

            let converged = previous.map_or(false, |(_, prev)| self.has_converged(prev, p));
            kept = Some(SearchOutcome {
                simulator,
                budget,
                reject_probability: p,
                iterations: iteration,
                termination: if converged {
                    Termination::Converged
                } else {
                    Termination::IterationLimit
                },
            });

            if converged {
                info!(iteration, budget, reject_probability = p, "Sample size search converged");
                return Ok(kept);
            }

            previous = Some((budget, p));
            budget = self.next_budget(p);
        }

        warn!(
            max_iterations = self.max_iterations,
            "Sample size search hit iteration limit"
        );
        Ok(kept)
    }
}

/// Seed of one search iteration
pub fn iteration_seed(seed: u64, iteration: usize) -> u64 {
    seed.wrapping_add(iteration as u64)
}
