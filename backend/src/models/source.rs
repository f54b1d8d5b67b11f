//! Source model
//!
//! An arrival stream with exponentially distributed inter-arrival times.
//! The next request is always generated one step ahead so the managers can
//! look at its arrival time before deciding whether to consume it.

use crate::error::{ensure_positive, SimulationError};
use crate::models::Request;
use crate::rng::RngManager;

/// Per-stream exponential arrival generator
///
/// # Example
/// ```
/// use queue_simulator_core_rs::{RngManager, Source};
///
/// let mut source = Source::new(0, 2.0, RngManager::new(7)).unwrap();
/// let first_time = source.peek_time();
/// let first = source.take_and_advance();
/// assert_eq!(first.arrival_time(), first_time);
/// assert!(source.peek_time() > first_time);
/// ```
#[derive(Debug, Clone)]
pub struct Source {
    index: usize,
    rate: f64,
    generated_count: usize,
    pending: Request,
    rng: RngManager,
}

impl Source {
    /// Create a source and pre-generate its first arrival
    ///
    /// # Errors
    /// `InvalidParameter` if `rate` is not a finite number greater than 0.
    pub fn new(index: usize, rate: f64, mut rng: RngManager) -> Result<Self, SimulationError> {
        ensure_positive("source rate", rate)?;

        let first_arrival = rng.exponential(rate);
        Ok(Self {
            index,
            rate,
            generated_count: 0,
            pending: Request::new(index, 0, first_arrival),
            rng,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Number of requests consumed from this source so far
    pub fn generated_count(&self) -> usize {
        self.generated_count
    }

    /// Arrival time of the pending (not yet consumed) request
    pub fn peek_time(&self) -> f64 {
        self.pending.arrival_time()
    }

    /// Hand out the pending request and pre-generate the following one
    pub fn take_and_advance(&mut self) -> Request {
        self.generated_count += 1;

        let previous = self.pending.arrival_time();
        let mut next_arrival = previous + self.rng.exponential(self.rate);
        if next_arrival <= previous {
            // Interval below float resolution at this time: take the next representable value
            next_arrival = f64::from_bits(previous.to_bits() + 1);
        }
        let next = Request::new(self.index, self.generated_count, next_arrival);
        std::mem::replace(&mut self.pending, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(matches!(
            Source::new(0, 0.0, RngManager::new(1)),
            Err(SimulationError::InvalidParameter { .. })
        ));
        assert!(Source::new(0, -1.0, RngManager::new(1)).is_err());
    }

    #[test]
    fn test_sequence_numbers_follow_generation_order() {
        let mut source = Source::new(3, 1.0, RngManager::new(11)).unwrap();

        for expected in 0..5 {
            let request = source.take_and_advance();
            assert_eq!(request.source_index(), 3);
            assert_eq!(request.sequence_number(), expected);
        }
        assert_eq!(source.generated_count(), 5);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let source = Source::new(0, 1.0, RngManager::new(5)).unwrap();
        assert_eq!(source.peek_time(), source.peek_time());
        assert_eq!(source.generated_count(), 0);
    }
}
