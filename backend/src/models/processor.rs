//! Processor model
//!
//! A single-slot server. Service takes a fixed, deterministic duration; unlike
//! sources, processors draw nothing from the RNG.

use crate::error::{ensure_positive, SimulationError};
use crate::models::Request;

/// Single-slot server with a deterministic service duration
///
/// `completion_time` keeps its last value after the processor goes idle; the
/// selection rules use that stale value as the moment the processor became
/// free.
///
/// # Example
/// ```
/// use queue_simulator_core_rs::{Processor, Request};
///
/// let mut processor = Processor::new(0, 1.5).unwrap();
/// processor.try_assign(Request::new(0, 0, 2.0)).unwrap();
/// assert!(processor.is_busy());
/// assert_eq!(processor.completion_time(), 3.5);
///
/// let served = processor.release().unwrap();
/// assert_eq!(served.time_in_processor(), 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct Processor {
    index: usize,
    service_duration: f64,
    completion_time: f64,
    accumulated_busy_time: f64,
    current: Option<Request>,
}

impl Processor {
    /// Create an idle processor
    ///
    /// # Errors
    /// `InvalidParameter` if `service_duration` is not a finite number greater than 0.
    pub fn new(index: usize, service_duration: f64) -> Result<Self, SimulationError> {
        ensure_positive("processor service duration", service_duration)?;

        Ok(Self {
            index,
            service_duration,
            completion_time: 0.0,
            accumulated_busy_time: 0.0,
            current: None,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Completion time of the current job, or of the last one while idle
    pub fn completion_time(&self) -> f64 {
        self.completion_time
    }

    pub fn accumulated_busy_time(&self) -> f64 {
        self.accumulated_busy_time
    }

    pub fn current_request(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    /// Start serving `request` if idle
    ///
    /// Service starts at `arrival_time + time_in_buffer` and lasts
    /// `service_duration`. A busy processor hands the request back in `Err`.
    pub fn try_assign(&mut self, request: Request) -> Result<(), Request> {
        if self.is_busy() {
            return Err(request);
        }

        self.completion_time = request.service_start_time() + self.service_duration;
        self.current = Some(request);
        Ok(())
    }

    /// Finish the current job and hand back the served request
    ///
    /// Returns `None` if the processor was already idle.
    pub fn release(&mut self) -> Option<Request> {
        let mut request = self.current.take()?;
        request.set_time_in_processor(self.service_duration);
        self.accumulated_busy_time += self.service_duration;
        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_duration() {
        assert!(Processor::new(0, 0.0).is_err());
        assert!(Processor::new(0, -0.5).is_err());
    }

    #[test]
    fn test_busy_processor_returns_request() {
        let mut processor = Processor::new(0, 1.0).unwrap();
        processor.try_assign(Request::new(0, 0, 0.0)).unwrap();

        let second = Request::new(0, 1, 0.5);
        let refused = processor.try_assign(second.clone());
        assert_eq!(refused, Err(second));
        assert_eq!(processor.current_request().unwrap().sequence_number(), 0);
    }

    #[test]
    fn test_release_idle_returns_none() {
        let mut processor = Processor::new(0, 1.0).unwrap();
        assert!(processor.release().is_none());
        assert_eq!(processor.accumulated_busy_time(), 0.0);
    }

    #[test]
    fn test_completion_time_includes_buffer_wait() {
        let mut processor = Processor::new(1, 2.0).unwrap();
        let mut request = Request::new(0, 0, 1.0);
        request.set_time_in_buffer(0.5);

        processor.try_assign(request).unwrap();
        assert_eq!(processor.completion_time(), 3.5);

        processor.release().unwrap();
        // Stale completion time survives the release
        assert_eq!(processor.completion_time(), 3.5);
        assert_eq!(processor.accumulated_busy_time(), 2.0);
        assert!(processor.is_idle());
    }
}
