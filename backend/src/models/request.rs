//! Request model
//!
//! A request is one arrival travelling through the system.
//! Each request has:
//! - Source index (also its priority class, lower = more urgent)
//! - Per-source sequence number
//! - Arrival time (simulated)
//! - Time spent waiting in the buffer and time spent in service
//!
//! Requests are never dropped: after the run every generated request sits
//! either in its source's rejected list or in its source's succeeded list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a request: `(source_index, sequence_number)` is unique per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId {
    pub source_index: usize,
    pub sequence_number: usize,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.source_index, self.sequence_number)
    }
}

/// A single arrival and the timing of its journey
///
/// # Example
/// ```
/// use queue_simulator_core_rs::Request;
///
/// let request = Request::new(1, 0, 2.5);
/// assert_eq!(request.source_index(), 1);
/// assert_eq!(request.life_time(), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    source_index: usize,
    sequence_number: usize,
    arrival_time: f64,

    /// Written once, when the request leaves the buffer
    time_in_buffer: f64,

    /// Written once, when the processor releases the request
    time_in_processor: f64,
}

impl Request {
    /// Create a request that has not been buffered or served yet
    pub fn new(source_index: usize, sequence_number: usize, arrival_time: f64) -> Self {
        Self {
            source_index,
            sequence_number,
            arrival_time,
            time_in_buffer: 0.0,
            time_in_processor: 0.0,
        }
    }

    pub fn id(&self) -> RequestId {
        RequestId {
            source_index: self.source_index,
            sequence_number: self.sequence_number,
        }
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn time_in_buffer(&self) -> f64 {
        self.time_in_buffer
    }

    pub fn time_in_processor(&self) -> f64 {
        self.time_in_processor
    }

    /// Total time in the system: waiting plus service
    pub fn life_time(&self) -> f64 {
        self.time_in_buffer + self.time_in_processor
    }

    /// Simulated time at which service started
    pub fn service_start_time(&self) -> f64 {
        self.arrival_time + self.time_in_buffer
    }

    pub(crate) fn set_time_in_buffer(&mut self, time: f64) {
        self.time_in_buffer = time;
    }

    pub(crate) fn set_time_in_processor(&mut self, time: f64) {
        self.time_in_processor = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_life_time_is_sum_of_parts() {
        let mut request = Request::new(0, 3, 1.0);
        request.set_time_in_buffer(0.75);
        request.set_time_in_processor(2.0);

        assert_eq!(request.life_time(), 2.75);
        assert_eq!(request.service_start_time(), 1.75);
    }

    #[test]
    fn test_request_id_display() {
        let request = Request::new(2, 14, 0.0);
        assert_eq!(request.id().to_string(), "2.14");
    }
}
