//! Buffer model
//!
//! Bounded holding area between the sources and the processors.
//!
//! # Drain order
//!
//! Requests are stored in arrival order. Draining works on a *package*: the
//! requests that share the lowest source index currently present. The package
//! is rebuilt only once it is empty and is drained strictly FIFO, so:
//!
//! - lowest source index wins
//! - ties are broken by arrival order
//! - a request arriving from a more urgent source while a package is being
//!   drained waits for the next package

use crate::error::SimulationError;
use crate::models::{Request, RequestId};
use std::collections::VecDeque;

/// Bounded, priority-draining request buffer
///
/// # Example
/// ```
/// use queue_simulator_core_rs::{Buffer, Request};
///
/// let mut buffer = Buffer::new(4).unwrap();
/// for (sequence, source) in [2, 0, 1, 0].into_iter().enumerate() {
///     buffer.put(Request::new(source, sequence, sequence as f64)).unwrap();
/// }
///
/// let order: Vec<usize> = std::iter::from_fn(|| buffer.take())
///     .map(|r| r.source_index())
///     .collect();
/// assert_eq!(order, vec![0, 0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Buffer {
    capacity: usize,

    /// Waiting requests in arrival order
    requests: Vec<Request>,

    /// Members of the current priority class, front is taken next
    package: VecDeque<RequestId>,

    /// Position in `requests` of the last taken request
    take_index: Option<usize>,
}

impl Buffer {
    /// Create an empty buffer
    ///
    /// # Errors
    /// `InvalidParameter` if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::invalid_parameter(
                "buffer capacity",
                "must be at least 1, got 0",
            ));
        }

        Ok(Self {
            capacity,
            requests: Vec::with_capacity(capacity),
            package: VecDeque::with_capacity(capacity),
            take_index: None,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.requests.len() >= self.capacity
    }

    /// Waiting requests in arrival order
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Requests of the current package, in drain order
    pub fn package(&self) -> Vec<&Request> {
        self.package
            .iter()
            .filter_map(|id| self.requests.iter().find(|r| r.id() == *id))
            .collect()
    }

    pub fn package_is_empty(&self) -> bool {
        self.package.is_empty()
    }

    /// Position the last taken request occupied before removal
    pub fn take_index(&self) -> Option<usize> {
        self.take_index
    }

    /// Append `request` if there is room
    ///
    /// A full buffer hands the request back in `Err`; the caller decides what
    /// a refusal means (the production side records it as a rejection).
    pub fn put(&mut self, request: Request) -> Result<(), Request> {
        if self.is_full() {
            return Err(request);
        }
        self.requests.push(request);
        Ok(())
    }

    /// Collect the lowest-source-index class if no package is pending
    ///
    /// Single scan over the waiting list; members keep list order.
    pub fn rebuild_package_if_empty(&mut self) {
        if !self.package.is_empty() || self.requests.is_empty() {
            return;
        }

        let mut priority = self.requests[0].source_index();
        for request in &self.requests {
            let current = request.source_index();
            if current == priority {
                self.package.push_back(request.id());
            } else if current < priority {
                priority = current;
                self.package.clear();
                self.package.push_back(request.id());
            }
        }
    }

    /// Remove and return the highest-priority waiting request
    ///
    /// Returns `None` on an empty buffer.
    pub fn take(&mut self) -> Option<Request> {
        if self.is_empty() {
            return None;
        }

        self.rebuild_package_if_empty();
        let id = self.package.pop_front()?;
        let position = self.requests.iter().position(|r| r.id() == id)?;
        self.take_index = Some(position);
        Some(self.requests.remove(position))
    }
}
