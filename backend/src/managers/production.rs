//! Production side: arrival generation and buffer admission
//!
//! Owns every source and the per-source rejected lists. The buffer itself
//! belongs to the simulator and is lent in for each admission.

use crate::error::SimulationError;
use crate::models::{Buffer, Request, Source};
use tracing::trace;

/// Drives arrival generation and admission/rejection
#[derive(Debug, Clone)]
pub struct ProductionManager {
    sources: Vec<Source>,
    request_budget: usize,
    generated_count: usize,

    /// Rejected requests, indexed by source
    rejected: Vec<Vec<Request>>,

    /// Source picked by the last `select_nearest_source` call
    nearest: usize,
}

impl ProductionManager {
    /// Create a manager over `sources` that will generate `request_budget` arrivals
    ///
    /// # Errors
    /// `InvalidConfig` if there are no sources or a source's index does not
    /// match its position in the list.
    pub fn new(sources: Vec<Source>, request_budget: usize) -> Result<Self, SimulationError> {
        if sources.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one source".to_string(),
            ));
        }
        for (position, source) in sources.iter().enumerate() {
            if source.index() != position {
                return Err(SimulationError::InvalidConfig(format!(
                    "Source at position {} has index {}",
                    position,
                    source.index()
                )));
            }
        }

        let rejected = vec![Vec::new(); sources.len()];
        Ok(Self {
            sources,
            request_budget,
            generated_count: 0,
            rejected,
            nearest: 0,
        })
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn request_budget(&self) -> usize {
        self.request_budget
    }

    pub fn generated_count(&self) -> usize {
        self.generated_count
    }

    /// Rejected requests, indexed by source
    pub fn rejected(&self) -> &[Vec<Request>] {
        &self.rejected
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.iter().map(Vec::len).sum()
    }

    pub fn can_generate(&self) -> bool {
        self.generated_count < self.request_budget
    }

    /// Pick the source whose pending arrival comes first
    ///
    /// Strict comparison: on equal times the earlier source in the list wins.
    pub fn select_nearest_source(&mut self) -> usize {
        let mut nearest = 0;
        for (index, source) in self.sources.iter().enumerate() {
            if self.sources[nearest].peek_time() > source.peek_time() {
                nearest = index;
            }
        }
        self.nearest = nearest;
        nearest
    }

    /// Pending arrival time of the currently selected source
    pub fn nearest_time(&self) -> f64 {
        self.sources[self.nearest].peek_time()
    }

    /// Consume the selected source's pending arrival
    pub fn generate(&mut self) -> Request {
        let request = self.sources[self.nearest].take_and_advance();
        self.generated_count += 1;
        trace!(
            request = %request.id(),
            time = request.arrival_time(),
            generated = self.generated_count,
            "Arrival generated"
        );
        request
    }

    /// Place `request` into the buffer, or record it as rejected
    ///
    /// Returns `true` on admission.
    pub fn admit_or_reject(&mut self, request: Request, buffer: &mut Buffer) -> bool {
        match buffer.put(request) {
            Ok(()) => true,
            Err(request) => {
                let source = request.source_index();
                self.rejected[source].push(request);
                false
            }
        }
    }
}
