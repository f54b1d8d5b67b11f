//! Selection side: dispatch from the buffer and service completion
//!
//! Owns every processor and the per-source succeeded lists.
//!
//! # Selection rules
//!
//! The two rules differ:
//!
//! - **take**: scan in index order and return the first idle processor whose
//!   stale completion time is not later than processor 0's completion time;
//!   the scan stops at that processor.
//! - **release**: scan every processor and keep replacing the candidate with
//!   any busy processor finishing no later than the current one (or with any
//!   busy processor while the current one is idle); the last match wins.

use crate::error::SimulationError;
use crate::models::{Buffer, Processor, Request};
use tracing::warn;

/// Result of completing the earliest-finishing job
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub processor_index: usize,

    /// Copy of the served request, as recorded in the succeeded list
    pub request: Request,

    /// Completion time of the job; the new simulation end-time candidate
    pub end_time: f64,
}

/// Drives dispatch and completion
#[derive(Debug, Clone)]
pub struct SelectionManager {
    processors: Vec<Processor>,

    /// Served requests, indexed by source
    succeeded: Vec<Vec<Request>>,

    take_candidate: Option<usize>,
    release_candidate: Option<usize>,
}

impl SelectionManager {
    /// Create a manager over `processors` serving `source_count` sources
    ///
    /// # Errors
    /// `InvalidConfig` if there are no processors or a processor's index does
    /// not match its position in the list.
    pub fn new(processors: Vec<Processor>, source_count: usize) -> Result<Self, SimulationError> {
        if processors.is_empty() {
            return Err(SimulationError::InvalidConfig(
                "Must have at least one processor".to_string(),
            ));
        }
        for (position, processor) in processors.iter().enumerate() {
            if processor.index() != position {
                return Err(SimulationError::InvalidConfig(format!(
                    "Processor at position {} has index {}",
                    position,
                    processor.index()
                )));
            }
        }

        Ok(Self {
            processors,
            succeeded: vec![Vec::new(); source_count],
            take_candidate: None,
            release_candidate: None,
        })
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn processor(&self, index: usize) -> Option<&Processor> {
        self.processors.get(index)
    }

    /// Served requests, indexed by source
    pub fn succeeded(&self) -> &[Vec<Request>] {
        &self.succeeded
    }

    pub fn succeeded_count(&self) -> usize {
        self.succeeded.iter().map(Vec::len).sum()
    }

    pub fn any_busy(&self) -> bool {
        self.processors.iter().any(Processor::is_busy)
    }

    /// Pick the idle processor that should take the next request
    pub fn select_take_candidate(&mut self) -> Option<usize> {
        let reference = self.processors[0].completion_time();
        self.take_candidate = self
            .processors
            .iter()
            .position(|p| p.is_idle() && reference >= p.completion_time());
        self.take_candidate
    }

    /// Pick the busy processor that finishes next
    pub fn select_release_candidate(&mut self) -> Option<usize> {
        let mut best = 0;
        for (index, current) in self.processors.iter().enumerate() {
            let incumbent = &self.processors[best];
            let earlier = incumbent.completion_time() >= current.completion_time();
            if current.is_busy() && (earlier || incumbent.is_idle()) {
                best = index;
            }
        }

        self.release_candidate = if self.processors[best].is_busy() {
            Some(best)
        } else {
            None
        };
        self.release_candidate
    }

    /// Completion time of the current release candidate
    pub fn release_time(&self) -> Option<f64> {
        self.release_candidate
            .map(|index| self.processors[index].completion_time())
    }

    /// Whether a dispatch would succeed right now
    ///
    /// Refreshes the take candidate.
    pub fn can_take(&mut self, buffer: &Buffer) -> bool {
        self.select_take_candidate().is_some() && !buffer.is_empty()
    }

    /// Move the priority request from the buffer onto an idle processor
    ///
    /// The candidate's stale completion time is the moment it became free, so
    /// the request waited `max(0, completion_time - arrival_time)`.
    /// Returns the index of the processor that took the request.
    pub fn dispatch(&mut self, buffer: &mut Buffer) -> Option<usize> {
        let index = self.select_take_candidate()?;
        let mut request = buffer.take()?;

        let free_since = self.processors[index].completion_time();
        let waited = free_since - request.arrival_time();
        request.set_time_in_buffer(if waited > 0.0 { waited } else { 0.0 });

        match self.processors[index].try_assign(request) {
            Ok(()) => Some(index),
            Err(request) => {
                warn!(
                    processor = index,
                    request = %request.id(),
                    "Take candidate was busy; returning request to buffer"
                );
                // A slot was just freed by `take`, so this cannot be refused
                let _ = buffer.put(request);
                None
            }
        }
    }

    /// Finish the earliest job and record its request as succeeded
    pub fn complete_earliest(&mut self) -> Option<Completion> {
        let index = self.select_release_candidate()?;
        let processor = &mut self.processors[index];
        let request = processor.release()?;
        let end_time = processor.completion_time();

        self.succeeded[request.source_index()].push(request.clone());
        Some(Completion {
            processor_index: index,
            request,
            end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processors(durations: &[f64]) -> Vec<Processor> {
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| Processor::new(i, d).unwrap())
            .collect()
    }

    fn manager(durations: &[f64]) -> SelectionManager {
        SelectionManager::new(processors(durations), 2).unwrap()
    }

    /// Assign a request arriving at `arrival` directly to processor `index`
    fn occupy(manager: &mut SelectionManager, index: usize, arrival: f64) {
        manager.processors[index]
            .try_assign(Request::new(0, index, arrival))
            .unwrap();
    }

    #[test]
    fn test_requires_processors() {
        assert!(SelectionManager::new(Vec::new(), 1).is_err());
    }

    #[test]
    fn test_take_candidate_prefers_first_idle() {
        let mut manager = manager(&[1.0, 1.0, 1.0]);
        assert_eq!(manager.select_take_candidate(), Some(0));

        occupy(&mut manager, 0, 0.0);
        // Processor 0 completes at 1.0; idle processors 1 and 2 are at 0.0
        assert_eq!(manager.select_take_candidate(), Some(1));
    }

    #[test]
    fn test_take_candidate_none_when_all_busy() {
        let mut manager = manager(&[1.0, 1.0]);
        occupy(&mut manager, 0, 0.0);
        occupy(&mut manager, 1, 0.0);
        assert_eq!(manager.select_take_candidate(), None);
    }

    #[test]
    fn test_release_candidate_picks_earliest_completion() {
        let mut manager = manager(&[3.0, 1.0, 2.0]);
        assert_eq!(manager.select_release_candidate(), None);

        occupy(&mut manager, 0, 0.0); // completes at 3.0
        occupy(&mut manager, 1, 0.5); // completes at 1.5
        occupy(&mut manager, 2, 0.0); // completes at 2.0
        assert_eq!(manager.select_release_candidate(), Some(1));
        assert_eq!(manager.release_time(), Some(1.5));
    }

    #[test]
    fn test_release_candidate_tie_goes_to_last() {
        let mut manager = manager(&[1.0, 1.0, 1.0]);
        occupy(&mut manager, 0, 0.0);
        occupy(&mut manager, 2, 0.0);
        assert_eq!(manager.select_release_candidate(), Some(2));
    }

    #[test]
    fn test_release_candidate_skips_idle_first_processor() {
        let mut manager = manager(&[1.0, 5.0]);
        occupy(&mut manager, 1, 0.0);
        assert_eq!(manager.select_release_candidate(), Some(1));
    }

    #[test]
    fn test_dispatch_sets_buffer_wait_from_stale_completion() {
        let mut manager = manager(&[2.0]);
        let mut buffer = Buffer::new(2).unwrap();

        occupy(&mut manager, 0, 0.0); // completes at 2.0
        let completion = manager.complete_earliest().unwrap();
        assert_eq!(completion.end_time, 2.0);

        buffer.put(Request::new(1, 0, 0.5)).unwrap();
        assert!(manager.can_take(&buffer));
        assert_eq!(manager.dispatch(&mut buffer), Some(0));

        let current = manager.processors()[0].current_request().unwrap();
        assert_eq!(current.time_in_buffer(), 1.5);
        assert_eq!(manager.processors()[0].completion_time(), 4.0);
    }

    #[test]
    fn test_dispatch_never_negative_wait() {
        let mut manager = manager(&[1.0]);
        let mut buffer = Buffer::new(1).unwrap();

        buffer.put(Request::new(0, 0, 5.0)).unwrap();
        assert_eq!(manager.dispatch(&mut buffer), Some(0));
        let current = manager.processors()[0].current_request().unwrap();
        assert_eq!(current.time_in_buffer(), 0.0);
        assert_eq!(manager.processors()[0].completion_time(), 6.0);
    }

    #[test]
    fn test_dispatch_empty_buffer_is_noop() {
        let mut manager = manager(&[1.0]);
        let mut buffer = Buffer::new(1).unwrap();
        assert!(!manager.can_take(&buffer));
        assert_eq!(manager.dispatch(&mut buffer), None);
        assert!(!manager.any_busy());
    }

    #[test]
    fn test_complete_records_succeeded_by_source() {
        let mut manager = manager(&[1.0]);
        manager.processors[0]
            .try_assign(Request::new(1, 7, 0.0))
            .unwrap();

        let completion = manager.complete_earliest().unwrap();
        assert_eq!(completion.processor_index, 0);
        assert_eq!(completion.request.time_in_processor(), 1.0);
        assert_eq!(manager.succeeded()[1].len(), 1);
        assert_eq!(manager.succeeded_count(), 1);
        assert!(manager.complete_earliest().is_none());
    }
}
