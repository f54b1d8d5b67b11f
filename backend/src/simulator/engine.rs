//! Simulator Engine - explicit event-stepping state machine
//!
//! Drives the production and selection managers over a shared buffer and
//! reports every externally visible transition as a `SimulatorEvent`.
//!
//! # Phases
//!
//! ```text
//! Init → Generate ─┬─ arrival first ──→ Place ───┐
//!                  └─ completion first → Release ─┼→ Package → Take ─→ Generate
//!                                         │       │
//!                     (nothing busy, budget spent)
//!                                         ↓
//!                                        End → Analyze → Done
//! ```
//!
//! - **Generate**: produce an arrival if the budget allows and it comes
//!   strictly before the earliest completion; otherwise fall to Release.
//! - **Place**: admit or reject the arrival; an admitted arrival is
//!   dispatched at once if a processor can take it. Emits TAKE, BUFFER or REJECT.
//! - **Release**: finish the earliest job (RELEASE), or move to End when
//!   nothing is busy.
//! - **Package**: form a new priority package if none is pending and a
//!   dispatch is possible (PACKAGE).
//! - **Take**: one dispatch from the buffer (TAKE).
//! - **End / Analyze**: terminal markers (WORK_END, ANALYZE).
//!
//! `step()` keeps advancing through silent transitions and returns right
//! after the first one that emits an event.
//!
//! # Example
//!
//! ```rust
//! use queue_simulator_core_rs::{Buffer, Processor, RngManager, Simulator, Source};
//!
//! let sources = vec![Source::new(0, 1.0, RngManager::for_stream(42, 0)).unwrap()];
//! let processors = vec![Processor::new(0, 0.8).unwrap()];
//! let buffer = Buffer::new(2).unwrap();
//!
//! let mut simulator = Simulator::new(sources, buffer, processors, 50).unwrap();
//! simulator.run_to_completion();
//!
//! assert!(simulator.is_finished());
//! assert_eq!(simulator.progress(), 50);
//! ```

use crate::error::SimulationError;
use crate::managers::{ProductionManager, SelectionManager};
use crate::models::{
    Buffer, BufferSnapshot, EventLog, Processor, ProcessorSnapshot, Request, SimulatorEvent,
    Source,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

// ============================================================================
// Phase bookkeeping
// ============================================================================

/// Where the simulator will resume on the next `step()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Generate,
    Place,
    Release,
    Package,
    Take,
    End,
    Analyze,
    /// Terminal: no further steps
    Done,
}

/// How a run driven by `run_until_cancelled` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The simulator reached its terminal phase
    Completed,
    /// The cancel flag was observed; state is whatever the last step left
    Cancelled,
}

/// Outcome of one phase handler
struct Transition {
    next: Phase,
    event: Option<SimulatorEvent>,
}

impl Transition {
    fn silent(next: Phase) -> Self {
        Self { next, event: None }
    }

    fn emit(next: Phase, event: SimulatorEvent) -> Self {
        Self {
            next,
            event: Some(event),
        }
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Single-stage queueing network simulator
///
/// Owns the buffer and both managers. All time is simulated; nothing here
/// blocks or sleeps, so `step()` can be driven from a UI action, a test,
/// or a worker-thread loop alike.
///
/// # Determinism
///
/// All randomness lives in the sources' seeded generators. Same seeds and
/// parameters produce an identical event sequence.
#[derive(Debug, Clone)]
pub struct Simulator {
    buffer: Buffer,
    production: ProductionManager,
    selection: SelectionManager,

    phase: Phase,

    /// Arrival generated in Generate, placed in Place
    pending_arrival: Option<Request>,

    /// Completion time of the most recent release
    end_time: f64,

    last_event: Option<SimulatorEvent>,
    events_emitted: usize,
}

impl Simulator {
    /// Create a simulator that will generate `request_budget` arrivals
    ///
    /// # Errors
    /// `InvalidConfig` if there are no sources or processors, or their
    /// indices do not match their list positions.
    pub fn new(
        sources: Vec<Source>,
        buffer: Buffer,
        processors: Vec<Processor>,
        request_budget: usize,
    ) -> Result<Self, SimulationError> {
        let source_count = sources.len();
        let production = ProductionManager::new(sources, request_budget)?;
        let selection = SelectionManager::new(processors, source_count)?;

        Ok(Self {
            buffer,
            production,
            selection,
            phase: Phase::Init,
            pending_arrival: None,
            end_time: 0.0,
            last_event: None,
            events_emitted: 0,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn production(&self) -> &ProductionManager {
        &self.production
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Simulated time of the last completion seen so far
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn request_budget(&self) -> usize {
        self.production.request_budget()
    }

    pub fn rejected_count(&self) -> usize {
        self.production.rejected_count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.selection.succeeded_count()
    }

    /// Requests that have left the system (rejected + served)
    ///
    /// Never decreases; equals the request budget once the run is complete.
    pub fn progress(&self) -> usize {
        self.rejected_count() + self.succeeded_count()
    }

    /// Event emitted by the most recent step, if any
    pub fn last_event(&self) -> Option<&SimulatorEvent> {
        self.last_event.as_ref()
    }

    /// Total events emitted so far
    pub fn event_count(&self) -> usize {
        self.events_emitted
    }

    /// Whether further steps remain
    pub fn can_continue(&self) -> bool {
        self.phase != Phase::Done
    }

    /// Whether the terminal phase has been reached
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Whether WORK_END has been emitted (simulation data is final)
    pub fn is_work_complete(&self) -> bool {
        matches!(self.phase, Phase::Analyze | Phase::Done)
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance to the next externally visible transition
    ///
    /// Returns whether further steps remain. Once the terminal phase is
    /// reached every call returns `false` and emits nothing.
    pub fn step(&mut self) -> bool {
        loop {
            let transition = match self.phase {
                Phase::Init => Transition::silent(Phase::Generate),
                Phase::Generate => self.generate_phase(),
                Phase::Place => self.place_phase(),
                Phase::Release => self.release_phase(),
                Phase::Package => self.package_phase(),
                Phase::Take => self.take_phase(),
                Phase::End => self.end_phase(),
                Phase::Analyze => Transition::emit(Phase::Done, SimulatorEvent::Analyze),
                Phase::Done => return false,
            };

            trace!(from = ?self.phase, to = ?transition.next, "Phase transition");
            self.phase = transition.next;

            if let Some(event) = transition.event {
                self.emit(event);
                return self.can_continue();
            }
        }
    }

    /// Step once and return the emitted event, if any
    pub fn next_event(&mut self) -> Option<SimulatorEvent> {
        let before = self.events_emitted;
        self.step();
        if self.events_emitted > before {
            self.last_event.clone()
        } else {
            None
        }
    }

    /// Iterate over the remaining events, stepping lazily
    pub fn events(&mut self) -> impl Iterator<Item = SimulatorEvent> + '_ {
        std::iter::from_fn(move || self.next_event())
    }

    /// Step until the terminal phase
    pub fn run_to_completion(&mut self) {
        while self.step() {}
    }

    /// Step until the terminal phase, handing every emitted event to `observer`
    pub fn run_with<F>(&mut self, mut observer: F)
    where
        F: FnMut(&SimulatorEvent),
    {
        while let Some(event) = self.next_event() {
            observer(&event);
        }
    }

    /// Run to completion and return the full event history
    pub fn record(&mut self) -> EventLog {
        let mut log = EventLog::new();
        self.run_with(|event| log.log(event.clone()));
        log
    }

    /// Step until the terminal phase or until `cancel` is set
    ///
    /// The flag is checked once before every step; an in-flight step always
    /// completes and nothing is rolled back.
    pub fn run_until_cancelled(&mut self, cancel: &AtomicBool) -> RunOutcome {
        loop {
            if cancel.load(Ordering::Relaxed) {
                debug!(progress = self.progress(), "Simulation cancelled");
                return RunOutcome::Cancelled;
            }
            if !self.step() {
                return RunOutcome::Completed;
            }
        }
    }

    // ========================================================================
    // Phase handlers
    // ========================================================================

    fn generate_phase(&mut self) -> Transition {
        self.production.select_nearest_source();
        self.selection.select_release_candidate();

        let arrival_first = match self.selection.release_time() {
            Some(release_time) => self.production.nearest_time() < release_time,
            None => true,
        };

        if !(self.production.can_generate() && arrival_first) {
            return Transition::silent(Phase::Release);
        }

        let request = self.production.generate();
        let event = SimulatorEvent::Generate {
            request: request.clone(),
            generated: self.production.generated_count(),
            budget: self.production.request_budget(),
        };
        self.pending_arrival = Some(request);
        Transition::emit(Phase::Place, event)
    }

    fn place_phase(&mut self) -> Transition {
        let Some(request) = self.pending_arrival.take() else {
            return Transition::silent(Phase::Package);
        };
        let arrival = request.clone();

        if !self.production.admit_or_reject(request, &mut self.buffer) {
            return Transition::emit(Phase::Package, SimulatorEvent::Reject { request: arrival });
        }

        let event = self
            .selection
            .dispatch(&mut self.buffer)
            .and_then(|index| self.take_event(index, false))
            .unwrap_or_else(|| SimulatorEvent::Buffer {
                request: arrival,
                buffer: BufferSnapshot::from(&self.buffer),
            });
        Transition::emit(Phase::Package, event)
    }

    fn release_phase(&mut self) -> Transition {
        let Some(completion) = self.selection.complete_earliest() else {
            return Transition::silent(Phase::End);
        };

        self.end_time = completion.end_time;
        let processor = match self.selection.processor(completion.processor_index) {
            Some(processor) => ProcessorSnapshot::from(processor),
            None => return Transition::silent(Phase::Package),
        };

        Transition::emit(
            Phase::Package,
            SimulatorEvent::Release {
                request: completion.request,
                processor,
            },
        )
    }

    fn package_phase(&mut self) -> Transition {
        if self.buffer.package_is_empty() && self.selection.can_take(&self.buffer) {
            self.buffer.rebuild_package_if_empty();
            return Transition::emit(
                Phase::Take,
                SimulatorEvent::Package {
                    buffer: BufferSnapshot::from(&self.buffer),
                },
            );
        }
        Transition::silent(Phase::Take)
    }

    fn take_phase(&mut self) -> Transition {
        match self
            .selection
            .dispatch(&mut self.buffer)
            .and_then(|index| self.take_event(index, true))
        {
            Some(event) => Transition::emit(Phase::Generate, event),
            None => Transition::silent(Phase::Generate),
        }
    }

    fn end_phase(&mut self) -> Transition {
        info!(
            budget = self.production.request_budget(),
            rejected = self.rejected_count(),
            succeeded = self.succeeded_count(),
            end_time = self.end_time,
            "Simulation complete"
        );
        Transition::emit(Phase::Analyze, SimulatorEvent::WorkEnd)
    }

    /// TAKE event for the processor that just accepted a request
    fn take_event(&self, processor_index: usize, with_buffer: bool) -> Option<SimulatorEvent> {
        let processor = self.selection.processor(processor_index)?;
        let request = processor.current_request()?.clone();
        Some(SimulatorEvent::Take {
            request,
            processor: ProcessorSnapshot::from(processor),
            buffer: with_buffer.then(|| BufferSnapshot::from(&self.buffer)),
        })
    }

    fn emit(&mut self, event: SimulatorEvent) {
        debug!(
            event_type = %event.event_type(),
            progress = self.progress(),
            "{}",
            event.description()
        );
        self.events_emitted += 1;
        self.last_event = Some(event);
    }
}

// ============================================================================
// Tests
// ============================================================================
