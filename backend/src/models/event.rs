//! Simulation events for observers and replay.
//!
//! Every externally visible transition of the simulator produces exactly one
//! `SimulatorEvent`. Events are purely observational: they carry value
//! snapshots of the request, processor and buffer involved and never feed
//! back into the engine.
//!
//! # Event Types
//!
//! - **Generate**: a source produced a new arrival
//! - **Take / Buffer / Reject**: outcome of placing that arrival
//! - **Package**: the buffer formed a new priority package
//! - **Take**: a processor picked a request from the buffer
//! - **Release**: a processor finished serving a request
//! - **WorkEnd / Analyze**: terminal markers
//!
//! # Example
//!
//! ```rust
//! use queue_simulator_core_rs::models::{EventType, Request, SimulatorEvent};
//!
//! let event = SimulatorEvent::Reject {
//!     request: Request::new(1, 4, 12.25),
//! };
//!
//! assert_eq!(event.event_type(), EventType::Reject);
//! assert_eq!(event.description(), "Request #1.4 was rejected");
//! ```

use crate::models::{BufferSnapshot, ProcessorSnapshot, Request};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a `SimulatorEvent`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Generate,
    Package,
    Take,
    Buffer,
    Reject,
    Release,
    WorkEnd,
    Analyze,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Generate => "GENERATE",
            EventType::Package => "PACKAGE",
            EventType::Take => "TAKE",
            EventType::Buffer => "BUFFER",
            EventType::Reject => "REJECT",
            EventType::Release => "RELEASE",
            EventType::WorkEnd => "WORK_END",
            EventType::Analyze => "ANALYZE",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One externally visible simulator transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulatorEvent {
    /// A source produced a new arrival
    Generate {
        request: Request,
        /// Requests generated so far, including this one
        generated: usize,
        budget: usize,
    },

    /// The buffer formed a new priority package
    Package { buffer: BufferSnapshot },

    /// A processor started serving a request
    ///
    /// `buffer` is `None` when the arrival was dispatched immediately on
    /// placement, and holds the post-take buffer otherwise.
    Take {
        request: Request,
        processor: ProcessorSnapshot,
        buffer: Option<BufferSnapshot>,
    },

    /// The arrival was admitted and is waiting
    Buffer {
        request: Request,
        buffer: BufferSnapshot,
    },

    /// The arrival found the buffer full
    Reject { request: Request },

    /// A processor finished serving a request
    Release {
        request: Request,
        processor: ProcessorSnapshot,
    },

    /// Generation budget exhausted and every processor idle; data is final
    WorkEnd,

    /// Statistics may now be computed
    Analyze,
}

impl SimulatorEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            SimulatorEvent::Generate { .. } => EventType::Generate,
            SimulatorEvent::Package { .. } => EventType::Package,
            SimulatorEvent::Take { .. } => EventType::Take,
            SimulatorEvent::Buffer { .. } => EventType::Buffer,
            SimulatorEvent::Reject { .. } => EventType::Reject,
            SimulatorEvent::Release { .. } => EventType::Release,
            SimulatorEvent::WorkEnd => EventType::WorkEnd,
            SimulatorEvent::Analyze => EventType::Analyze,
        }
    }

    /// Request the event is about, if any
    pub fn request(&self) -> Option<&Request> {
        match self {
            SimulatorEvent::Generate { request, .. }
            | SimulatorEvent::Take { request, .. }
            | SimulatorEvent::Buffer { request, .. }
            | SimulatorEvent::Reject { request }
            | SimulatorEvent::Release { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Processor the event is about, if any
    pub fn processor(&self) -> Option<&ProcessorSnapshot> {
        match self {
            SimulatorEvent::Take { processor, .. } | SimulatorEvent::Release { processor, .. } => {
                Some(processor)
            }
            _ => None,
        }
    }

    /// Buffer state carried by the event, if any
    pub fn buffer(&self) -> Option<&BufferSnapshot> {
        match self {
            SimulatorEvent::Package { buffer } | SimulatorEvent::Buffer { buffer, .. } => {
                Some(buffer)
            }
            SimulatorEvent::Take { buffer, .. } => buffer.as_ref(),
            _ => None,
        }
    }

    /// Simulated time the event refers to, if it has one
    pub fn time(&self) -> Option<f64> {
        match self {
            SimulatorEvent::Generate { request, .. }
            | SimulatorEvent::Buffer { request, .. }
            | SimulatorEvent::Reject { request } => Some(request.arrival_time()),
            SimulatorEvent::Take { request, .. } => Some(request.service_start_time()),
            SimulatorEvent::Release { processor, .. } => Some(processor.completion_time),
            _ => None,
        }
    }

    /// Human-readable one-line description
    pub fn description(&self) -> String {
        match self {
            SimulatorEvent::Generate {
                request,
                generated,
                budget,
            } => format!(
                "Request #{} was generated in {:.3} [{}/{}]",
                request.id(),
                request.arrival_time(),
                generated,
                budget
            ),
            SimulatorEvent::Package { buffer } => {
                let members: Vec<String> =
                    buffer.package.iter().map(|r| r.id().to_string()).collect();
                format!("Create Package: {}", members.join(", "))
            }
            SimulatorEvent::Take {
                request,
                processor,
                buffer,
            } => {
                let mut line = format!(
                    "Processor #{} take Request #{} in {:.3}",
                    processor.index,
                    request.id(),
                    request.service_start_time()
                );
                if let Some(index) = buffer.as_ref().and_then(|b| b.take_index) {
                    line.push_str(&format!(" from Buffer({})", index));
                }
                line
            }
            SimulatorEvent::Buffer { request, buffer } => format!(
                "Request #{} put to Buffer {}/{}",
                request.id(),
                buffer.len(),
                buffer.capacity
            ),
            SimulatorEvent::Reject { request } => {
                format!("Request #{} was rejected", request.id())
            }
            SimulatorEvent::Release { request, processor } => format!(
                "Processor #{} release Request #{} in {:.3}",
                processor.index,
                request.id(),
                processor.completion_time
            ),
            SimulatorEvent::WorkEnd => "Simulation complete.".to_string(),
            SimulatorEvent::Analyze => "Simulation results are ready for analysis.".to_string(),
        }
    }
}

impl fmt::Display for SimulatorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<SimulatorEvent> with convenience methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<SimulatorEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: SimulatorEvent) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[SimulatorEvent] {
        &self.events
    }

    /// Sequence of event types, in emission order
    pub fn event_types(&self) -> Vec<EventType> {
        self.events.iter().map(|e| e.event_type()).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: EventType) -> Vec<&SimulatorEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events whose request came from a specific source
    pub fn events_for_source(&self, source_index: usize) -> Vec<&SimulatorEvent> {
        self.events
            .iter()
            .filter(|e| e.request().map(|r| r.source_index()) == Some(source_index))
            .collect()
    }

    /// Get events involving a specific processor
    pub fn events_for_processor(&self, processor_index: usize) -> Vec<&SimulatorEvent> {
        self.events
            .iter()
            .filter(|e| e.processor().map(|p| p.index) == Some(processor_index))
            .collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
