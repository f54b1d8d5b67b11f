//! Domain models for the queueing simulator

pub mod buffer;
pub mod event;
pub mod processor;
pub mod request;
pub mod snapshot;
pub mod source;

// Re-exports
pub use buffer::Buffer;
pub use event::{EventLog, EventType, SimulatorEvent};
pub use processor::Processor;
pub use request::{Request, RequestId};
pub use snapshot::{BufferSnapshot, ProcessorSnapshot};
pub use source::Source;
