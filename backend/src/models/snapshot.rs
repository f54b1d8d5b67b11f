//! Snapshots - immutable value copies of engine components
//!
//! Events hand these to observers instead of references into the running
//! engine, so nothing an observer keeps can change underneath it or feed
//! back into the simulation.

use crate::models::{Buffer, Processor, Request};
use serde::{Deserialize, Serialize};

/// Processor state at the moment an event was emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSnapshot {
    pub index: usize,
    pub service_duration: f64,
    pub busy: bool,
    pub completion_time: f64,
    pub accumulated_busy_time: f64,
    pub request: Option<Request>,
}

impl From<&Processor> for ProcessorSnapshot {
    fn from(processor: &Processor) -> Self {
        ProcessorSnapshot {
            index: processor.index(),
            service_duration: processor.service_duration(),
            busy: processor.is_busy(),
            completion_time: processor.completion_time(),
            accumulated_busy_time: processor.accumulated_busy_time(),
            request: processor.current_request().cloned(),
        }
    }
}

/// Buffer state at the moment an event was emitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferSnapshot {
    pub capacity: usize,

    /// Waiting requests in arrival order
    pub requests: Vec<Request>,

    /// Current package, in drain order
    pub package: Vec<Request>,

    pub take_index: Option<usize>,
}

impl BufferSnapshot {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl From<&Buffer> for BufferSnapshot {
    fn from(buffer: &Buffer) -> Self {
        BufferSnapshot {
            capacity: buffer.capacity(),
            requests: buffer.requests().to_vec(),
            package: buffer.package().into_iter().cloned().collect(),
            take_index: buffer.take_index(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_snapshot_is_detached() {
        let mut buffer = Buffer::new(3).unwrap();
        buffer.put(Request::new(1, 0, 0.5)).unwrap();
        buffer.put(Request::new(0, 0, 0.7)).unwrap();
        buffer.rebuild_package_if_empty();

        let snapshot = BufferSnapshot::from(&buffer);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.package.len(), 1);
        assert_eq!(snapshot.package[0].source_index(), 0);

        buffer.take().unwrap();
        assert_eq!(snapshot.len(), 2, "snapshot must not follow the buffer");
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_processor_snapshot_copies_request() {
        let mut processor = Processor::new(2, 1.0).unwrap();
        processor.try_assign(Request::new(0, 4, 3.0)).unwrap();

        let snapshot = ProcessorSnapshot::from(&processor);
        assert!(snapshot.busy);
        assert_eq!(snapshot.index, 2);
        assert_eq!(snapshot.completion_time, 4.0);
        assert_eq!(snapshot.request.as_ref().unwrap().sequence_number(), 4);

        processor.release().unwrap();
        assert!(snapshot.busy);
    }
}
