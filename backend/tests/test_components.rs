//! Tests for Request, Source and Processor

use proptest::prelude::*;
use queue_simulator_core_rs::{Processor, Request, RngManager, SimulationError, Source};

// ============================================================================
// Request
// ============================================================================

#[test]
fn test_request_starts_unserved() {
    let request = Request::new(2, 5, 3.25);

    assert_eq!(request.source_index(), 2);
    assert_eq!(request.sequence_number(), 5);
    assert_eq!(request.arrival_time(), 3.25);
    assert_eq!(request.time_in_buffer(), 0.0);
    assert_eq!(request.time_in_processor(), 0.0);
    assert_eq!(request.life_time(), 0.0);
    assert_eq!(request.id().to_string(), "2.5");
}

// ============================================================================
// Source
// ============================================================================

#[test]
fn test_source_rejects_invalid_rate() {
    for rate in [0.0, -1.0, f64::NAN] {
        assert!(matches!(
            Source::new(0, rate, RngManager::new(1)),
            Err(SimulationError::InvalidParameter { name: "source rate", .. })
        ));
    }
}

#[test]
fn test_source_arrivals_strictly_increase() {
    let mut source = Source::new(1, 4.0, RngManager::for_stream(11, 1)).unwrap();
    let mut last = 0.0;

    for sequence in 0..1000 {
        let request = source.take_and_advance();
        assert!(request.arrival_time() > last);
        assert_eq!(request.source_index(), 1);
        assert_eq!(request.sequence_number(), sequence);
        last = request.arrival_time();
    }
    assert_eq!(source.generated_count(), 1000);
}

#[test]
fn test_arrivals_advance_at_top_of_uniform_range() {
    // The first interval of this stream comes from a draw at the top of (0, 1)
    let mut source = Source::new(0, 1.0, RngManager::new(0x5c91_3900_41fe_4692)).unwrap();

    let mut last = source.take_and_advance().arrival_time();
    for _ in 0..10 {
        let arrival = source.take_and_advance().arrival_time();
        assert!(arrival > last, "arrival {} did not advance past {}", arrival, last);
        last = arrival;
    }
}

#[test]
fn test_peek_does_not_consume() {
    let mut source = Source::new(0, 1.0, RngManager::new(3)).unwrap();
    let peeked = source.peek_time();

    assert_eq!(source.peek_time(), peeked);
    assert_eq!(source.generated_count(), 0);
    assert_eq!(source.take_and_advance().arrival_time(), peeked);
}

// ============================================================================
// Processor
// ============================================================================

#[test]
fn test_processor_rejects_invalid_duration() {
    assert!(matches!(
        Processor::new(0, 0.0),
        Err(SimulationError::InvalidParameter { .. })
    ));
}

#[test]
fn test_processor_lifecycle() {
    let mut processor = Processor::new(3, 2.0).unwrap();
    assert!(processor.is_idle());
    assert_eq!(processor.completion_time(), 0.0);

    processor.try_assign(Request::new(0, 0, 1.0)).unwrap();
    assert!(processor.is_busy());
    assert_eq!(processor.completion_time(), 3.0);

    let served = processor.release().unwrap();
    assert!(processor.is_idle());
    assert_eq!(served.time_in_processor(), 2.0);
    assert_eq!(served.life_time(), 2.0);

    // Completion time is kept after going idle
    assert_eq!(processor.completion_time(), 3.0);
    assert_eq!(processor.accumulated_busy_time(), 2.0);
}

#[test]
fn test_busy_and_idle_outcomes_are_not_errors() {
    let mut processor = Processor::new(0, 1.0).unwrap();
    assert!(processor.release().is_none());

    processor.try_assign(Request::new(0, 0, 0.0)).unwrap();
    let refused = processor.try_assign(Request::new(0, 1, 0.5));
    assert_eq!(refused.unwrap_err().sequence_number(), 1);
}

#[test]
fn test_busy_time_accumulates() {
    let mut processor = Processor::new(0, 0.5).unwrap();

    for sequence in 0..4 {
        processor
            .try_assign(Request::new(0, sequence, sequence as f64))
            .unwrap();
        processor.release().unwrap();
    }
    assert_eq!(processor.accumulated_busy_time(), 2.0);
}

proptest! {
    #[test]
    fn prop_arrivals_strictly_increase(
        seed in any::<u64>(),
        stream in 0u64..16,
        rate in 0.01f64..100.0,
    ) {
        let mut source = Source::new(0, rate, RngManager::for_stream(seed, stream)).unwrap();
        let mut last = 0.0;

        for _ in 0..200 {
            let arrival = source.take_and_advance().arrival_time();
            prop_assert!(arrival > last);
            last = arrival;
        }
    }
}
