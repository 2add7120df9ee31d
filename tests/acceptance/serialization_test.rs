//! Concurrent access to the coprocessor.
//!
//! # Acceptance Criteria
//!
//! - Requests from several threads are serialized through one engine
//! - The board never observes an overlapping handshake
//! - Every caller receives its own result

use super::common::{config_with_latency, peripherals, wall_board};
use sqrtbench_core::engine::{HardwareSqrt, SharedEngine, SoftwareSqrt, SquareRootEngine};
use sqrtbench_core::vector::{TestVector, SAMPLE_COUNT};
use std::thread;

const THREADS: usize = 4;

#[test]
fn test_shared_engine_serializes_requests_across_threads() {
    let config = config_with_latency(5);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let shared = SharedEngine::new(HardwareSqrt::new(p.coprocessor));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let mut engine = shared.clone();
            thread::spawn(move || {
                let mut vector = TestVector::perfect_squares();
                for sample in vector.samples_mut() {
                    sample.root = engine.compute(sample.input);
                }
                vector
            })
        })
        .collect();

    for handle in handles {
        let vector = handle.join().expect("worker panicked");
        assert!(vector.validate().is_empty());
        assert_eq!(vector.checksum(), 19_900);
    }

    assert_eq!(board.coprocessor_requests(), (THREADS * SAMPLE_COUNT) as u64);
    assert_eq!(board.protocol_violations(), 0);
}

#[test]
fn test_threads_get_their_own_results() {
    let config = config_with_latency(2);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let shared = SharedEngine::new(HardwareSqrt::new(p.coprocessor));

    // Each thread works a disjoint input range so a crossed result would show.
    let handles: Vec<_> = (0..THREADS as u32)
        .map(|t| {
            let mut engine = shared.clone();
            thread::spawn(move || {
                let mut reference = SoftwareSqrt;
                (t * 1_000_000..t * 1_000_000 + 500)
                    .filter(|&v| engine.compute(v) != reference.compute(v))
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("worker panicked"), 0);
    }
    assert_eq!(board.protocol_violations(), 0);
}
