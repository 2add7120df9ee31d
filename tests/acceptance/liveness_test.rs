//! Blocking behavior of the coprocessor handshake.
//!
//! # Acceptance Criteria
//!
//! - A caller waits for as long as the coprocessor holds `done` low
//! - Releasing the coprocessor lets the caller finish with the right result
//! - Callers queued behind a stalled request wait their turn

use super::common::{config_with_latency, peripherals, wall_board};
use sqrtbench_core::engine::{HardwareSqrt, SharedEngine, SquareRootEngine};
use std::thread;
use std::time::Duration;

const STALL: Duration = Duration::from_millis(50);

#[test]
fn test_stalled_coprocessor_blocks_caller_until_released() {
    let config = config_with_latency(1);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let mut engine = HardwareSqrt::new(p.coprocessor);

    board.stall_coprocessor();
    let handle = thread::spawn(move || engine.compute(1_000_000));

    thread::sleep(STALL);
    assert!(!handle.is_finished(), "caller returned while done was low");
    assert_eq!(board.coprocessor_requests(), 1);

    board.release_coprocessor();
    assert_eq!(handle.join().expect("caller panicked"), 1_000);
    assert_eq!(board.protocol_violations(), 0);
}

#[test]
fn test_queued_callers_wait_behind_stalled_request() {
    let config = config_with_latency(1);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let shared = SharedEngine::new(HardwareSqrt::new(p.coprocessor));

    board.stall_coprocessor();
    let handles: Vec<_> = [49_u32, 81]
        .into_iter()
        .map(|input| {
            let mut engine = shared.clone();
            thread::spawn(move || engine.compute(input))
        })
        .collect();

    thread::sleep(STALL);
    assert!(handles.iter().all(|h| !h.is_finished()));
    // Only the lock holder has reached the coprocessor.
    assert_eq!(board.coprocessor_requests(), 1);

    board.release_coprocessor();
    let mut roots: Vec<u32> = handles
        .into_iter()
        .map(|h| h.join().expect("caller panicked"))
        .collect();
    roots.sort_unstable();
    assert_eq!(roots, vec![7, 9]);
    assert_eq!(board.coprocessor_requests(), 2);
    assert_eq!(board.protocol_violations(), 0);
}
