//! Cross-validation of the two engines.
//!
//! # Acceptance Criteria
//!
//! - The coprocessor and the software recurrence agree on every test input
//! - Both agree at the edges of the 32-bit input range
//! - A corrupted root is reported by index and stops switch mirroring

use super::common::{
    config_with_latency, hardware_driver, peripherals, run_to_lines, software_driver, wall_board,
};
use sqrtbench_common::config::IdlePolicy;
use sqrtbench_common::state::BenchState;
use sqrtbench_core::engine::{cross_check, HardwareSqrt, SoftwareSqrt};
use sqrtbench_core::vector::{TestVector, SAMPLE_COUNT};

#[test]
fn test_hardware_and_software_agree_on_test_vector() {
    let config = config_with_latency(3);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let mut hardware = HardwareSqrt::new(p.coprocessor);

    let vector = TestVector::perfect_squares();
    let diffs = cross_check(&mut SoftwareSqrt, &mut hardware, vector.inputs());
    assert!(diffs.is_empty(), "disagreements: {diffs:?}");
    assert_eq!(hardware.requests(), SAMPLE_COUNT as u64);
    assert_eq!(board.protocol_violations(), 0);
}

#[test]
fn test_engines_agree_at_range_edges() {
    let config = config_with_latency(0);
    let board = wall_board(&config);
    let p = peripherals(&board, &config);
    let mut hardware = HardwareSqrt::new(p.coprocessor);

    let edges: [u32; 9] = [
        0,
        1,
        2,
        3,
        4,
        65_535 * 65_535,
        65_535 * 65_535 + 1,
        u32::MAX - 1,
        u32::MAX,
    ];
    let diffs = cross_check(&mut SoftwareSqrt, &mut hardware, edges);
    assert!(diffs.is_empty(), "disagreements: {diffs:?}");
}

#[test]
fn test_both_engines_report_identical_results() {
    let config = config_with_latency(2);

    let hw_board = wall_board(&config);
    let mut hw = hardware_driver(&hw_board, &config);
    let (hw_report, hw_lines) = run_to_lines(&mut hw);

    let sw_board = wall_board(&config);
    let mut sw = software_driver(&sw_board, &config);
    let (sw_report, sw_lines) = run_to_lines(&mut sw);

    assert!(hw_report.passed());
    assert!(sw_report.passed());
    assert_eq!(hw_report.checksum, 19_900);
    assert_eq!(hw_report.checksum, sw_report.checksum);
    assert_eq!(hw.vector(), sw.vector());

    // Timing differs; the checksum line does not.
    assert_eq!(hw_lines.last(), Some(&"restot: 19900".to_string()));
    assert_eq!(hw_lines.last(), sw_lines.last());
}

#[test]
fn test_seeded_corruption_is_reported_and_blocks_mirroring() {
    let mut config = config_with_latency(1);
    config.benchmark.repeats = 1;
    config.benchmark.idle = IdlePolicy::OnPass;
    let board = wall_board(&config);
    let mut driver = hardware_driver(&board, &config);

    driver.populate().unwrap();
    driver.measure().unwrap();
    driver.vector_mut().samples_mut()[42].root = 7;

    let mut lines = Vec::new();
    let report = driver.report_to(&mut lines).unwrap();
    assert_eq!(report.mismatch_count(), 1);
    assert_eq!(lines[0], "Error in computation of 42");
    assert!(lines[1].starts_with("t1: "));
    assert!(lines[1].ends_with(", errors: 1"));
    assert_eq!(lines[2], format!("restot: {}", 19_900 - 42 + 7));

    board.set_switches(0x3FF);
    driver.idle(Some(10)).unwrap();
    assert_eq!(driver.state(), BenchState::Idle);
    assert_eq!(board.leds(), 0, "LEDs must stay dark after a failed run");
}

#[test]
fn test_validation_disabled_omits_error_count() {
    let mut config = config_with_latency(0);
    config.benchmark.validate = false;
    config.benchmark.repeats = 2;
    let board = wall_board(&config);
    let mut driver = software_driver(&board, &config);

    let (report, lines) = run_to_lines(&mut driver);
    assert!(report.mismatches.is_none());
    assert_eq!(lines.len(), 2);
    assert!(!lines[0].contains("errors"));
}
