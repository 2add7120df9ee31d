//! Common utilities for acceptance tests.
//!
//! Provides helpers for:
//! - Building simulated boards with a chosen clock and coprocessor latency
//! - Splitting a board into peripherals
//! - Running a complete benchmark and collecting its console lines

#![allow(dead_code)] // Not every helper is used by every test module

use sqrtbench_common::config::{HarnessConfig, SimulationConfig};
use sqrtbench_core::driver::{BenchmarkDriver, DriverSettings};
use sqrtbench_core::engine::{HardwareSqrt, SoftwareSqrt};
use sqrtbench_core::report::BenchReport;
use sqrtbench_hal::{Peripherals, SimulatedBoard};
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to a simulated board.
pub type Board = Arc<SimulatedBoard>;

/// Default configuration with a 1 ns tick and the given coprocessor latency.
pub fn config_with_latency(latency: u32) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.simulation = SimulationConfig {
        tick: Duration::from_nanos(1),
        coprocessor_latency: latency,
        ..SimulationConfig::default()
    };
    config
}

/// Wall-clock board built from `config`.
pub fn wall_board(config: &HarnessConfig) -> Board {
    Arc::new(SimulatedBoard::new(config.registers, &config.simulation))
}

/// Manually clocked board built from `config`.
pub fn manual_board(config: &HarnessConfig) -> Board {
    Arc::new(SimulatedBoard::with_manual_clock(
        config.registers,
        &config.simulation,
    ))
}

/// Split `board` into its register blocks.
pub fn peripherals(board: &Board, config: &HarnessConfig) -> Peripherals<Board> {
    Peripherals::new(Arc::clone(board), &config.registers).expect("default map is valid")
}

/// Driver timing the coprocessor on `board`.
pub fn hardware_driver(
    board: &Board,
    config: &HarnessConfig,
) -> BenchmarkDriver<Board, HardwareSqrt<Board>> {
    let p = peripherals(board, config);
    let engine = HardwareSqrt::new(p.coprocessor);
    BenchmarkDriver::init(p.timer, p.io, engine, DriverSettings::from_config(config))
        .expect("init succeeds")
}

/// Driver timing the software recurrence on `board`.
pub fn software_driver(
    board: &Board,
    config: &HarnessConfig,
) -> BenchmarkDriver<Board, SoftwareSqrt> {
    let p = peripherals(board, config);
    BenchmarkDriver::init(p.timer, p.io, SoftwareSqrt, DriverSettings::from_config(config))
        .expect("init succeeds")
}

/// Run a complete benchmark and return the report with its console lines.
pub fn run_to_lines<B, E>(driver: &mut BenchmarkDriver<B, E>) -> (BenchReport, Vec<String>)
where
    B: sqrtbench_hal::RegisterBus,
    E: sqrtbench_core::engine::SquareRootEngine,
{
    let mut lines = Vec::new();
    let report = driver.run(&mut lines).expect("benchmark runs");
    (report, lines)
}
