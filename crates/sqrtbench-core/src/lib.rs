//! Square-root microbenchmark core.
//!
//! - **Timer** ([`timer`]): snapshot reads and wraparound-corrected intervals
//! - **Engines** ([`engine`]): software digit recurrence and the coprocessor handshake
//! - **Test vector** ([`vector`]): the 200 perfect squares and their validation
//! - **Driver** ([`driver`]): INIT → POPULATE → MEASURE → REPORT → IDLE
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use sqrtbench_common::config::HarnessConfig;
//! use sqrtbench_core::driver::{BenchmarkDriver, DriverSettings};
//! use sqrtbench_core::engine::SoftwareSqrt;
//! use sqrtbench_hal::{Peripherals, SimulatedBoard};
//!
//! let config = HarnessConfig::default();
//! let board = Arc::new(SimulatedBoard::new(config.registers, &config.simulation));
//! let p = Peripherals::new(Arc::clone(&board), &config.registers).unwrap();
//!
//! let settings = DriverSettings::from_config(&config);
//! let mut driver = BenchmarkDriver::init(p.timer, p.io, SoftwareSqrt, settings).unwrap();
//! let mut lines: Vec<String> = Vec::new();
//! let report = driver.run(&mut lines).unwrap();
//!
//! assert_eq!(report.mismatch_count(), 0);
//! assert!(lines.iter().any(|l| l.starts_with("t1: ")));
//! ```

pub mod driver;
pub mod engine;
pub mod report;
pub mod timer;
pub mod vector;

pub use driver::{BenchmarkDriver, DriverSettings};
pub use engine::{HardwareSqrt, SharedEngine, SoftwareSqrt, SquareRootEngine};
pub use report::{BenchReport, Measurement, ReportSink};
pub use timer::{Timer, UnconfiguredTimer};
pub use vector::{Mismatch, Sample, TestVector, SAMPLE_COUNT};
