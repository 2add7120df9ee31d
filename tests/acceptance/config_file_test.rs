//! Configuration files driving complete runs.
//!
//! # Acceptance Criteria
//!
//! - The shipped `config/default.toml` matches the built-in defaults
//! - A file selecting the hardware engine runs it end to end
//! - Invalid register maps are rejected before any register is touched

use super::common::{hardware_driver, run_to_lines, wall_board};
use sqrtbench_common::config::{EngineKind, HarnessConfig, IdlePolicy, RegisterMap};
use sqrtbench_common::ConfigError;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_shipped_default_config_matches_builtin_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let shipped = HarnessConfig::from_file(&path).expect("shipped config loads");
    let builtin = HarnessConfig::default();

    assert_eq!(shipped.registers, builtin.registers);
    assert_eq!(shipped.benchmark.engine, builtin.benchmark.engine);
    assert_eq!(shipped.benchmark.repeats, builtin.benchmark.repeats);
    assert_eq!(shipped.benchmark.idle, builtin.benchmark.idle);
    assert_eq!(shipped.timer.clock_hz, builtin.timer.clock_hz);
    assert_eq!(shipped.simulation.period, builtin.simulation.period);
    assert_eq!(shipped.simulation.tick, builtin.simulation.tick);
}

#[test]
fn test_hardware_run_from_config_file() {
    let file = write_config(
        r#"
[benchmark]
engine = "hardware"
repeats = 3
idle = "always"

[simulation]
tick = "1ns"
coprocessor_latency = 2
switches = 0x0F0
"#,
    );

    let config = HarnessConfig::from_file(file.path()).expect("config loads");
    assert_eq!(config.benchmark.engine, EngineKind::Hardware);
    assert_eq!(config.benchmark.idle, IdlePolicy::Always);
    assert_eq!(config.simulation.tick, Duration::from_nanos(1));

    let board = wall_board(&config);
    let mut driver = hardware_driver(&board, &config);
    let (report, lines) = run_to_lines(&mut driver);

    assert_eq!(report.engine, "hardware");
    assert_eq!(report.repeats, 3);
    assert!(report.passed());
    assert_eq!(lines.len(), 2);
    assert!(report.elapsed_ns.is_some());

    driver.idle(Some(3)).unwrap();
    assert_eq!(board.leds(), 0x0F0);
}

#[test]
fn test_overlapping_registers_are_rejected() {
    let file = write_config(
        r#"
[registers]
switches = 0x81109030
leds = 0x81109030
"#,
    );

    let err = HarnessConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    assert!(err.to_string().contains("overlaps"));
}

#[test]
fn test_unaligned_register_is_rejected() {
    let map = RegisterMap {
        leds: 0x8110_9031,
        ..RegisterMap::default()
    };
    assert!(map.validate().is_err());
}

#[test]
fn test_zero_repeats_rejected_by_config_validation() {
    let file = write_config("[benchmark]\nrepeats = 0\n");
    assert!(HarnessConfig::from_file(file.path()).is_err());
}
