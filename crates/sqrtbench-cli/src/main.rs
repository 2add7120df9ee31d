//! sqrtbench entry point.
//!
//! Loads the configuration, opens the register bus, runs the benchmark once, and
//! then stays in the idle loop mirroring switches to LEDs.

mod console;
mod platform;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use sqrtbench_common::config::{EngineKind, HarnessConfig};
use sqrtbench_core::driver::{BenchmarkDriver, DriverSettings};
use sqrtbench_core::engine::{cross_check, HardwareSqrt, SoftwareSqrt, SquareRootEngine};
use sqrtbench_core::vector::TestVector;
use sqrtbench_hal::{Peripherals, RegisterBus};
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::console::Console;
use crate::platform::Board;

/// Engine selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineArg {
    /// Digit recurrence on the CPU.
    Software,
    /// Memory-mapped coprocessor.
    Hardware,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Software => EngineKind::Software,
            EngineArg::Hardware => EngineKind::Hardware,
        }
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "sqrtbench",
    about = "Integer square-root microbenchmark - software recurrence vs. hardware coprocessor",
    version,
    long_about = None
)]
struct Args {
    /// Path to a harness configuration file (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Engine to time (overrides config file).
    #[arg(long, short = 'e', value_enum)]
    engine: Option<EngineArg>,

    /// Passes over the test vector (overrides config file).
    #[arg(long, short = 'r')]
    repeats: Option<u32>,

    /// Skip result validation.
    #[arg(long)]
    no_validate: bool,

    /// Compare hardware against software on the test vector before timing.
    #[arg(long)]
    cross_check: bool,

    /// Idle loop iterations after the report (0 = run forever).
    #[arg(long, default_value = "0")]
    idle_cycles: u64,

    /// Print the report as JSON instead of console lines.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "Hello from sqrtbench");

    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    info!(
        engine = %config.benchmark.engine,
        repeats = config.benchmark.repeats,
        bus = ?config.platform.bus,
        "Configuration loaded"
    );

    let board = Board::open(&config).context("Failed to open register bus")?;
    let idle_cycles = (args.idle_cycles > 0).then_some(args.idle_cycles);
    let mut console = Console::new(args.json);

    match board {
        Board::Simulated(bus) => {
            run_benchmark(bus, &config, args.cross_check, &mut console, idle_cycles)
        }
        #[cfg(all(feature = "mmio", target_os = "linux"))]
        Board::Mmio(bus) => {
            run_benchmark(bus, &config, args.cross_check, &mut console, idle_cycles)
        }
    }
}

/// Initialize logging with the specified log level.
fn init_logging(level: &str) {
    let filter = format!(
        "sqrtbench={},sqrtbench_core={},sqrtbench_hal={},sqrtbench_common={}",
        level, level, level, level
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults.
///
/// Resolution priority (first existing file wins):
/// 1. Command-line `--config` argument
/// 2. `SQRTBENCH_CONFIG_PATH` environment variable
/// 3. `/etc/sqrtbench/config.toml` (system path)
/// 4. `config/default.toml` (local development)
/// 5. Built-in defaults
fn load_config(args: &Args) -> Result<HarnessConfig> {
    if let Some(config_path) = &args.config {
        info!(?config_path, "Loading config from command-line argument");
        return HarnessConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path));
    }

    if let Ok(env_path) = std::env::var("SQRTBENCH_CONFIG_PATH") {
        let config_path = PathBuf::from(&env_path);
        if config_path.exists() {
            info!(?config_path, "Loading config from SQRTBENCH_CONFIG_PATH");
            return HarnessConfig::from_file(&config_path).with_context(|| {
                format!("Failed to load config from SQRTBENCH_CONFIG_PATH={:?}", env_path)
            });
        }
        warn!(
            path = %env_path,
            "SQRTBENCH_CONFIG_PATH set but file does not exist, checking other locations"
        );
    }

    for path in ["/etc/sqrtbench/config.toml", "config/default.toml"] {
        let config_path = PathBuf::from(path);
        if config_path.exists() {
            info!(?config_path, "Loading config from file");
            return HarnessConfig::from_file(&config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path));
        }
    }

    info!("No config file found, using built-in defaults");
    Ok(HarnessConfig::default())
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut HarnessConfig, args: &Args) {
    if let Some(engine) = args.engine {
        config.benchmark.engine = engine.into();
    }
    if let Some(repeats) = args.repeats {
        config.benchmark.repeats = repeats;
    }
    if args.no_validate {
        config.benchmark.validate = false;
    }
}

/// Split the bus, pick the engine, and drive the benchmark to the idle loop.
fn run_benchmark<B: RegisterBus + Clone>(
    bus: B,
    config: &HarnessConfig,
    cross_check_first: bool,
    console: &mut Console,
    idle_cycles: Option<u64>,
) -> Result<()> {
    let p = Peripherals::new(bus, &config.registers).context("Failed to assign register blocks")?;
    let settings = DriverSettings::from_config(config);

    match config.benchmark.engine {
        EngineKind::Software => {
            if cross_check_first {
                warn!("--cross-check only applies to the hardware engine");
            }
            let driver = BenchmarkDriver::init(p.timer, p.io, SoftwareSqrt, settings)?;
            drive(driver, console, idle_cycles)
        }
        EngineKind::Hardware => {
            let mut engine = HardwareSqrt::new(p.coprocessor);
            if cross_check_first {
                verify_against_software(&mut engine)?;
            }
            let driver = BenchmarkDriver::init(p.timer, p.io, engine, settings)?;
            drive(driver, console, idle_cycles)
        }
    }
}

/// Compare `engine` with the software reference over the test vector.
fn verify_against_software<E: SquareRootEngine>(engine: &mut E) -> Result<()> {
    let vector = TestVector::perfect_squares();
    let diffs = cross_check(&mut SoftwareSqrt, engine, vector.inputs());
    if diffs.is_empty() {
        info!(engine = engine.name(), "Cross-check passed");
        return Ok(());
    }
    for (input, expected, actual) in &diffs {
        error!(input, expected, actual, "Cross-check mismatch");
    }
    bail!("{} engine disagrees with software on {} inputs", engine.name(), diffs.len())
}

/// Run the benchmark phases, then idle.
fn drive<B: RegisterBus, E: SquareRootEngine>(
    mut driver: BenchmarkDriver<B, E>,
    console: &mut Console,
    idle_cycles: Option<u64>,
) -> Result<()> {
    let report = driver.run(console).context("Benchmark failed")?;
    if let Some(ns) = report.elapsed_ns {
        info!(
            elapsed_us = ns / 1_000,
            per_call_ns = ns / (u64::from(report.repeats) * report.samples as u64),
            "Computation time"
        );
    }

    let cycles = driver.idle(idle_cycles)?;
    info!(cycles, "Idle loop finished");
    Ok(())
}
