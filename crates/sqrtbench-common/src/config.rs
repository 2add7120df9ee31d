//! Configuration structures for the benchmark harness.
//!
//! Supports TOML deserialization with defaults matching the reference board
//! (interval timer at `0x8110_9000`, 50 MHz clock, 100 repeats).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// What to run and how often.
    pub benchmark: BenchmarkConfig,

    /// Physical register addresses.
    pub registers: RegisterMap,

    /// Timer clock description.
    pub timer: TimerConfig,

    /// Which register bus to use.
    pub platform: PlatformConfig,

    /// Behavior of the simulated board.
    pub simulation: SimulationConfig,
}

/// Square-root implementation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Digit-recurrence algorithm on the CPU.
    #[default]
    Software,
    /// Memory-mapped square-root coprocessor.
    Hardware,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Software => write!(f, "software"),
            Self::Hardware => write!(f, "hardware"),
        }
    }
}

/// When the terminal loop mirrors switches to LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdlePolicy {
    /// Mirror only if validation found no mismatches.
    #[default]
    OnPass,
    /// Mirror unconditionally.
    Always,
    /// Leave the LEDs alone.
    Never,
}

impl IdlePolicy {
    /// Whether mirroring is enabled for a run with `mismatches` validation failures.
    #[must_use]
    pub fn mirrors(self, mismatches: usize) -> bool {
        match self {
            Self::OnPass => mismatches == 0,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Benchmark parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Engine to time.
    pub engine: EngineKind,

    /// Number of passes over the test vector between the two timestamps.
    pub repeats: u32,

    /// Compare results against their expected roots after measuring.
    pub validate: bool,

    /// Measure the cost of two back-to-back snapshot reads before the batch.
    pub calibrate: bool,

    /// Terminal loop behavior.
    pub idle: IdlePolicy,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Software,
            repeats: 100,
            validate: true,
            calibrate: true,
            idle: IdlePolicy::OnPass,
        }
    }
}

/// Interval timer register block, addressed by its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerRegisters {
    /// Base address; status sits here and the other registers follow at fixed offsets.
    pub base: u32,
}

impl Default for TimerRegisters {
    fn default() -> Self {
        Self { base: 0x8110_9000 }
    }
}

/// Coprocessor channel registers. Each is its own PIO, so each has its own address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoprocessorRegisters {
    /// Operand input (software writes).
    pub operand: u32,
    /// Start trigger (software writes, edge-sensitive).
    pub start: u32,
    /// Completion flag (hardware writes).
    pub done: u32,
    /// Result output (hardware writes).
    pub result: u32,
}

impl Default for CoprocessorRegisters {
    fn default() -> Self {
        Self {
            operand: 0x8110_9040,
            start: 0x8110_9050,
            done: 0x8110_9060,
            result: 0x8110_9070,
        }
    }
}

/// Physical addresses of every register the harness touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterMap {
    /// Interval timer block.
    pub timer: TimerRegisters,
    /// Switch input PIO.
    pub switches: u32,
    /// LED output PIO.
    pub leds: u32,
    /// Square-root coprocessor.
    pub coprocessor: CoprocessorRegisters,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            timer: TimerRegisters::default(),
            switches: 0x8110_9020,
            leds: 0x8110_9030,
            coprocessor: CoprocessorRegisters::default(),
        }
    }
}

/// Offsets inside the interval timer block.
pub mod timer_offsets {
    /// Status register (TO, RUN).
    pub const STATUS: u32 = 0x00;
    /// Control register (ITO, CONT, START, STOP).
    pub const CONTROL: u32 = 0x04;
    /// Period, low 16 bits.
    pub const PERIOD_LOW: u32 = 0x08;
    /// Period, high 16 bits.
    pub const PERIOD_HIGH: u32 = 0x0C;
    /// Snapshot, low 16 bits; any write latches the counter.
    pub const SNAPSHOT_LOW: u32 = 0x10;
    /// Snapshot, high 16 bits.
    pub const SNAPSHOT_HIGH: u32 = 0x14;
    /// Bytes spanned by the block.
    pub const SPAN: u32 = 0x18;
}

impl RegisterMap {
    /// Every register address with a short name, in map order.
    #[must_use]
    pub fn addresses(&self) -> Vec<(&'static str, u32)> {
        let t = self.timer.base;
        vec![
            ("timer.status", t + timer_offsets::STATUS),
            ("timer.control", t + timer_offsets::CONTROL),
            ("timer.period_low", t + timer_offsets::PERIOD_LOW),
            ("timer.period_high", t + timer_offsets::PERIOD_HIGH),
            ("timer.snapshot_low", t + timer_offsets::SNAPSHOT_LOW),
            ("timer.snapshot_high", t + timer_offsets::SNAPSHOT_HIGH),
            ("switches", self.switches),
            ("leds", self.leds),
            ("coprocessor.operand", self.coprocessor.operand),
            ("coprocessor.start", self.coprocessor.start),
            ("coprocessor.done", self.coprocessor.done),
            ("coprocessor.result", self.coprocessor.result),
        ]
    }

    /// Smallest window `(base, len)` covering every register.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the timer block or the window length
    /// does not fit in the 32-bit address space.
    pub fn window(&self) -> Result<(u32, u32), ConfigError> {
        if self.timer.base.checked_add(timer_offsets::SPAN).is_none() {
            return Err(ConfigError::Invalid(format!(
                "timer block at {:#010x} runs past the end of the address space",
                self.timer.base
            )));
        }
        let addrs = self.addresses();
        let lo = addrs.iter().map(|(_, a)| *a).min().unwrap_or(0);
        let hi = addrs.iter().map(|(_, a)| *a).max().unwrap_or(0);
        let len = (hi - lo).checked_add(4).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "registers from {lo:#010x} to {hi:#010x} span more than the address space"
            ))
        })?;
        Ok((lo, len))
    }

    /// Check that the map fits one window, is word aligned, and has no two
    /// registers at the same address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending register.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.window()?;
        let mut seen = HashSet::new();
        for (name, addr) in self.addresses() {
            if addr % 4 != 0 {
                return Err(ConfigError::Invalid(format!(
                    "register {name} at {addr:#010x} is not word aligned"
                )));
            }
            if !seen.insert(addr) {
                return Err(ConfigError::Invalid(format!(
                    "register {name} at {addr:#010x} overlaps another register"
                )));
            }
        }
        Ok(())
    }
}

/// Timer clock description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Counter clock in Hz; 0 leaves reports in raw ticks only.
    pub clock_hz: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            clock_hz: 50_000_000,
        }
    }
}

/// Register bus backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    /// In-process model of the board.
    #[default]
    Simulated,
    /// Physical registers mapped from `/dev/mem`.
    Mmio,
}

/// Platform selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Register bus backend.
    pub bus: BusKind,
}

/// Simulated board parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Counter period in ticks, loaded into the period registers.
    pub period: u32,

    /// Duration of one counter tick.
    #[serde(with = "humantime_serde")]
    pub tick: Duration,

    /// Number of `done` polls the coprocessor takes to finish a request.
    pub coprocessor_latency: u32,

    /// Initial switch word.
    pub switches: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            period: u32::MAX,
            tick: Duration::from_nanos(20),
            coprocessor_latency: 8,
            switches: 0,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails validation.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Check semantic constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.benchmark.repeats == 0 {
            return Err(ConfigError::Invalid("benchmark.repeats must be at least 1".into()));
        }
        if self.simulation.tick.is_zero() {
            return Err(ConfigError::Invalid("simulation.tick must be non-zero".into()));
        }
        self.registers.validate()
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Well-formed but unusable configuration.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Serde helper module for `Duration` using humantime format.
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
