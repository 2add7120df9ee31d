//! Benchmark driver.
//!
//! Runs the fixed sequence:
//! 1. INIT: configure the timer and capture its period
//! 2. POPULATE: build the perfect-square vector
//! 3. MEASURE: snapshot, compute the vector `repeats` times, snapshot
//! 4. REPORT: validate and hand the report to the console
//! 5. IDLE: mirror switches to LEDs, forever unless bounded
//!
//! Each phase method checks the state machine, so calling them out of order is an
//! error rather than a silently wrong measurement.

use crate::engine::SquareRootEngine;
use crate::report::{BenchReport, Measurement, ReportSink};
use crate::timer::{Timer, UnconfiguredTimer};
use crate::vector::{TestVector, SAMPLE_COUNT};
use sqrtbench_common::config::{HarnessConfig, IdlePolicy};
use sqrtbench_common::error::{BenchError, BenchResult};
use sqrtbench_common::state::{BenchState, StateMachine};
use sqrtbench_common::ticks::ticks_to_duration;
use sqrtbench_hal::timer::TimerBlock;
use sqrtbench_hal::{DiscreteIo, RegisterBus};
use std::hint::black_box;
use tracing::{debug, info, warn};

/// Per-run parameters, taken from [`HarnessConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverSettings {
    /// Passes over the vector between the two snapshots.
    pub repeats: u32,
    /// Validate the results.
    pub validate: bool,
    /// Measure snapshot overhead first.
    pub calibrate: bool,
    /// Terminal loop behavior.
    pub idle: IdlePolicy,
    /// Timer clock for tick conversion; 0 if unknown.
    pub clock_hz: u64,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::from_config(&HarnessConfig::default())
    }
}

impl DriverSettings {
    /// Extract the driver's parameters from the harness configuration.
    #[must_use]
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            repeats: config.benchmark.repeats,
            validate: config.benchmark.validate,
            calibrate: config.benchmark.calibrate,
            idle: config.benchmark.idle,
            clock_hz: config.timer.clock_hz,
        }
    }
}

/// Sequential benchmark over one engine.
pub struct BenchmarkDriver<B: RegisterBus, E: SquareRootEngine> {
    state: StateMachine,
    timer: Timer<B>,
    io: DiscreteIo<B>,
    engine: E,
    settings: DriverSettings,
    vector: TestVector,
    measurement: Option<Measurement>,
    report: Option<BenchReport>,
}

impl<B: RegisterBus, E: SquareRootEngine> std::fmt::Debug for BenchmarkDriver<B, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkDriver")
            .field("state", &self.state.state())
            .field("engine", &self.engine.name())
            .field("settings", &self.settings)
            .field("measurement", &self.measurement)
            .finish_non_exhaustive()
    }
}

impl<B: RegisterBus, E: SquareRootEngine> BenchmarkDriver<B, E> {
    /// INIT: configure the timer, capture its period, and take the engine.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] if `settings.repeats` is zero.
    pub fn init(
        timer: TimerBlock<B>,
        io: DiscreteIo<B>,
        engine: E,
        settings: DriverSettings,
    ) -> BenchResult<Self> {
        if settings.repeats == 0 {
            return Err(BenchError::Config("repeats must be at least 1".into()));
        }

        let mut state = StateMachine::new();
        state.transition(BenchState::Init)?;

        let timer = UnconfiguredTimer::new(timer).configure();
        info!(
            engine = engine.name(),
            period = %timer.period(),
            repeats = settings.repeats,
            "benchmark initialized"
        );

        Ok(Self {
            state,
            timer,
            io,
            engine,
            settings,
            vector: TestVector::default(),
            measurement: None,
            report: None,
        })
    }

    /// Current phase.
    #[must_use]
    pub fn state(&self) -> BenchState {
        self.state.state()
    }

    /// The running timer.
    #[must_use]
    pub fn timer(&self) -> &Timer<B> {
        &self.timer
    }

    /// The test vector in its current state.
    #[must_use]
    pub fn vector(&self) -> &TestVector {
        &self.vector
    }

    /// Mutable vector access between MEASURE and REPORT, for fault injection.
    pub fn vector_mut(&mut self) -> &mut TestVector {
        &mut self.vector
    }

    /// The report, once REPORT has run.
    #[must_use]
    pub fn report(&self) -> Option<&BenchReport> {
        self.report.as_ref()
    }

    /// POPULATE: fill the vector with `j * j`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] unless called right after INIT.
    pub fn populate(&mut self) -> BenchResult<()> {
        self.state.transition(BenchState::Populate)?;
        self.vector.fill_perfect_squares();
        debug!(samples = SAMPLE_COUNT, "test vector populated");
        Ok(())
    }

    /// MEASURE: time `repeats` passes of the engine over the vector.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] unless called right after POPULATE.
    pub fn measure(&mut self) -> BenchResult<Measurement> {
        self.state.transition(BenchState::Measure)?;

        let timer_overhead = self.settings.calibrate.then(|| {
            let first = self.timer.read_tick();
            let second = self.timer.read_tick();
            self.timer.elapsed(first, second)
        });

        let before = self.timer.read_tick();
        for _ in 0..self.settings.repeats {
            for sample in self.vector.samples_mut() {
                sample.root = black_box(self.engine.compute(black_box(sample.input)));
            }
        }
        let after = self.timer.read_tick();

        let measurement = Measurement {
            before,
            after,
            elapsed: self.timer.elapsed(before, after),
            timer_overhead,
        };
        info!(
            engine = self.engine.name(),
            elapsed = %measurement.elapsed,
            overhead = ?measurement.timer_overhead.map(|t| t.get()),
            "batch measured"
        );
        self.measurement = Some(measurement);
        Ok(measurement)
    }

    /// REPORT: validate the results and hand the report to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] unless called right after MEASURE.
    pub fn report_to<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> BenchResult<BenchReport> {
        let measurement = match (self.state.state(), self.measurement) {
            (BenchState::Measure, Some(m)) => m,
            _ => {
                return Err(BenchError::InvalidStateTransition {
                    from: self.state.state().to_string(),
                    to: BenchState::Report.to_string(),
                })
            }
        };
        self.state.transition(BenchState::Report)?;

        let mismatches = self.settings.validate.then(|| self.vector.validate());
        for m in mismatches.iter().flatten() {
            warn!(
                index = m.index,
                expected = m.expected,
                actual = m.actual,
                "validation mismatch"
            );
        }

        let elapsed_ns = ticks_to_duration(measurement.elapsed, self.settings.clock_hz)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX));

        let report = BenchReport {
            engine: self.engine.name(),
            repeats: self.settings.repeats,
            samples: SAMPLE_COUNT,
            period: self.timer.period(),
            measurement,
            elapsed_ns,
            checksum: self.vector.checksum(),
            mismatches,
        };

        info!(
            mismatches = report.mismatch_count(),
            checksum = report.checksum,
            "benchmark complete"
        );
        sink.emit(&report);
        self.report = Some(report.clone());
        Ok(report)
    }

    /// POPULATE, MEASURE, and REPORT in one call.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] unless called right after INIT.
    pub fn run<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> BenchResult<BenchReport> {
        self.populate()?;
        self.measure()?;
        self.report_to(sink)
    }

    /// Whether the idle loop copies switches to LEDs for this run.
    #[must_use]
    pub fn idle_mirrors(&self) -> bool {
        let mismatches = self.report.as_ref().map_or(0, BenchReport::mismatch_count);
        self.settings.idle.mirrors(mismatches)
    }

    /// IDLE: the terminal loop.
    ///
    /// With `max_cycles == None` this never returns. A bound exists for tests and
    /// for bounded CLI runs; it returns the number of loop iterations executed.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidStateTransition`] unless called right after REPORT.
    pub fn idle(&mut self, max_cycles: Option<u64>) -> BenchResult<u64> {
        self.state.transition(BenchState::Idle)?;
        let mirror = self.idle_mirrors();
        info!(mirror, ?max_cycles, "entering idle loop");

        let mut cycles = 0u64;
        loop {
            if max_cycles.is_some_and(|max| cycles >= max) {
                return Ok(cycles);
            }
            if mirror {
                self.io.mirror();
            }
            cycles += 1;
            std::hint::spin_loop();
        }
    }
}
