//! In-process model of the benchmark board.
//!
//! Decodes the same register map as the hardware and models:
//!
//! - the interval timer: down-counting from the period, auto-reload with CONT,
//!   snapshot latched on any write to a snapshot register, RUN/TO status bits
//! - the switch and LED ports
//! - the square-root coprocessor: operand latched on the rising edge of `start`,
//!   `done` raised after a fixed number of polls, `done` cleared when `start` drops
//!
//! Time is either wall-clock (one tick per configured [`SimulationConfig::tick`]) or
//! manual, advanced explicitly with [`SimulatedBoard::advance_ticks`].
//!
//! The coprocessor counts handshake violations instead of corrupting state, so tests
//! can assert that a driver never issued a second request while one was outstanding.

use crate::bus::RegisterBus;
use crate::timer::{CONTROL_CONT, CONTROL_START, CONTROL_STOP, STATUS_RUN, STATUS_TO};
use sqrtbench_common::config::{timer_offsets, RegisterMap, SimulationConfig};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Source of counter ticks.
#[derive(Debug, Clone, Copy)]
enum TickSource {
    Wall { tick: Duration },
    Manual,
}

#[derive(Debug)]
struct SimTimer {
    source: TickSource,
    period: u32,
    control: u32,
    started_at: Option<Instant>,
    manual_ticks: u64,
    /// Counter value frozen by STOP.
    stopped_value: Option<u32>,
    snapshot: u32,
    timed_out: bool,
}

impl SimTimer {
    fn new(source: TickSource, period: u32) -> Self {
        Self {
            source,
            period,
            control: 0,
            started_at: None,
            manual_ticks: 0,
            stopped_value: None,
            snapshot: 0,
            timed_out: false,
        }
    }

    fn running(&self) -> bool {
        self.started_at.is_some()
    }

    fn ticks_since_start(&self) -> u64 {
        match (self.source, self.started_at) {
            (_, None) => 0,
            (TickSource::Manual, Some(_)) => self.manual_ticks,
            (TickSource::Wall { tick }, Some(start)) => {
                let ticks = start.elapsed().as_nanos() / tick.as_nanos().max(1);
                u64::try_from(ticks).unwrap_or(u64::MAX)
            }
        }
    }

    fn counter(&mut self) -> u32 {
        if let Some(value) = self.stopped_value {
            return value;
        }
        if !self.running() {
            return self.period;
        }
        let ticks = self.ticks_since_start();
        let reload = u64::from(self.period) + 1;
        if ticks >= reload {
            self.timed_out = true;
        }
        if self.control & CONTROL_CONT != 0 {
            // `ticks % reload` is at most `period`, so the difference fits in u32.
            self.period - u32::try_from(ticks % reload).unwrap_or(self.period)
        } else {
            self.period.saturating_sub(u32::try_from(ticks).unwrap_or(u32::MAX))
        }
    }

    fn write_control(&mut self, value: u32) {
        self.control = value;
        if value & CONTROL_STOP != 0 {
            if self.running() {
                self.stopped_value = Some(self.counter());
                self.started_at = None;
            }
        } else if value & CONTROL_START != 0 && !self.running() {
            self.started_at = Some(Instant::now());
            self.manual_ticks = 0;
            self.stopped_value = None;
        }
    }

    fn status(&mut self) -> u32 {
        // Refresh TO before reporting it.
        let _ = self.counter();
        let mut status = 0;
        if self.running() {
            status |= STATUS_RUN;
        }
        if self.timed_out {
            status |= STATUS_TO;
        }
        status
    }

    fn write_period_half(&mut self, high: bool, value: u32) {
        let value = value & 0xFFFF;
        self.period = if high {
            (self.period & 0xFFFF) | (value << 16)
        } else {
            (self.period & 0xFFFF_0000) | value
        };
        // A period write stops the counter and reloads it.
        self.started_at = None;
        self.stopped_value = None;
    }
}

/// Handshake state of the coprocessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Busy { remaining: u32, operand: u32 },
    Done,
}

#[derive(Debug)]
struct SimCoprocessor {
    latency: u32,
    operand: u32,
    start: bool,
    phase: Phase,
    result: u32,
    stalled: bool,
    requests: u64,
    violations: u64,
}

impl SimCoprocessor {
    fn new(latency: u32) -> Self {
        Self {
            latency,
            operand: 0,
            start: false,
            phase: Phase::Idle,
            result: 0,
            stalled: false,
            requests: 0,
            violations: 0,
        }
    }

    fn violation(&mut self, what: &str) {
        self.violations += 1;
        warn!(phase = ?self.phase, "coprocessor handshake violation: {what}");
    }

    fn write_operand(&mut self, value: u32) {
        if matches!(self.phase, Phase::Busy { .. }) {
            self.violation("operand written while a request is in flight");
        }
        self.operand = value;
    }

    fn write_start(&mut self, value: u32) {
        let level = value & 1 != 0;
        match (self.start, level) {
            (false, true) => {
                if self.phase == Phase::Idle {
                    self.requests += 1;
                    self.phase = Phase::Busy {
                        remaining: self.latency,
                        operand: self.operand,
                    };
                    trace!(operand = self.operand, "coprocessor request accepted");
                } else {
                    self.violation("start raised before the previous request was acknowledged");
                }
            }
            (true, false) => match self.phase {
                Phase::Done => self.phase = Phase::Idle,
                Phase::Busy { .. } => self.violation("start dropped before done"),
                Phase::Idle => {}
            },
            _ => {}
        }
        self.start = level;
    }

    fn read_done(&mut self) -> u32 {
        match self.phase {
            Phase::Idle => 0,
            Phase::Done => 1,
            Phase::Busy { .. } if self.stalled => 0,
            Phase::Busy { remaining: 0, operand } => {
                self.result = restoring_isqrt(operand);
                self.phase = Phase::Done;
                1
            }
            Phase::Busy { remaining, operand } => {
                self.phase = Phase::Busy {
                    remaining: remaining - 1,
                    operand,
                };
                0
            }
        }
    }
}

/// Bit-serial restoring square root, the algorithm the coprocessor implements.
///
/// Kept independent of the software engine so the two can cross-check each other.
#[must_use]
pub fn restoring_isqrt(value: u32) -> u32 {
    let mut remainder = value;
    let mut root = 0u32;
    let mut bit = 1u32 << 30;
    while bit > remainder {
        bit >>= 2;
    }
    while bit != 0 {
        if remainder >= root + bit {
            remainder -= root + bit;
            root = (root >> 1) + bit;
        } else {
            root >>= 1;
        }
        bit >>= 2;
    }
    root
}

/// Simulated board implementing [`RegisterBus`].
///
/// Share it as `Arc<SimulatedBoard>`: one clone goes to
/// [`Peripherals::new`](crate::Peripherals::new), another stays with the test
/// harness to drive switches, advance time, or inspect the coprocessor.
#[derive(Debug)]
pub struct SimulatedBoard {
    map: RegisterMap,
    timer: Mutex<SimTimer>,
    switches: AtomicU32,
    leds: AtomicU32,
    coprocessor: Mutex<SimCoprocessor>,
    bus_reads: AtomicU64,
    bus_writes: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimulatedBoard {
    /// Board whose timer follows the wall clock.
    #[must_use]
    pub fn new(map: RegisterMap, sim: &SimulationConfig) -> Self {
        Self::with_source(map, sim, TickSource::Wall { tick: sim.tick })
    }

    /// Board whose timer only moves on [`advance_ticks`](Self::advance_ticks).
    #[must_use]
    pub fn with_manual_clock(map: RegisterMap, sim: &SimulationConfig) -> Self {
        Self::with_source(map, sim, TickSource::Manual)
    }

    fn with_source(map: RegisterMap, sim: &SimulationConfig, source: TickSource) -> Self {
        debug!(
            period = sim.period,
            latency = sim.coprocessor_latency,
            ?source,
            "simulated board created"
        );
        Self {
            map,
            timer: Mutex::new(SimTimer::new(source, sim.period)),
            switches: AtomicU32::new(sim.switches),
            leds: AtomicU32::new(0),
            coprocessor: Mutex::new(SimCoprocessor::new(sim.coprocessor_latency)),
            bus_reads: AtomicU64::new(0),
            bus_writes: AtomicU64::new(0),
        }
    }

    /// Register map this board decodes.
    #[must_use]
    pub fn register_map(&self) -> &RegisterMap {
        &self.map
    }

    /// Advance a manual clock. Ignored while the timer is stopped or on a wall clock.
    pub fn advance_ticks(&self, ticks: u64) {
        let mut timer = lock(&self.timer);
        if timer.running() && matches!(timer.source, TickSource::Manual) {
            timer.manual_ticks = timer.manual_ticks.saturating_add(ticks);
        }
    }

    /// Whether the timer has been started.
    #[must_use]
    pub fn timer_running(&self) -> bool {
        lock(&self.timer).running()
    }

    /// Set the switch word seen by software.
    pub fn set_switches(&self, value: u32) {
        self.switches.store(value, Ordering::Release);
    }

    /// Last value software wrote to the LEDs.
    #[must_use]
    pub fn leds(&self) -> u32 {
        self.leds.load(Ordering::Acquire)
    }

    /// Hold the coprocessor busy: `done` stays low until
    /// [`release_coprocessor`](Self::release_coprocessor).
    pub fn stall_coprocessor(&self) {
        lock(&self.coprocessor).stalled = true;
    }

    /// Let a stalled coprocessor finish.
    pub fn release_coprocessor(&self) {
        lock(&self.coprocessor).stalled = false;
    }

    /// Requests accepted on a rising edge of `start`.
    #[must_use]
    pub fn coprocessor_requests(&self) -> u64 {
        lock(&self.coprocessor).requests
    }

    /// Handshake violations observed so far.
    #[must_use]
    pub fn protocol_violations(&self) -> u64 {
        lock(&self.coprocessor).violations
    }

    /// Total bus reads and writes, in that order.
    #[must_use]
    pub fn bus_accesses(&self) -> (u64, u64) {
        (
            self.bus_reads.load(Ordering::Relaxed),
            self.bus_writes.load(Ordering::Relaxed),
        )
    }

    fn timer_offset(&self, addr: u32) -> Option<u32> {
        let offset = addr.checked_sub(self.map.timer.base)?;
        (offset < timer_offsets::SPAN).then_some(offset)
    }
}

impl RegisterBus for SimulatedBoard {
    fn read(&self, addr: u32) -> u32 {
        self.bus_reads.fetch_add(1, Ordering::Relaxed);

        if let Some(offset) = self.timer_offset(addr) {
            let mut timer = lock(&self.timer);
            return match offset {
                timer_offsets::STATUS => timer.status(),
                timer_offsets::CONTROL => timer.control,
                timer_offsets::PERIOD_LOW => timer.period & 0xFFFF,
                timer_offsets::PERIOD_HIGH => timer.period >> 16,
                timer_offsets::SNAPSHOT_LOW => timer.snapshot & 0xFFFF,
                timer_offsets::SNAPSHOT_HIGH => timer.snapshot >> 16,
                _ => 0,
            };
        }

        let regs = self.map.coprocessor;
        if addr == self.map.switches {
            self.switches.load(Ordering::Acquire)
        } else if addr == self.map.leds {
            self.leds.load(Ordering::Acquire)
        } else if addr == regs.done {
            lock(&self.coprocessor).read_done()
        } else if addr == regs.result {
            lock(&self.coprocessor).result
        } else if addr == regs.operand || addr == regs.start {
            // Write-only ports read back as zero.
            0
        } else {
            trace!(addr, "read from unmapped address");
            0
        }
    }

    fn write(&self, addr: u32, value: u32) {
        self.bus_writes.fetch_add(1, Ordering::Relaxed);

        if let Some(offset) = self.timer_offset(addr) {
            let mut timer = lock(&self.timer);
            match offset {
                timer_offsets::STATUS => timer.timed_out = false,
                timer_offsets::CONTROL => timer.write_control(value),
                timer_offsets::PERIOD_LOW => timer.write_period_half(false, value),
                timer_offsets::PERIOD_HIGH => timer.write_period_half(true, value),
                timer_offsets::SNAPSHOT_LOW | timer_offsets::SNAPSHOT_HIGH => {
                    timer.snapshot = timer.counter();
                }
                _ => {}
            }
            return;
        }

        let regs = self.map.coprocessor;
        if addr == self.map.leds {
            self.leds.store(value, Ordering::Release);
        } else if addr == regs.operand {
            lock(&self.coprocessor).write_operand(value);
        } else if addr == regs.start {
            lock(&self.coprocessor).write_start(value);
        } else {
            trace!(addr, value, "write to unmapped or read-only address ignored");
        }
    }
}
