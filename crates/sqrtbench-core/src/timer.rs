//! Free-running interval timer.
//!
//! The timer is a typestate pair. [`UnconfiguredTimer`] can only read the period
//! and be configured; configuring consumes it and yields a [`Timer`] that owns
//! the period captured at that moment. Snapshot reads are therefore impossible
//! before the control register has been written, and the period never lives in
//! ambient global state.

use sqrtbench_common::ticks::{compose_halves, elapsed_ticks, TickCount, TimerPeriod};
use sqrtbench_hal::timer::{TimerBlock, CONTROL_CONT, CONTROL_START, STATUS_RUN};
use sqrtbench_hal::RegisterBus;
use tracing::{debug, info};

fn read_period<B: RegisterBus>(block: &TimerBlock<B>) -> TimerPeriod {
    TimerPeriod(compose_halves(block.period_high(), block.period_low()))
}

/// Timer block before the control register has been written.
#[derive(Debug)]
pub struct UnconfiguredTimer<B: RegisterBus> {
    block: TimerBlock<B>,
}

impl<B: RegisterBus> UnconfiguredTimer<B> {
    /// Wrap the timer register block.
    #[must_use]
    pub fn new(block: TimerBlock<B>) -> Self {
        Self { block }
    }

    /// Read the period registers. Pure read; the value may be stale until configured.
    #[must_use]
    pub fn read_period(&self) -> TimerPeriod {
        read_period(&self.block)
    }

    /// Start continuous auto-reload counting and capture the period.
    ///
    /// There is no way back: the returned timer has no stop or reset.
    #[must_use]
    pub fn configure(self) -> Timer<B> {
        self.block.write_control(CONTROL_CONT | CONTROL_START);
        let period = read_period(&self.block);
        debug!(
            running = self.block.status() & STATUS_RUN != 0,
            "timer control written"
        );
        info!(%period, "timer configured");
        Timer {
            block: self.block,
            period,
        }
    }
}

/// Running down-counter with a fixed period.
#[derive(Debug)]
pub struct Timer<B: RegisterBus> {
    block: TimerBlock<B>,
    period: TimerPeriod,
}

impl<B: RegisterBus> Timer<B> {
    /// Period captured when the timer was configured.
    #[must_use]
    pub fn period(&self) -> TimerPeriod {
        self.period
    }

    /// Re-read the period registers.
    #[must_use]
    pub fn read_period(&self) -> TimerPeriod {
        read_period(&self.block)
    }

    /// Latch and read the current counter value.
    ///
    /// The two halves are read separately; a reload between them is not detected.
    pub fn read_tick(&self) -> TickCount {
        self.block.latch_snapshot();
        let high = self.block.snapshot_high();
        let low = self.block.snapshot_low();
        TickCount(compose_halves(high, low))
    }

    /// Ticks from `before` to `after`, correcting at most one reload.
    #[must_use]
    pub fn elapsed(&self, before: TickCount, after: TickCount) -> TickCount {
        elapsed_ticks(before, after, self.period)
    }
}
