//! Interval timer register block.
//!
//! ```text
//! base + 0x00  status         TO | RUN
//! base + 0x04  control        ITO | CONT | START | STOP
//! base + 0x08  period_low     bits 15..0 of the reload value
//! base + 0x0C  period_high    bits 31..16 of the reload value
//! base + 0x10  snapshot_low   write: latch counter; read: bits 15..0 of the latch
//! base + 0x14  snapshot_high  bits 31..16 of the latch
//! ```

use crate::bus::RegisterBus;
use sqrtbench_common::config::timer_offsets::{
    CONTROL, PERIOD_HIGH, PERIOD_LOW, SNAPSHOT_HIGH, SNAPSHOT_LOW, SPAN, STATUS,
};
use static_assertions::const_assert_eq;
use tracing::trace;

/// Status: counter reached zero since the flag was last cleared.
pub const STATUS_TO: u32 = 1 << 0;
/// Status: counter is running.
pub const STATUS_RUN: u32 = 1 << 1;

/// Control: reload from the period registers and keep counting at zero.
pub const CONTROL_CONT: u32 = 1 << 1;
/// Control: start counting.
pub const CONTROL_START: u32 = 1 << 2;
/// Control: stop counting.
pub const CONTROL_STOP: u32 = 1 << 3;

const_assert_eq!(SPAN, SNAPSHOT_HIGH + 4);
const_assert_eq!(CONTROL_CONT | CONTROL_START, 0x6);

/// Handle to the interval timer registers.
///
/// Exposes exactly the register operations the hardware documents. Obtained once
/// through [`Peripherals`](crate::Peripherals).
#[derive(Debug)]
pub struct TimerBlock<B: RegisterBus> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> TimerBlock<B> {
    pub(crate) fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    /// Read the status register.
    #[must_use]
    pub fn status(&self) -> u32 {
        self.bus.read(self.base + STATUS)
    }

    /// Write the control register.
    pub fn write_control(&self, value: u32) {
        trace!(value, "timer control write");
        self.bus.write(self.base + CONTROL, value);
    }

    /// Low half of the period register pair.
    #[must_use]
    pub fn period_low(&self) -> u32 {
        self.bus.read(self.base + PERIOD_LOW)
    }

    /// High half of the period register pair.
    #[must_use]
    pub fn period_high(&self) -> u32 {
        self.bus.read(self.base + PERIOD_HIGH)
    }

    /// Capture the current counter value into the snapshot registers.
    ///
    /// This is a trigger: the written value is ignored by the hardware.
    pub fn latch_snapshot(&self) {
        self.bus.write(self.base + SNAPSHOT_LOW, 0);
    }

    /// Low half of the last latched snapshot.
    #[must_use]
    pub fn snapshot_low(&self) -> u32 {
        self.bus.read(self.base + SNAPSHOT_LOW)
    }

    /// High half of the last latched snapshot.
    #[must_use]
    pub fn snapshot_high(&self) -> u32 {
        self.bus.read(self.base + SNAPSHOT_HIGH)
    }
}
