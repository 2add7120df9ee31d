//! Square-root coprocessor channel.
//!
//! Four single-purpose registers. Software owns `operand` and `start`; the
//! coprocessor owns `done` and `result`. The channel is not `Clone` and can only be
//! obtained from [`Peripherals`](crate::Peripherals), so at most one handle exists.

use crate::bus::RegisterBus;
use sqrtbench_common::config::CoprocessorRegisters;
use tracing::trace;

/// Handle to the coprocessor registers.
#[derive(Debug)]
pub struct CoprocessorChannel<B: RegisterBus> {
    bus: B,
    regs: CoprocessorRegisters,
}

impl<B: RegisterBus> CoprocessorChannel<B> {
    pub(crate) fn new(bus: B, regs: CoprocessorRegisters) -> Self {
        Self { bus, regs }
    }

    /// Load the operand for the next request.
    pub fn write_operand(&mut self, value: u32) {
        trace!(value, "coprocessor operand");
        self.bus.write(self.regs.operand, value);
    }

    /// Drive the start line. A low-to-high edge submits a request.
    pub fn set_start(&mut self, asserted: bool) {
        trace!(asserted, "coprocessor start");
        self.bus.write(self.regs.start, u32::from(asserted));
    }

    /// Poll the completion flag.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.bus.read(self.regs.done) & 1 != 0
    }

    /// Read the result of the completed request.
    #[must_use]
    pub fn read_result(&self) -> u32 {
        self.bus.read(self.regs.result)
    }
}
