use super::SquareRootEngine;
use sqrtbench_hal::{CoprocessorChannel, RegisterBus};
use tracing::trace;

/// Coprocessor engine: one blocking request per call.
///
/// Owns the [`CoprocessorChannel`], so no other code can touch the registers, and
/// takes `&mut self`, so a second request cannot be issued while one is in flight:
///
/// ```compile_fail
/// # use std::sync::Arc;
/// # use sqrtbench_common::config::HarnessConfig;
/// # use sqrtbench_core::engine::HardwareSqrt;
/// # use sqrtbench_hal::{Peripherals, SimulatedBoard};
/// # let config = HarnessConfig::default();
/// # let board = Arc::new(SimulatedBoard::new(config.registers, &config.simulation));
/// # let p = Peripherals::new(board, &config.registers).unwrap();
/// let mut engine = HardwareSqrt::new(p.coprocessor);
/// let first = &mut engine;
/// let second = &mut engine;
/// first.hardware_sqrt(4);
/// second.hardware_sqrt(9);
/// ```
///
/// There is no timeout. If the coprocessor never raises `done`, the call never
/// returns.
#[derive(Debug)]
pub struct HardwareSqrt<B: RegisterBus> {
    channel: CoprocessorChannel<B>,
    requests: u64,
}

impl<B: RegisterBus> HardwareSqrt<B> {
    /// Take ownership of the coprocessor channel.
    #[must_use]
    pub fn new(channel: CoprocessorChannel<B>) -> Self {
        Self {
            channel,
            requests: 0,
        }
    }

    /// Floor square root of `value`, computed by the coprocessor.
    ///
    /// Writes the operand, raises `start`, spins until `done`, reads `result` once,
    /// then drops `start` so the unit is ready for the next request.
    pub fn hardware_sqrt(&mut self, value: u32) -> u32 {
        self.channel.write_operand(value);
        self.channel.set_start(true);

        let mut polls: u64 = 0;
        while !self.channel.is_done() {
            polls += 1;
            std::hint::spin_loop();
        }

        let result = self.channel.read_result();
        self.channel.set_start(false);
        self.requests += 1;

        trace!(value, result, polls, "coprocessor request complete");
        result
    }

    /// Requests completed so far.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Give the channel back.
    #[must_use]
    pub fn into_channel(self) -> CoprocessorChannel<B> {
        self.channel
    }
}

impl<B: RegisterBus> SquareRootEngine for HardwareSqrt<B> {
    fn name(&self) -> &'static str {
        "hardware"
    }

    fn compute(&mut self, value: u32) -> u32 {
        self.hardware_sqrt(value)
    }
}
