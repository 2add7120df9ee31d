//! Ownership of the register blocks.

use crate::bus::RegisterBus;
use crate::coprocessor::CoprocessorChannel;
use crate::pio::DiscreteIo;
use crate::timer::TimerBlock;
use sqrtbench_common::config::RegisterMap;
use sqrtbench_common::error::{BenchError, BenchResult};
use tracing::debug;

/// Every register block on the board, each handed out once.
///
/// Blocks have no public constructors, so moving a field out of this struct is the
/// only way to obtain one. That is what keeps the coprocessor channel single-owner.
#[derive(Debug)]
pub struct Peripherals<B: RegisterBus + Clone> {
    /// Interval timer.
    pub timer: TimerBlock<B>,
    /// Switches and LEDs.
    pub io: DiscreteIo<B>,
    /// Square-root coprocessor.
    pub coprocessor: CoprocessorChannel<B>,
}

impl<B: RegisterBus + Clone> Peripherals<B> {
    /// Split `bus` into typed register blocks at the addresses in `map`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Config`] if the map has misaligned or overlapping registers.
    pub fn new(bus: B, map: &RegisterMap) -> BenchResult<Self> {
        map.validate()
            .map_err(|e| BenchError::Config(e.to_string()))?;

        debug!(
            timer = map.timer.base,
            switches = map.switches,
            leds = map.leds,
            "register blocks assigned"
        );

        Ok(Self {
            timer: TimerBlock::new(bus.clone(), map.timer.base),
            io: DiscreteIo::new(bus.clone(), map.switches, map.leds),
            coprocessor: CoprocessorChannel::new(bus, map.coprocessor),
        })
    }
}
