//! Switch and LED parallel I/O ports.

use crate::bus::RegisterBus;

/// Handle to the discrete input (switches) and output (LEDs) ports.
#[derive(Debug)]
pub struct DiscreteIo<B: RegisterBus> {
    bus: B,
    switches: u32,
    leds: u32,
}

impl<B: RegisterBus> DiscreteIo<B> {
    pub(crate) fn new(bus: B, switches: u32, leds: u32) -> Self {
        Self {
            bus,
            switches,
            leds,
        }
    }

    /// Current switch word.
    #[must_use]
    pub fn read_switches(&self) -> u32 {
        self.bus.read(self.switches)
    }

    /// Drive the LEDs.
    pub fn write_leds(&self, value: u32) {
        self.bus.write(self.leds, value);
    }

    /// Copy the switch word onto the LEDs, returning the copied value.
    pub fn mirror(&self) -> u32 {
        let value = self.read_switches();
        self.write_leds(value);
        value
    }
}
