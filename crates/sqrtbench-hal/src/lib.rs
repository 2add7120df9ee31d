//! Register-level platform layer.
//!
//! This crate provides:
//! - [`RegisterBus`] trait for volatile 32-bit register access
//! - typed register blocks: [`TimerBlock`], [`DiscreteIo`], [`CoprocessorChannel`]
//! - [`Peripherals`], which hands each block out exactly once
//! - [`SimulatedBoard`] (feature `simulated`), an in-process model of the board
//! - [`MmioBus`] (feature `mmio`, Linux), the physical register window

pub mod bus;
pub mod coprocessor;
#[cfg(all(feature = "mmio", target_os = "linux"))]
pub mod mmio;
pub mod peripherals;
pub mod pio;
#[cfg(feature = "simulated")]
pub mod sim;
pub mod timer;

pub use bus::*;
pub use coprocessor::*;
#[cfg(all(feature = "mmio", target_os = "linux"))]
pub use mmio::*;
pub use peripherals::*;
pub use pio::*;
#[cfg(feature = "simulated")]
pub use sim::*;
pub use timer::*;
