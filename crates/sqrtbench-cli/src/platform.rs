//! Register bus selection.

use anyhow::Result;
use sqrtbench_common::config::{BusKind, HarnessConfig, RegisterMap};
use sqrtbench_hal::SimulatedBoard;
use std::sync::Arc;
use tracing::info;

/// The bus the benchmark runs against.
pub enum Board {
    /// In-process model of the board.
    Simulated(Arc<SimulatedBoard>),
    /// Physical registers through `/dev/mem`.
    #[cfg(all(feature = "mmio", target_os = "linux"))]
    Mmio(sqrtbench_hal::MmioBus),
}

impl Board {
    /// Open the bus named by `platform.bus`.
    pub fn open(config: &HarnessConfig) -> Result<Self> {
        match config.platform.bus {
            BusKind::Simulated => {
                info!(
                    tick = ?config.simulation.tick,
                    latency = config.simulation.coprocessor_latency,
                    "Using simulated board"
                );
                let board = SimulatedBoard::new(config.registers, &config.simulation);
                Ok(Board::Simulated(Arc::new(board)))
            }
            BusKind::Mmio => open_mmio(&config.registers),
        }
    }
}

#[cfg(all(feature = "mmio", target_os = "linux"))]
fn open_mmio(map: &RegisterMap) -> Result<Board> {
    let (base, len) = map.window()?;
    info!(base, len, "Mapping register window");
    // SAFETY: the register map was validated and describes the board's device
    // registers; the window is opened at most once per process.
    #[allow(unsafe_code)]
    let bus = unsafe { sqrtbench_hal::MmioBus::open(base, len) }?;
    Ok(Board::Mmio(bus))
}

#[cfg(not(all(feature = "mmio", target_os = "linux")))]
fn open_mmio(_map: &RegisterMap) -> Result<Board> {
    anyhow::bail!(
        "platform.bus = \"mmio\" requires a Linux build with the `mmio` feature; \
         rebuild with --features mmio or use the simulated bus"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqrtbench_hal::RegisterBus;

    #[test]
    fn test_simulated_board_gets_configured_switches() {
        let mut config = HarnessConfig::default();
        config.simulation.switches = 0x2A;
        let Board::Simulated(board) = Board::open(&config).unwrap() else {
            panic!("expected simulated board");
        };
        assert_eq!(board.read(config.registers.switches), 0x2A);
    }

    #[cfg(not(all(feature = "mmio", target_os = "linux")))]
    #[test]
    fn test_mmio_without_feature_is_rejected() {
        let mut config = HarnessConfig::default();
        config.platform.bus = BusKind::Mmio;
        let err = Board::open(&config).err().unwrap();
        assert!(err.to_string().contains("mmio"));
    }
}
