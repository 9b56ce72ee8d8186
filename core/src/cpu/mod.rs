use crate::core::bus::BusMaster;
use crate::core::component::BusMasterComponent;

/// Generic CPU interface
pub trait Cpu: BusMasterComponent + CpuStateTrait {
    /// Reset the processor and fetch the reset vector through the bus.
    fn reset(&mut self, bus: &mut Self::Bus, master: BusMaster);

    /// Latch the level of the interrupt lines (implementation-defined).
    fn signal_interrupt(&mut self, int: crate::core::bus::InterruptState);

    /// Query if CPU is waiting internally (SYNC, CWAI)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, M6809State};

pub mod m6809;
pub use m6809::M6809;
