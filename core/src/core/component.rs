use crate::core::bus::{Bus, BusMaster};

/// Anything that advances with the machine clock.
pub trait Component {
    /// Advance one step. Returns true when the component reached a boundary
    /// the caller may care about (instruction end, line end, ...).
    fn tick(&mut self) -> bool;

    /// Number of master clock cycles per component step.
    fn clock_divider(&self) -> u64 {
        1
    }
}

/// A component that drives a bus (CPUs).
pub trait BusMasterComponent: Component {
    type Bus: Bus + ?Sized;

    /// Execute one step against the bus. Returns true if an instruction
    /// boundary was reached.
    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool;
}
