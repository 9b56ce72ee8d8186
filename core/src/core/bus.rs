/// Identifies who is accessing the bus.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BusMaster {
    Cpu(usize), // CPU 0, CPU 1, etc.
    Dma,        // Peripheral transfers performed on behalf of a trapped instruction
}

/// Generic bus interface.
///
/// Every access goes through `read`/`write`, including the ones that have
/// side effects on the machine (bank switching, status registers cleared on
/// read, palette auto-increment), so callers must not probe it speculatively.
pub trait Bus {
    type Address: Copy + Into<u64>; // u16 for 8-bit CPUs
    type Data; // u8

    fn read(&mut self, master: BusMaster, addr: Self::Address) -> Self::Data;
    fn write(&mut self, master: BusMaster, addr: Self::Address, data: Self::Data);

    /// Check if the bus is halted for this master.
    /// Returns true if the master must pause before the next instruction.
    fn is_halted_for(&self, master: BusMaster) -> bool;

    /// Generic interrupt query, sampled by the CPU before each decode.
    fn check_interrupts(&self, target: BusMaster) -> InterruptState;
}

/// Level of the three 6809 interrupt inputs.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptState {
    pub nmi: bool,
    pub irq: bool,
    pub firq: bool,
}

impl InterruptState {
    /// Merge two sources of interrupt requests (wired-OR lines).
    pub fn merge(self, other: InterruptState) -> InterruptState {
        InterruptState {
            nmi: self.nmi || other.nmi,
            irq: self.irq || other.irq,
            firq: self.firq || other.firq,
        }
    }
}
