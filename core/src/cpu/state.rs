//! Register snapshots, for tests and tooling that compare CPU states.

use crate::cpu::m6809::SyncState;

pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// Programmer-visible 6809 registers plus the SYNC/CWAI wait state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct M6809State {
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub u: u16,
    pub s: u16,
    pub pc: u16,
    pub cc: u8,
    pub sync: SyncState,
}

impl M6809State {
    /// A:B as one word.
    pub fn d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }
}
