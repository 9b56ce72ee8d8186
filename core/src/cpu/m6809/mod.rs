mod addressing;
mod alu;
mod branch;
mod load_store;
mod stack;
pub mod table;
mod transfer;

use crate::core::{
    Bus, BusMaster,
    bus::InterruptState,
    component::{BusMasterComponent, Component},
};
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, M6809State},
};
use table::{Mode, Op, Opcode, Target};

#[repr(u8)]
#[derive(Copy, Clone, Debug)]
pub enum CcFlag {
    C = 0x01, // Carry
    V = 0x02, // Overflow
    Z = 0x04, // Zero
    N = 0x08, // Negative
    I = 0x10, // IRQ mask
    H = 0x20, // Half carry
    F = 0x40, // FIRQ mask
    E = 0x80, // Entire
}

/// Progress of a SYNC instruction.
///
/// Any interrupt request ends the wait, NMI included, and so does an IRQ
/// while I is set. The state stays `Released` until SYNC runs again,
/// directly or once a handler returns to it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Waiting,  // SYNC executed, re-executes until an interrupt request shows up
    Released, // an interrupt was requested while waiting
}

impl SyncState {
    pub fn to_i32(self) -> i32 {
        match self {
            SyncState::Idle => 0,
            SyncState::Waiting => 1,
            SyncState::Released => 2,
        }
    }

    pub fn from_i32(value: i32) -> Self {
        match value {
            1 => SyncState::Waiting,
            2 => SyncState::Released,
            _ => SyncState::Idle,
        }
    }
}

/// Result of one `M6809::step`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A legal instruction (or an interrupt entry) ran for this many cycles.
    Executed(u32),
    /// The opcode has no 6809 meaning. Carries `prefix << 8 | opcode`,
    /// so page-0 codes are 0x00..=0xFF and prefixed ones 0x10xx / 0x11xx.
    Trap(u16),
}

pub struct M6809 {
    // Registers (a,b,x,y,u,s,pc,cc)
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
    pub(crate) lines: InterruptState, // latched by signal_interrupt()
    pub(crate) extra: u32,            // cycles added by the current instruction
}

impl Default for M6809 {
    fn default() -> Self {
        Self::new()
    }
}

impl M6809 {
    pub fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            dp: 0,
            x: 0,
            y: 0,
            u: 0,
            s: 0,
            pc: 0,
            cc: 0,
            sync: SyncState::Idle,
            lines: InterruptState::default(),
            extra: 0,
        }
    }

    pub fn get_d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }

    pub fn set_d(&mut self, val: u16) {
        let bytes = val.to_be_bytes();
        self.a = bytes[0];
        self.b = bytes[1];
    }

    #[inline]
    pub(crate) fn set_flag(&mut self, flag: CcFlag, set: bool) {
        if set {
            self.cc |= flag as u8
        } else {
            self.cc &= !(flag as u8)
        }
    }

    #[inline]
    pub(crate) fn flag(&self, flag: CcFlag) -> bool {
        self.cc & flag as u8 != 0
    }

    /// Interrupt lines latched with `signal_interrupt`.
    pub fn interrupt_lines(&self) -> InterruptState {
        self.lines
    }

    /// Power-on / reset: CC = I, PC from the reset vector.
    pub fn reset<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.sync = SyncState::Idle;
        self.lines = InterruptState::default();
        self.cc = CcFlag::I as u8;
        self.pc = self.read_word(bus, master, 0xFFFE);
    }

    /// Execute one instruction, or enter a pending interrupt.
    ///
    /// Interrupt lines are the OR of the latched ones and what the bus
    /// reports, sampled before decode in NMI, FIRQ, IRQ priority.
    pub fn step<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> StepOutcome {
        self.extra = 0;
        if bus.is_halted_for(master) {
            return StepOutcome::Executed(1);
        }

        let ints = self.lines.merge(bus.check_interrupts(master));
        if ints.nmi {
            self.enter_nmi(bus, master);
            return StepOutcome::Executed(7 + self.extra);
        }
        if ints.firq && !self.flag(CcFlag::F) {
            self.enter_firq(bus, master);
            return StepOutcome::Executed(7 + self.extra);
        }
        if ints.irq && self.irq(bus, master) {
            return StepOutcome::Executed(7 + self.extra);
        }

        let mut prefix = 0u8;
        let code = loop {
            let byte = self.fetch_byte(bus, master);
            match byte {
                0x10 | 0x11 => prefix = byte,
                _ => break byte,
            }
        };

        match table::lookup(prefix, code) {
            Some(opcode) => {
                self.execute(opcode, bus, master);
                StepOutcome::Executed(opcode.cycles as u32 + self.extra)
            }
            None => StepOutcome::Trap(((prefix as u16) << 8) | code as u16),
        }
    }

    /// Attempt an IRQ entry. Releases a pending SYNC even when IRQs are masked.
    /// Returns true if the interrupt was taken.
    pub fn irq<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> bool {
        self.release_sync();
        if self.flag(CcFlag::I) {
            return false;
        }
        self.enter_irq(bus, master);
        true
    }

    #[inline]
    pub(crate) fn fetch_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let byte = bus.read(master, self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn execute<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        opcode: &Opcode,
        bus: &mut B,
        master: BusMaster,
    ) {
        let mode = opcode.mode;
        match opcode.op {
            Op::Unary(op, Target::A) => self.a = self.unary(op, self.a),
            Op::Unary(op, Target::B) => self.b = self.unary(op, self.b),
            Op::Unary(op, Target::Memory) => self.unary_memory(op, mode, bus, master),
            Op::Alu8(op, acc) => {
                let value = self.operand8(mode, bus, master);
                self.alu8(op, acc, value);
            }
            Op::Store8(acc) => self.store8(acc, mode, bus, master),
            Op::Alu16(op, reg) => {
                let value = self.operand16(mode, bus, master);
                self.alu16(op, reg, value);
            }
            Op::Store16(reg) => self.store16(reg, mode, bus, master),
            Op::Lea(reg) => {
                let ea = self.effective_address(mode, bus, master);
                self.lea(reg, ea);
            }
            Op::Branch(cond) => self.branch(cond, bus, master),
            Op::LongBranch(cond) => self.long_branch(cond, bus, master),
            Op::Bsr => self.bsr(mode, bus, master),
            Op::Jsr => {
                let ea = self.effective_address(mode, bus, master);
                self.jsr(ea, bus, master);
            }
            Op::Jmp => self.pc = self.effective_address(mode, bus, master),
            Op::Rts => self.rts(bus, master),
            Op::Rti => self.rti(bus, master),
            Op::Swi(n) => self.swi(n, bus, master),
            Op::Push(stack) => {
                let mask = self.operand8(mode, bus, master);
                let bytes = self.push(stack, mask, bus, master);
                self.extra += bytes;
            }
            Op::Pull(stack) => {
                let mask = self.operand8(mode, bus, master);
                let bytes = self.pull(stack, mask, bus, master);
                self.extra += bytes;
            }
            Op::Exg => {
                let post = self.operand8(mode, bus, master);
                self.exg(post);
            }
            Op::Tfr => {
                let post = self.operand8(mode, bus, master);
                self.tfr(post);
            }
            Op::Nop => {
                self.effective_address(mode, bus, master);
            }
            Op::Sync => self.sync_wait(),
            Op::Daa => self.daa(),
            Op::Orcc => {
                let mask = self.operand8(mode, bus, master);
                self.cc |= mask;
            }
            Op::Andcc => {
                let mask = self.operand8(mode, bus, master);
                self.cc &= mask;
            }
            Op::Cwai => {
                // Masks and marks the entire state; the wait itself is not modelled.
                let mask = self.operand8(mode, bus, master);
                self.cc = (self.cc & mask) | CcFlag::E as u8;
            }
            Op::Sex => self.sex(),
            Op::Abx => self.x = self.x.wrapping_add(self.b as u16),
            Op::Mul => self.mul(),
        }
    }

    fn sync_wait(&mut self) {
        if self.sync == SyncState::Idle {
            self.sync = SyncState::Waiting;
        }
        if self.sync == SyncState::Released {
            self.sync = SyncState::Idle;
        } else {
            self.pc = self.pc.wrapping_sub(1);
        }
    }

    #[inline]
    fn operand8<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let ea = self.effective_address(mode, bus, master);
        bus.read(master, ea)
    }

    #[inline]
    fn operand16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let ea = self.effective_address(mode, bus, master);
        self.read_word(bus, master, ea)
    }
}

impl Component for M6809 {
    fn tick(&mut self) -> bool {
        // The 6809 only advances against a bus; see tick_with_bus.
        false
    }
}

impl BusMasterComponent for M6809 {
    type Bus = dyn Bus<Address = u16, Data = u8>;

    fn tick_with_bus(&mut self, bus: &mut Self::Bus, master: BusMaster) -> bool {
        matches!(self.step(bus, master), StepOutcome::Executed(_))
    }
}

impl Cpu for M6809 {
    fn reset(&mut self, bus: &mut Self::Bus, master: BusMaster) {
        M6809::reset(self, bus, master);
    }

    fn signal_interrupt(&mut self, int: InterruptState) {
        self.lines = int;
    }

    fn is_sleeping(&self) -> bool {
        self.sync == SyncState::Waiting
    }
}

impl CpuStateTrait for M6809 {
    type Snapshot = M6809State;

    fn snapshot(&self) -> M6809State {
        M6809State {
            a: self.a,
            b: self.b,
            dp: self.dp,
            x: self.x,
            y: self.y,
            u: self.u,
            s: self.s,
            pc: self.pc,
            cc: self.cc,
            sync: self.sync,
        }
    }
}
