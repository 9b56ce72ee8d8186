use super::table::{Cond, Mode};
use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

impl M6809 {
    /// Evaluate a branch condition against CC.
    pub(crate) fn condition(&self, cond: Cond) -> bool {
        let c = self.flag(CcFlag::C);
        let v = self.flag(CcFlag::V);
        let z = self.flag(CcFlag::Z);
        let n = self.flag(CcFlag::N);
        match cond {
            Cond::Always => true,
            Cond::Never => false,
            Cond::Hi => !(c || z),
            Cond::Ls => c || z,
            Cond::Cc => !c,
            Cond::Cs => c,
            Cond::Ne => !z,
            Cond::Eq => z,
            Cond::Vc => !v,
            Cond::Vs => v,
            Cond::Pl => !n,
            Cond::Mi => n,
            Cond::Ge => n == v,
            Cond::Lt => n != v,
            Cond::Gt => !z && n == v,
            Cond::Le => z || n != v,
        }
    }

    /// Short branch: the offset byte is always consumed.
    pub(crate) fn branch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        cond: Cond,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.fetch_byte(bus, master) as i8 as u16;
        if self.condition(cond) {
            self.pc = self.pc.wrapping_add(offset);
        }
    }

    /// Long branch: one extra cycle when a conditional branch is taken.
    pub(crate) fn long_branch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        cond: Cond,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.relative_offset(Mode::Relative16, bus, master);
        if self.condition(cond) {
            self.pc = self.pc.wrapping_add(offset);
            if cond != Cond::Always {
                self.extra += 1;
            }
        }
    }

    /// BSR / LBSR
    pub(crate) fn bsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) {
        let offset = self.relative_offset(mode, bus, master);
        self.push_word_s(bus, master, self.pc);
        self.pc = self.pc.wrapping_add(offset);
    }

    pub(crate) fn jsr<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        target: u16,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.push_word_s(bus, master, self.pc);
        self.pc = target;
    }

    pub(crate) fn rts<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.pc = self.pull_word_s(bus, master);
    }

    fn relative_offset<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        if mode == Mode::Relative16 {
            let hi = self.fetch_byte(bus, master);
            let lo = self.fetch_byte(bus, master);
            u16::from_be_bytes([hi, lo])
        } else {
            self.fetch_byte(bus, master) as i8 as u16
        }
    }
}
