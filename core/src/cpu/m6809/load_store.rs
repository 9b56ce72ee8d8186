use super::table::{Acc, Mode, Reg16};
use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

impl M6809 {
    /// STA / STB: N, Z from the stored value, V cleared.
    pub(crate) fn store8<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        acc: Acc,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = self.effective_address(mode, bus, master);
        let value = self.acc(acc);
        bus.write(master, ea, value);
        self.set_flags_logical(value);
    }

    /// STD / STX / STY / STU / STS, high byte first.
    pub(crate) fn store16<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        reg: Reg16,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = self.effective_address(mode, bus, master);
        let value = self.reg16(reg);
        self.write_word(bus, master, ea, value);
        self.set_flags_logical16(value);
    }

    /// LEAX/LEAY set Z only. LEAS/LEAU leave CC alone.
    pub(crate) fn lea(&mut self, reg: Reg16, ea: u16) {
        self.set_reg16(reg, ea);
        if matches!(reg, Reg16::X | Reg16::Y) {
            self.set_flag(CcFlag::Z, ea == 0);
        }
    }
}
