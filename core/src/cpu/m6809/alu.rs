use super::table::{Acc, Alu8, Alu16, Mode, Reg16, Unary};
use super::{CcFlag, M6809};
use crate::core::{Bus, BusMaster};

mod binary;
mod shift;
mod unary;
mod word;

impl M6809 {
    /// Helper to set N, Z, V (cleared) flags for logical operations
    #[inline]
    pub(crate) fn set_flags_logical(&mut self, result: u8) {
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, false);
    }

    /// Helper to set N, Z, V, C flags for arithmetic operations
    #[inline]
    pub(crate) fn set_flags_arithmetic(&mut self, result: u8, overflow: bool, carry: bool) {
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        self.set_flag(CcFlag::C, carry);
    }

    /// Helper to set N, Z, V, C flags for 16-bit arithmetic
    #[inline]
    pub(crate) fn set_flags_arithmetic16(&mut self, result: u16, overflow: bool, carry: bool) {
        self.set_flag(CcFlag::N, result & 0x8000 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, overflow);
        self.set_flag(CcFlag::C, carry);
    }

    /// Helper to set N, Z, V (cleared) flags for 16-bit logical operations
    #[inline]
    pub(crate) fn set_flags_logical16(&mut self, result: u16) {
        self.set_flag(CcFlag::N, result & 0x8000 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, false);
    }

    #[inline]
    pub(crate) fn acc(&self, acc: Acc) -> u8 {
        match acc {
            Acc::A => self.a,
            Acc::B => self.b,
        }
    }

    #[inline]
    pub(crate) fn set_acc(&mut self, acc: Acc, value: u8) {
        match acc {
            Acc::A => self.a = value,
            Acc::B => self.b = value,
        }
    }

    #[inline]
    pub(crate) fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::D => self.get_d(),
            Reg16::X => self.x,
            Reg16::Y => self.y,
            Reg16::U => self.u,
            Reg16::S => self.s,
        }
    }

    #[inline]
    pub(crate) fn set_reg16(&mut self, reg: Reg16, value: u16) {
        match reg {
            Reg16::D => self.set_d(value),
            Reg16::X => self.x = value,
            Reg16::Y => self.y = value,
            Reg16::U => self.u = value,
            Reg16::S => self.s = value,
        }
    }

    /// Apply a read-modify-write operation to `val`, setting flags.
    /// TST returns its operand unchanged.
    pub(crate) fn unary(&mut self, op: Unary, val: u8) -> u8 {
        match op {
            Unary::Neg => self.perform_neg(val),
            Unary::Com => self.perform_com(val),
            Unary::Lsr => self.perform_lsr(val),
            Unary::Ror => self.perform_ror(val),
            Unary::Asr => self.perform_asr(val),
            Unary::Asl => self.perform_asl(val),
            Unary::Rol => self.perform_rol(val),
            Unary::Dec => self.perform_dec(val),
            Unary::Inc => self.perform_inc(val),
            Unary::Tst => {
                self.set_flags_logical(val);
                val
            }
            Unary::Clr => self.perform_clr(),
        }
    }

    /// Memory form of `unary`. CLR and TST still read the operand, as the
    /// hardware does; TST writes nothing back.
    pub(crate) fn unary_memory<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        op: Unary,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) {
        let ea = self.effective_address(mode, bus, master);
        let val = bus.read(master, ea);
        let result = self.unary(op, val);
        if op != Unary::Tst {
            bus.write(master, ea, result);
        }
    }

    pub(crate) fn alu8(&mut self, op: Alu8, acc: Acc, operand: u8) {
        let val = self.acc(acc);
        match op {
            Alu8::Sub => {
                let result = self.perform_sub(val, operand, false);
                self.set_acc(acc, result);
            }
            Alu8::Sbc => {
                let borrow = self.flag(CcFlag::C);
                let result = self.perform_sub(val, operand, borrow);
                self.set_acc(acc, result);
            }
            Alu8::Cmp => {
                self.perform_sub(val, operand, false);
            }
            Alu8::Add => {
                let result = self.perform_add(val, operand, false);
                self.set_acc(acc, result);
            }
            Alu8::Adc => {
                let carry = self.flag(CcFlag::C);
                let result = self.perform_add(val, operand, carry);
                self.set_acc(acc, result);
            }
            Alu8::And => {
                let result = val & operand;
                self.set_flags_logical(result);
                self.set_acc(acc, result);
            }
            Alu8::Bit => self.set_flags_logical(val & operand),
            Alu8::Eor => {
                let result = val ^ operand;
                self.set_flags_logical(result);
                self.set_acc(acc, result);
            }
            Alu8::Or => {
                let result = val | operand;
                self.set_flags_logical(result);
                self.set_acc(acc, result);
            }
            Alu8::Ld => {
                self.set_flags_logical(operand);
                self.set_acc(acc, operand);
            }
        }
    }

    pub(crate) fn alu16(&mut self, op: Alu16, reg: Reg16, operand: u16) {
        let val = self.reg16(reg);
        match op {
            Alu16::Sub => {
                let result = self.perform_sub16(val, operand);
                self.set_reg16(reg, result);
            }
            Alu16::Add => {
                let result = self.perform_add16(val, operand);
                self.set_reg16(reg, result);
            }
            Alu16::Cmp => {
                self.perform_sub16(val, operand);
            }
            Alu16::Ld => {
                self.set_flags_logical16(operand);
                self.set_reg16(reg, operand);
            }
        }
    }
}
