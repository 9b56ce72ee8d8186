use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    // --- Internal Unary Helpers ---

    /// NEG: 0 - val. V set for 0x80, C set when the result is non-zero.
    #[inline]
    pub(super) fn perform_neg(&mut self, val: u8) -> u8 {
        let (result, borrow) = 0u8.overflowing_sub(val);
        self.set_flags_arithmetic(result, val == 0x80, borrow);
        result
    }

    #[inline]
    pub(super) fn perform_com(&mut self, val: u8) -> u8 {
        let result = !val;
        self.set_flags_logical(result);
        self.set_flag(CcFlag::C, true);
        result
    }

    #[inline]
    pub(super) fn perform_clr(&mut self) -> u8 {
        self.cc &= 0xF0;
        self.cc |= CcFlag::Z as u8;
        0
    }

    /// INC: C untouched, V set when crossing 0x7F -> 0x80.
    #[inline]
    pub(super) fn perform_inc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, val == 0x7F);
        result
    }

    /// DEC: C untouched, V set when crossing 0x80 -> 0x7F.
    #[inline]
    pub(super) fn perform_dec(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, val == 0x80);
        result
    }

    /// SEX: sign-extend B into A. N, Z from D, V cleared.
    pub(crate) fn sex(&mut self) {
        self.a = if self.b & 0x80 != 0 { 0xFF } else { 0x00 };
        let d = self.get_d();
        self.set_flags_logical16(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neg_of_0x80_overflows() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_neg(0x80), 0x80);
        assert!(cpu.flag(CcFlag::V));
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::N));
    }

    #[test]
    fn neg_of_zero_clears_carry() {
        let mut cpu = M6809::new();
        cpu.cc = CcFlag::C as u8;
        assert_eq!(cpu.perform_neg(0), 0);
        assert!(!cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::Z));
    }

    #[test]
    fn clr_keeps_upper_flags() {
        let mut cpu = M6809::new();
        cpu.cc = 0xFF;
        cpu.perform_clr();
        assert_eq!(cpu.cc, 0xF4);
    }

    #[test]
    fn inc_leaves_carry_alone() {
        let mut cpu = M6809::new();
        cpu.cc = CcFlag::C as u8;
        assert_eq!(cpu.perform_inc(0x7F), 0x80);
        assert!(cpu.flag(CcFlag::V));
        assert!(cpu.flag(CcFlag::C), "Carry should be preserved");
    }

    #[test]
    fn sex_extends_negative_b() {
        let mut cpu = M6809::new();
        cpu.b = 0x90;
        cpu.sex();
        assert_eq!(cpu.get_d(), 0xFF90);
        assert!(cpu.flag(CcFlag::N));
    }
}
