use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    // --- Internal Shift/Rotate Helpers ---

    /// LSR: N cleared, C = bit 0, V untouched.
    #[inline]
    pub(super) fn perform_lsr(&mut self, val: u8) -> u8 {
        let result = val >> 1;
        self.set_flag(CcFlag::C, val & 0x01 != 0);
        self.set_flag(CcFlag::N, false);
        self.set_flag(CcFlag::Z, result == 0);
        result
    }

    #[inline]
    pub(super) fn perform_asr(&mut self, val: u8) -> u8 {
        let result = (val >> 1) | (val & 0x80);
        self.set_flag(CcFlag::C, val & 0x01 != 0);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        result
    }

    #[inline]
    pub(super) fn perform_ror(&mut self, val: u8) -> u8 {
        let carry_in = if self.flag(CcFlag::C) { 0x80 } else { 0 };
        let result = (val >> 1) | carry_in;
        self.set_flag(CcFlag::C, val & 0x01 != 0);
        self.set_flag(CcFlag::N, result & 0x80 != 0);
        self.set_flag(CcFlag::Z, result == 0);
        result
    }

    /// ASL/LSL: C = old bit 7, V = N ^ C.
    #[inline]
    pub(super) fn perform_asl(&mut self, val: u8) -> u8 {
        let result = val << 1;
        self.set_shift_left_flags(val, result);
        result
    }

    #[inline]
    pub(super) fn perform_rol(&mut self, val: u8) -> u8 {
        let carry_in = self.flag(CcFlag::C) as u8;
        let result = (val << 1) | carry_in;
        self.set_shift_left_flags(val, result);
        result
    }

    #[inline]
    fn set_shift_left_flags(&mut self, val: u8, result: u8) {
        let carry = val & 0x80 != 0;
        let negative = result & 0x80 != 0;
        self.set_flag(CcFlag::C, carry);
        self.set_flag(CcFlag::N, negative);
        self.set_flag(CcFlag::Z, result == 0);
        self.set_flag(CcFlag::V, negative ^ carry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsr_preserves_overflow() {
        let mut cpu = M6809::new();
        cpu.cc = CcFlag::V as u8;
        assert_eq!(cpu.perform_lsr(0x01), 0);
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::Z));
        assert!(cpu.flag(CcFlag::V), "LSR must not touch V");
    }

    #[test]
    fn ror_rotates_carry_into_bit7() {
        let mut cpu = M6809::new();
        cpu.cc = CcFlag::C as u8;
        assert_eq!(cpu.perform_ror(0x02), 0x81);
        assert!(!cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::N));
    }

    #[test]
    fn asl_overflow_is_n_xor_c() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_asl(0x40), 0x80);
        assert!(cpu.flag(CcFlag::V));
        assert!(!cpu.flag(CcFlag::C));

        assert_eq!(cpu.perform_asl(0xC0), 0x80);
        assert!(!cpu.flag(CcFlag::V), "N and C both set");
        assert!(cpu.flag(CcFlag::C));
    }

    #[test]
    fn asr_keeps_sign() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_asr(0x81), 0xC0);
        assert!(cpu.flag(CcFlag::C));
    }
}
