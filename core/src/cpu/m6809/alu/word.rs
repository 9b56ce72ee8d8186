use crate::cpu::m6809::M6809;

impl M6809 {
    // --- Internal 16-bit Helpers ---

    #[inline]
    pub(super) fn perform_add16(&mut self, a: u16, b: u16) -> u16 {
        let (result, carry) = a.overflowing_add(b);
        let overflow = (a ^ result) & (b ^ result) & 0x8000 != 0;
        self.set_flags_arithmetic16(result, overflow, carry);
        result
    }

    #[inline]
    pub(super) fn perform_sub16(&mut self, a: u16, b: u16) -> u16 {
        let (result, borrow) = a.overflowing_sub(b);
        let overflow = (a ^ b) & (a ^ result) & 0x8000 != 0;
        self.set_flags_arithmetic16(result, overflow, borrow);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::m6809::CcFlag;

    #[test]
    fn addd_carry_and_zero() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_add16(0xFFFF, 0x0001), 0);
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::Z));
        assert!(!cpu.flag(CcFlag::V));
    }

    #[test]
    fn cmpx_signed_overflow() {
        let mut cpu = M6809::new();
        cpu.perform_sub16(0x8000, 0x0001);
        assert!(cpu.flag(CcFlag::V));
        assert!(!cpu.flag(CcFlag::C));
        assert!(!cpu.flag(CcFlag::N));
    }
}
