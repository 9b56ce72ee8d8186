use crate::cpu::m6809::{CcFlag, M6809};

impl M6809 {
    // --- Internal Binary Helpers ---

    /// ADD/ADC core: sets H, N, Z, V, C.
    #[inline]
    pub(super) fn perform_add(&mut self, a: u8, b: u8, carry_in: bool) -> u8 {
        let sum = a as u16 + b as u16 + carry_in as u16;
        let result = sum as u8;
        let half = (a & 0x0F) + (b & 0x0F) + carry_in as u8 > 0x0F;
        let overflow = (a ^ result) & (b ^ result) & 0x80 != 0;
        self.set_flag(CcFlag::H, half);
        self.set_flags_arithmetic(result, overflow, sum > 0xFF);
        result
    }

    /// SUB/SBC/CMP core: H untouched, C is the borrow.
    #[inline]
    pub(super) fn perform_sub(&mut self, a: u8, b: u8, borrow_in: bool) -> u8 {
        let diff = (a as u16)
            .wrapping_sub(b as u16)
            .wrapping_sub(borrow_in as u16);
        let result = diff as u8;
        let overflow = (a ^ b) & (a ^ result) & 0x80 != 0;
        self.set_flags_arithmetic(result, overflow, diff & 0x100 != 0);
        result
    }

    /// DAA: decimal adjust A after a BCD add.
    ///
    /// Carry is sticky. V comes out as bit 7 of the result XOR the new carry,
    /// matching the reference firmware behaviour rather than leaving V undefined.
    pub(crate) fn daa(&mut self) {
        let mut i = self.a as u16;
        if self.flag(CcFlag::H) || (i & 0x0F) > 0x09 {
            i += 0x06;
        }
        if self.flag(CcFlag::C) || (i & 0x1F0) > 0x90 {
            i += 0x60;
        }
        let carry = (i & 0x100 != 0) || self.flag(CcFlag::C);
        self.a = i as u8;
        self.cc &= 0xF0;
        let negative = self.a & 0x80 != 0;
        self.set_flag(CcFlag::N, negative);
        self.set_flag(CcFlag::Z, self.a == 0);
        self.set_flag(CcFlag::V, negative ^ carry);
        self.set_flag(CcFlag::C, carry);
    }

    /// MUL: D = A * B unsigned. Z from D, C = bit 7 of B, N untouched.
    pub(crate) fn mul(&mut self) {
        let product = self.a as u16 * self.b as u16;
        self.set_d(product);
        self.set_flag(CcFlag::Z, product == 0);
        self.set_flag(CcFlag::C, self.b & 0x80 != 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_half_carry() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_add(0x0F, 0x01, false), 0x10);
        assert!(cpu.flag(CcFlag::H));
        assert!(!cpu.flag(CcFlag::C));
    }

    #[test]
    fn add_signed_overflow() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_add(0x7F, 0x01, false), 0x80);
        assert!(cpu.flag(CcFlag::V));
        assert!(cpu.flag(CcFlag::N));
    }

    #[test]
    fn sub_borrow_keeps_half_carry() {
        let mut cpu = M6809::new();
        cpu.cc = CcFlag::H as u8;
        assert_eq!(cpu.perform_sub(0x00, 0x01, false), 0xFF);
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::H), "SUB does not touch H");
    }

    #[test]
    fn sbc_uses_carry_as_borrow() {
        let mut cpu = M6809::new();
        assert_eq!(cpu.perform_sub(0x10, 0x0F, true), 0x00);
        assert!(cpu.flag(CcFlag::Z));
        assert!(!cpu.flag(CcFlag::C));
    }

    #[test]
    fn daa_adjusts_bcd_sum() {
        let mut cpu = M6809::new();
        // 0x19 + 0x28 = 0x41 with H set -> 0x47
        cpu.a = cpu.perform_add(0x19, 0x28, false);
        cpu.daa();
        assert_eq!(cpu.a, 0x47);
        assert!(!cpu.flag(CcFlag::C));
    }

    #[test]
    fn daa_carry_out() {
        let mut cpu = M6809::new();
        cpu.a = cpu.perform_add(0x99, 0x01, false);
        cpu.daa();
        assert_eq!(cpu.a, 0x00);
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::Z));
    }

    #[test]
    fn mul_carry_from_low_byte() {
        let mut cpu = M6809::new();
        cpu.a = 0x10;
        cpu.b = 0x08;
        cpu.cc = CcFlag::N as u8;
        cpu.mul();
        assert_eq!(cpu.get_d(), 0x0080);
        assert!(cpu.flag(CcFlag::C));
        assert!(cpu.flag(CcFlag::N), "MUL leaves N alone");
    }
}
