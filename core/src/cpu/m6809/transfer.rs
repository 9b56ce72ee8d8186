use super::M6809;

impl M6809 {
    // Register IDs for TFR/EXG
    // 0=D, 1=X, 2=Y, 3=U, 4=S, 5=PC, 8=A, 9=B, 10=CC, 11=DP

    fn get_reg_val(&self, id: u8) -> u16 {
        match id {
            0 => self.get_d(),
            1 => self.x,
            2 => self.y,
            3 => self.u,
            4 => self.s,
            5 => self.pc,
            8 => self.a as u16,
            9 => self.b as u16,
            10 => self.cc as u16,
            11 => self.dp as u16,
            _ => 0,
        }
    }

    fn set_reg_val(&mut self, id: u8, val: u16) {
        match id {
            0 => self.set_d(val),
            1 => self.x = val,
            2 => self.y = val,
            3 => self.u = val,
            4 => self.s = val,
            5 => self.pc = val,
            8 => self.a = val as u8,
            9 => self.b = val as u8,
            10 => self.cc = val as u8,
            11 => self.dp = val as u8,
            _ => {}
        }
    }

    /// Both nibbles must name distinct registers of the same width.
    /// Any other postbyte makes TFR/EXG a no-op.
    fn valid_pair(post: u8) -> Option<(u8, u8)> {
        let (r1, r2) = (post >> 4, post & 0x0F);
        let wide = r1 <= 5 && r2 <= 5;
        let narrow = (8..=11).contains(&r1) && (8..=11).contains(&r2);
        let same_width = wide || narrow;
        (same_width && r1 != r2).then_some((r1, r2))
    }

    /// TFR (0x1F): copy R1 into R2.
    pub(crate) fn tfr(&mut self, post: u8) {
        if let Some((src, dst)) = Self::valid_pair(post) {
            let val = self.get_reg_val(src);
            self.set_reg_val(dst, val);
        }
    }

    /// EXG (0x1E): swap R1 and R2.
    pub(crate) fn exg(&mut self, post: u8) {
        if let Some((r1, r2)) = Self::valid_pair(post) {
            let val1 = self.get_reg_val(r1);
            let val2 = self.get_reg_val(r2);
            self.set_reg_val(r1, val2);
            self.set_reg_val(r2, val1);
        }
    }
}
