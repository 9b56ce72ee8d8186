use super::M6809;
use super::table::Mode;
use crate::core::{Bus, BusMaster};

impl M6809 {
    #[inline]
    pub(crate) fn read_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        addr: u16,
    ) -> u16 {
        let hi = bus.read(master, addr);
        let lo = bus.read(master, addr.wrapping_add(1));
        u16::from_be_bytes([hi, lo])
    }

    #[inline]
    pub(crate) fn write_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        addr: u16,
        value: u16,
    ) {
        let [hi, lo] = value.to_be_bytes();
        bus.write(master, addr, hi);
        bus.write(master, addr.wrapping_add(1), lo);
    }

    #[inline]
    fn fetch_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let word = self.read_word(bus, master, self.pc);
        self.pc = self.pc.wrapping_add(2);
        word
    }

    /// Resolve the operand address for `mode`, consuming operand bytes.
    ///
    /// Immediate modes resolve to the operand bytes themselves. Inherent and
    /// relative modes resolve to 0; branches fetch their own offsets.
    pub(crate) fn effective_address<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        mode: Mode,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        match mode {
            Mode::Inherent | Mode::Relative8 | Mode::Relative16 => 0,
            Mode::Immediate8 => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            Mode::Immediate16 => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(2);
                addr
            }
            Mode::Direct => {
                let lo = self.fetch_byte(bus, master);
                u16::from_be_bytes([self.dp, lo])
            }
            Mode::Extended => self.fetch_word(bus, master),
            Mode::Indexed => self.indexed_address(bus, master),
        }
    }

    #[inline]
    fn index_register(&mut self, post: u8) -> &mut u16 {
        match post & 0x60 {
            0x00 => &mut self.x,
            0x20 => &mut self.y,
            0x40 => &mut self.u,
            _ => &mut self.s,
        }
    }

    /// Decode an indexed postbyte and return the effective address.
    ///
    /// Postbytes with bit 7 clear carry a 5-bit signed offset. Otherwise the
    /// low nibble selects the sub-mode and bit 4 adds indirection. Patterns
    /// that have no documented meaning fold onto `,R` or `[,R]`.
    fn indexed_address<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let post = self.fetch_byte(bus, master);

        if post & 0x80 == 0 {
            let mut offset = (post & 0x1F) as i16;
            if offset & 0x10 != 0 {
                offset -= 0x20;
            }
            self.extra += 1;
            let base = *self.index_register(post);
            return base.wrapping_add(offset as u16);
        }

        let (addr, extra) = match post & 0x9F {
            // ,R+  ,R++  ,-R  ,--R
            0x80 => {
                let r = self.index_register(post);
                let addr = *r;
                *r = r.wrapping_add(1);
                (addr, 2)
            }
            0x81 => {
                let r = self.index_register(post);
                let addr = *r;
                *r = r.wrapping_add(2);
                (addr, 3)
            }
            0x82 => {
                let r = self.index_register(post);
                *r = r.wrapping_sub(1);
                (*r, 2)
            }
            0x83 => {
                let r = self.index_register(post);
                *r = r.wrapping_sub(2);
                (*r, 3)
            }
            // ,R (and undefined folds)
            0x84 | 0x87 | 0x8A | 0x8E | 0x8F => (*self.index_register(post), 0),
            0x85 => {
                let base = *self.index_register(post);
                (base.wrapping_add(self.b as i8 as u16), 1)
            }
            0x86 => {
                let base = *self.index_register(post);
                (base.wrapping_add(self.a as i8 as u16), 1)
            }
            0x88 => {
                let offset = self.fetch_byte(bus, master) as i8 as u16;
                (self.index_register(post).wrapping_add(offset), 1)
            }
            0x89 => {
                let offset = self.fetch_word(bus, master);
                (self.index_register(post).wrapping_add(offset), 4)
            }
            0x8B => {
                let base = *self.index_register(post);
                (base.wrapping_add(self.get_d()), 4)
            }
            0x8C => {
                let offset = self.fetch_byte(bus, master) as i8 as u16;
                (self.pc.wrapping_add(offset), 1)
            }
            0x8D => {
                let offset = self.fetch_word(bus, master);
                (self.pc.wrapping_add(offset), 5)
            }

            // Indirect forms: the computed address points at the operand address.
            0x91 => {
                let r = self.index_register(post);
                let ptr = *r;
                *r = r.wrapping_add(2);
                (self.read_word(bus, master, ptr), 6)
            }
            0x93 => {
                let r = self.index_register(post);
                *r = r.wrapping_sub(2);
                let ptr = *r;
                (self.read_word(bus, master, ptr), 6)
            }
            0x94 | 0x90 | 0x92 | 0x97 | 0x9A | 0x9E => {
                let ptr = *self.index_register(post);
                (self.read_word(bus, master, ptr), 3)
            }
            0x95 => {
                let offset = self.b as i8 as u16;
                let ptr = self.index_register(post).wrapping_add(offset);
                (self.read_word(bus, master, ptr), 4)
            }
            0x96 => {
                let offset = self.a as i8 as u16;
                let ptr = self.index_register(post).wrapping_add(offset);
                (self.read_word(bus, master, ptr), 4)
            }
            0x98 => {
                let offset = self.fetch_byte(bus, master) as i8 as u16;
                let ptr = self.index_register(post).wrapping_add(offset);
                (self.read_word(bus, master, ptr), 4)
            }
            0x99 => {
                let offset = self.fetch_word(bus, master);
                let ptr = self.index_register(post).wrapping_add(offset);
                (self.read_word(bus, master, ptr), 7)
            }
            0x9B => {
                let offset = self.get_d();
                let ptr = self.index_register(post).wrapping_add(offset);
                (self.read_word(bus, master, ptr), 7)
            }
            0x9C => {
                let offset = self.fetch_byte(bus, master) as i8 as u16;
                let ptr = self.pc.wrapping_add(offset);
                (self.read_word(bus, master, ptr), 4)
            }
            0x9D => {
                let offset = self.fetch_word(bus, master);
                let ptr = self.pc.wrapping_add(offset);
                (self.read_word(bus, master, ptr), 8)
            }
            // [n16]
            _ => {
                let ptr = self.fetch_word(bus, master);
                (self.read_word(bus, master, ptr), 5)
            }
        };

        self.extra += extra;
        addr
    }
}
