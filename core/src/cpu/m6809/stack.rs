use super::table::Stack;
use super::{CcFlag, M6809, SyncState};
use crate::core::{Bus, BusMaster};

// PSH/PUL postbyte bits, pushed from the highest down.
const PUSH_PC: u8 = 0x80;
const PUSH_OTHER_STACK: u8 = 0x40; // U for PSHS/PULS, S for PSHU/PULU
const PUSH_Y: u8 = 0x20;
const PUSH_X: u8 = 0x10;
const PUSH_DP: u8 = 0x08;
const PUSH_B: u8 = 0x04;
const PUSH_A: u8 = 0x02;
const PUSH_CC: u8 = 0x01;

const PUSH_ALL: u8 = 0xFF;

impl M6809 {
    #[inline]
    fn stack_pointer(&mut self, stack: Stack) -> &mut u16 {
        match stack {
            Stack::S => &mut self.s,
            Stack::U => &mut self.u,
        }
    }

    #[inline]
    fn push_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        bus: &mut B,
        master: BusMaster,
        value: u8,
    ) {
        let sp = self.stack_pointer(stack);
        *sp = sp.wrapping_sub(1);
        let addr = *sp;
        bus.write(master, addr, value);
    }

    #[inline]
    fn pull_byte<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        bus: &mut B,
        master: BusMaster,
    ) -> u8 {
        let sp = self.stack_pointer(stack);
        let addr = *sp;
        *sp = sp.wrapping_add(1);
        bus.read(master, addr)
    }

    /// Push low byte first so the high byte lands at the lower address.
    fn push_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        bus: &mut B,
        master: BusMaster,
        value: u16,
    ) {
        let [hi, lo] = value.to_be_bytes();
        self.push_byte(stack, bus, master, lo);
        self.push_byte(stack, bus, master, hi);
    }

    fn pull_word<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        let hi = self.pull_byte(stack, bus, master);
        let lo = self.pull_byte(stack, bus, master);
        u16::from_be_bytes([hi, lo])
    }

    #[inline]
    pub(crate) fn push_word_s<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
        value: u16,
    ) {
        self.push_word(Stack::S, bus, master, value);
    }

    #[inline]
    pub(crate) fn pull_word_s<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) -> u16 {
        self.pull_word(Stack::S, bus, master)
    }

    /// PSHS / PSHU. Returns the number of bytes pushed.
    pub(crate) fn push<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        mask: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let mut bytes = 0;
        if mask & PUSH_PC != 0 {
            self.push_word(stack, bus, master, self.pc);
            bytes += 2;
        }
        if mask & PUSH_OTHER_STACK != 0 {
            let other = match stack {
                Stack::S => self.u,
                Stack::U => self.s,
            };
            self.push_word(stack, bus, master, other);
            bytes += 2;
        }
        if mask & PUSH_Y != 0 {
            self.push_word(stack, bus, master, self.y);
            bytes += 2;
        }
        if mask & PUSH_X != 0 {
            self.push_word(stack, bus, master, self.x);
            bytes += 2;
        }
        if mask & PUSH_DP != 0 {
            self.push_byte(stack, bus, master, self.dp);
            bytes += 1;
        }
        if mask & PUSH_B != 0 {
            self.push_byte(stack, bus, master, self.b);
            bytes += 1;
        }
        if mask & PUSH_A != 0 {
            self.push_byte(stack, bus, master, self.a);
            bytes += 1;
        }
        if mask & PUSH_CC != 0 {
            self.push_byte(stack, bus, master, self.cc);
            bytes += 1;
        }
        bytes
    }

    /// PULS / PULU, reverse order of `push`. Returns the number of bytes pulled.
    pub(crate) fn pull<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        stack: Stack,
        mask: u8,
        bus: &mut B,
        master: BusMaster,
    ) -> u32 {
        let mut bytes = 0;
        if mask & PUSH_CC != 0 {
            self.cc = self.pull_byte(stack, bus, master);
            bytes += 1;
        }
        if mask & PUSH_A != 0 {
            self.a = self.pull_byte(stack, bus, master);
            bytes += 1;
        }
        if mask & PUSH_B != 0 {
            self.b = self.pull_byte(stack, bus, master);
            bytes += 1;
        }
        if mask & PUSH_DP != 0 {
            self.dp = self.pull_byte(stack, bus, master);
            bytes += 1;
        }
        if mask & PUSH_X != 0 {
            self.x = self.pull_word(stack, bus, master);
            bytes += 2;
        }
        if mask & PUSH_Y != 0 {
            self.y = self.pull_word(stack, bus, master);
            bytes += 2;
        }
        if mask & PUSH_OTHER_STACK != 0 {
            let value = self.pull_word(stack, bus, master);
            match stack {
                Stack::S => self.u = value,
                Stack::U => self.s = value,
            }
            bytes += 2;
        }
        if mask & PUSH_PC != 0 {
            self.pc = self.pull_word(stack, bus, master);
            bytes += 2;
        }
        bytes
    }

    /// RTI: pull CC, then the rest of the frame if E is set (15 cycles), else
    /// just PC (6 cycles).
    pub(crate) fn rti<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.cc = self.pull_byte(Stack::S, bus, master);
        if self.flag(CcFlag::E) {
            self.pull(Stack::S, PUSH_ALL & !PUSH_CC, bus, master);
            self.extra += 9;
        } else {
            self.pc = self.pull_word(Stack::S, bus, master);
        }
    }

    /// SWI / SWI2 / SWI3. SWI sets both I and F; SWI2 and SWI3 leave the
    /// masks as they were.
    pub(crate) fn swi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        n: u8,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.cc |= CcFlag::E as u8;
        self.push(Stack::S, PUSH_ALL, bus, master);
        let vector = match n {
            2 => 0xFFF4,
            3 => 0xFFF2,
            _ => {
                self.cc |= CcFlag::I as u8 | CcFlag::F as u8;
                0xFFFA
            }
        };
        self.pc = self.read_word(bus, master, vector);
    }

    // --- Interrupt Entry ---
    // Each adds the pushed byte count to `extra`; step() adds the base 7.
    // A SYNC interrupted here completes when the handler returns to it.

    #[inline]
    pub(crate) fn release_sync(&mut self) {
        if self.sync == SyncState::Waiting {
            self.sync = SyncState::Released;
        }
    }

    pub(crate) fn enter_nmi<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.release_sync();
        self.cc |= CcFlag::E as u8;
        let bytes = self.push(Stack::S, PUSH_ALL, bus, master);
        self.extra += bytes;
        self.cc |= CcFlag::I as u8 | CcFlag::F as u8;
        self.pc = self.read_word(bus, master, 0xFFFC);
    }

    pub(crate) fn enter_firq<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.release_sync();
        self.cc &= !(CcFlag::E as u8);
        let bytes = self.push(Stack::S, PUSH_PC | PUSH_CC, bus, master);
        self.extra += bytes;
        self.cc |= CcFlag::I as u8 | CcFlag::F as u8;
        self.pc = self.read_word(bus, master, 0xFFF6);
    }

    pub(crate) fn enter_irq<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &mut self,
        bus: &mut B,
        master: BusMaster,
    ) {
        self.cc |= CcFlag::E as u8;
        let bytes = self.push(Stack::S, PUSH_ALL, bus, master);
        self.extra += bytes;
        self.cc |= CcFlag::I as u8;
        self.pc = self.read_word(bus, master, 0xFFF8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bus;
    use crate::core::bus::InterruptState;

    struct Ram([u8; 0x10000]);

    impl Bus for Ram {
        type Address = u16;
        type Data = u8;

        fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
            self.0[addr as usize]
        }
        fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
            self.0[addr as usize] = data;
        }
        fn is_halted_for(&self, _master: BusMaster) -> bool {
            false
        }
        fn check_interrupts(&self, _master: BusMaster) -> InterruptState {
            InterruptState::default()
        }
    }

    #[test]
    fn push_all_layout() {
        let mut ram = Ram([0; 0x10000]);
        let mut cpu = M6809::new();
        cpu.s = 0x1000;
        cpu.pc = 0x1234;
        cpu.u = 0x5678;
        cpu.a = 0xAA;
        cpu.cc = 0x0F;
        let bytes = cpu.push(Stack::S, PUSH_ALL, &mut ram, BusMaster::Cpu(0));
        assert_eq!(bytes, 12);
        assert_eq!(cpu.s, 0x0FF4);
        assert_eq!(ram.0[0x0FF4], 0x0F, "CC on top");
        assert_eq!(ram.0[0x0FF5], 0xAA, "A next");
        assert_eq!(&ram.0[0x0FFA..0x0FFC], &[0x56, 0x78]);
        assert_eq!(&ram.0[0x0FFE..0x1000], &[0x12, 0x34], "PC at the bottom");
    }

    #[test]
    fn pull_restores_push() {
        let mut ram = Ram([0; 0x10000]);
        let mut cpu = M6809::new();
        cpu.u = 0x2000;
        cpu.x = 0xBEEF;
        cpu.s = 0x4321;
        cpu.b = 0x42;
        cpu.push(Stack::U, PUSH_X | PUSH_OTHER_STACK | PUSH_B, &mut ram, BusMaster::Cpu(0));
        cpu.x = 0;
        cpu.s = 0;
        cpu.b = 0;
        cpu.pull(Stack::U, PUSH_X | PUSH_OTHER_STACK | PUSH_B, &mut ram, BusMaster::Cpu(0));
        assert_eq!((cpu.x, cpu.s, cpu.b, cpu.u), (0xBEEF, 0x4321, 0x42, 0x2000));
    }
}
