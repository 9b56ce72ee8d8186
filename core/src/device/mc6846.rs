/// MC6846 timer and composite status, as wired on the Thomson TO family.
///
/// Only the parts the TO monitors use are modelled: the 16-bit programmable
/// timer with its latch, the timer control register (TCR) and the composite
/// status register (CSR). The CSR carries three interrupt flags:
///
/// | Bit | Meaning                                  |
/// |-----|------------------------------------------|
/// | 0   | timer interrupt                          |
/// | 1   | CP1 interrupt (keyboard)                 |
/// | 2   | CP2 interrupt                            |
/// | 7   | composite flag, set if any of 0-2 is set |
///
/// The counter is kept in eighths of a count so the direct mode (one count
/// per cycle) and the prescaled mode (TCR bit 2, one count every 8 cycles)
/// share one representation. Register reads return `counter >> 11` and `counter >> 3`.
pub struct Mc6846 {
    csr: u8,
    tcr: u8,
    counter: i32,
    latch: i32,
    timer_irq_cycles: i32,    // cycles left before the timer IRQ flag drops
    keyboard_irq_cycles: i32, // cycles left before the keyboard IRQ flag drops
}

/// Cycles the timer interrupt flag stays raised after a time-out.
pub const TIMER_IRQ_CYCLES: i32 = 100;
/// Cycles a key press keeps the keyboard interrupt flag raised.
pub const KEYBOARD_IRQ_CYCLES: i32 = 500_000;

const TCR_HOLD: u8 = 0x01; // preset: counter held at the latch value
const TCR_PRESCALE: u8 = 0x04; // one count every 8 cycles

/// Change of the IRQ output requested by a `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqChange {
    Raise,
    Clear,
}

impl Default for Mc6846 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc6846 {
    /// Power-on state: counter and latch at 0xFFFF, all flags clear.
    pub fn new() -> Self {
        Self {
            csr: 0,
            tcr: 0,
            counter: 0xFFFF,
            latch: 0xFFFF,
            timer_irq_cycles: 0,
            keyboard_irq_cycles: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// CSR as seen by the CPU: the composite bit reads set whenever any
    /// other bit is.
    pub fn read_status(&self) -> u8 {
        if self.csr != 0 { self.csr | 0x80 } else { 0 }
    }

    /// Raw CSR value, for save states.
    pub fn status(&self) -> u8 {
        self.csr
    }

    pub fn write_status(&mut self, value: u8) {
        self.csr = value;
    }

    pub fn control(&self) -> u8 {
        self.tcr
    }

    /// TCR write. Setting bit 0 presets the counter from the latch.
    pub fn write_control(&mut self, value: u8) {
        self.tcr = value;
        if value & TCR_HOLD != 0 {
            self.counter = self.latch << 3;
        }
    }

    pub fn write_latch_high(&mut self, value: u8) {
        self.latch = (self.latch & 0x00FF) | ((value as i32) << 8);
    }

    pub fn write_latch_low(&mut self, value: u8) {
        self.latch = (self.latch & 0xFF00) | value as i32;
    }

    pub fn read_counter_high(&self) -> u8 {
        (self.counter >> 11) as u8
    }

    pub fn read_counter_low(&self) -> u8 {
        (self.counter >> 3) as u8
    }

    /// Flag a key press: CP1 and composite bits set for `KEYBOARD_IRQ_CYCLES`.
    pub fn raise_keyboard_irq(&mut self) {
        self.csr |= 0x82;
        self.keyboard_irq_cycles = KEYBOARD_IRQ_CYCLES;
    }

    /// Key acknowledged or released: let the CP1 flag drop on the next tick.
    pub fn clear_keyboard_irq(&mut self) {
        self.keyboard_irq_cycles = 0;
    }

    /// Advance by `cycles` CPU cycles.
    ///
    /// Returns `Some(Clear)` when every interrupt flag has dropped and
    /// `Some(Raise)` when the counter timed out (which wins over a clear in
    /// the same call).
    pub fn tick(&mut self, cycles: u32) -> Option<IrqChange> {
        let cycles = cycles as i32;
        let mut change = None;

        if self.timer_irq_cycles > 0 {
            self.timer_irq_cycles -= cycles;
        }
        if self.timer_irq_cycles <= 0 {
            self.csr &= !0x01;
        }
        if self.keyboard_irq_cycles > 0 {
            self.keyboard_irq_cycles -= cycles;
        }
        if self.keyboard_irq_cycles <= 0 {
            self.csr &= !0x02;
        }
        if self.csr & 0x07 == 0 {
            self.csr &= 0x7F;
            change = Some(IrqChange::Clear);
        }

        if self.tcr & TCR_HOLD == 0 {
            self.counter -= if self.tcr & TCR_PRESCALE != 0 {
                cycles
            } else {
                cycles << 3
            };
        }
        if self.counter <= 5 {
            self.timer_irq_cycles = TIMER_IRQ_CYCLES;
            self.counter = self.latch << 3;
            self.csr |= 0x81;
            change = Some(IrqChange::Raise);
        }
        change
    }

    /// Counter, latch, keyboard window and timer window, in save-state order.
    pub fn save_counters(&self) -> [i32; 4] {
        [
            self.counter,
            self.latch,
            self.keyboard_irq_cycles,
            self.timer_irq_cycles,
        ]
    }

    pub fn load_counters(&mut self, values: [i32; 4]) {
        let [counter, latch, keyboard, timer] = values;
        self.counter = counter;
        self.latch = latch;
        self.keyboard_irq_cycles = keyboard;
        self.timer_irq_cycles = timer;
    }
}
