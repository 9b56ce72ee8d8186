use moto_core::core::{Bus, BusMaster, bus::InterruptState};
use moto_core::device::{Mc6846, SoundDac};

use super::joystick::Joystick;
use super::keyboard::{KeyAction, Keyboard};
use super::memory::{
    Banks, CARTRIDGE_SIZE, CartType, MemoryMap, PALETTE_STAGING_SIZE, PORT_COUNT, RAM_SIZE, map_for,
};
use super::model::Model;
use super::peripheral::{FloppyDrive, Pen, Printer, TapeDeck};
use super::scheduler::Scan;
use super::video::{DEFAULT_PALETTE, VideoDecoder};

/// Monitor address of the TO8 keyboard scancode mailbox.
const TO8_KEY_CODE: usize = 0x30F8;
/// Monitor address of the TO8 CTRL flag.
const TO8_KEY_CTRL: usize = 0x3125;

/// ROM images of the current model, patched in place at hard reset.
#[derive(Clone, Default)]
pub struct SystemRoms {
    pub basic: Vec<u8>,
    pub monitor: Vec<u8>,
    /// Floppy controller ROM of the MO models.
    pub disk: Vec<u8>,
}

/// Everything the CPU sees through the bus: memories, the I/O register
/// file, the gate array, the timer and the peripherals.
pub struct Board {
    pub model: Model,
    pub(crate) map: &'static dyn MemoryMap,

    pub ram: Vec<u8>,
    pub cartridge: Vec<u8>,
    pub roms: SystemRoms,
    pub port: [u8; PORT_COUNT],
    pub palette_staging: [u8; PALETTE_STAGING_SIZE],

    pub banks: Banks,
    /// Offset of the displayed video page in RAM.
    pub display_page: usize,
    pub border: u8,
    pub carflags: u8,
    pub cartype: CartType,

    pub video: VideoDecoder,
    pub scan: Scan,
    pub timer: Mc6846,
    pub dac: SoundDac,
    pub keyboard: Keyboard,
    pub joystick: Joystick,
    pub pen: Pen,

    pub floppy: FloppyDrive,
    pub tape: TapeDeck,
    pub printer: Printer,

    /// Address of the instruction being executed.
    pub instr_pc: u16,
    /// IRQ input of the CPU, driven by the 6846 on the TO models.
    pub irq_line: bool,
}

impl Board {
    pub fn new(model: Model) -> Self {
        let mut board = Self {
            model,
            map: map_for(model.family()),
            ram: vec![0; RAM_SIZE],
            cartridge: vec![0; CARTRIDGE_SIZE],
            roms: SystemRoms::default(),
            port: [0; PORT_COUNT],
            palette_staging: [0; PALETTE_STAGING_SIZE],
            banks: Banks::default(),
            display_page: 0,
            border: 0,
            carflags: 0,
            cartype: CartType::Simple,
            video: VideoDecoder::new(),
            scan: Scan::default(),
            timer: Mc6846::new(),
            dac: SoundDac::new(),
            keyboard: Keyboard::new(),
            joystick: Joystick::new(),
            pen: Pen::default(),
            floppy: FloppyDrive::default(),
            tape: TapeDeck::new(),
            printer: Printer::default(),
            instr_pc: 0,
            irq_line: false,
        };
        board.attach_family();
        board
    }

    /// Power-on RAM contents: alternating runs of 128 bytes of 0x00 and 0xFF.
    pub fn fill_ram_pattern(&mut self, len: usize) {
        for (i, byte) in self.ram.iter_mut().take(len).enumerate() {
            *byte = if i & 0x80 != 0 { 0xFF } else { 0x00 };
        }
    }

    /// Default palette, in the decoder and in the staging buffer the
    /// palette register reads back from.
    pub fn init_palette(&mut self) {
        for (i, &(r, g, b)) in DEFAULT_PALETTE.iter().enumerate() {
            self.palette_staging[2 * i] = (g << 4) | r;
            self.palette_staging[2 * i + 1] = b;
            self.video.set_palette(i, r, g, b);
        }
    }

    /// Apply what the keyboard hardware does for a key event.
    pub(crate) fn apply_key_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::AllReleased => {
                self.port[0x08] = 0x00;
                self.timer.clear_keyboard_irq();
            }
            KeyAction::Scancode { code, ctrl } => {
                // The monitor's keyboard routine is skipped; the key goes
                // straight to its mailbox.
                if let Some(slot) = self.roms.monitor.get_mut(TO8_KEY_CODE) {
                    *slot = code;
                }
                if let Some(slot) = self.roms.monitor.get_mut(TO8_KEY_CTRL) {
                    *slot = ctrl as u8;
                }
                self.port[0x08] |= 0x01;
                self.timer.raise_keyboard_irq();
                self.irq_line = true;
            }
            KeyAction::Ascii(code) => {
                self.port[0x08] = 0x01;
                self.port[0x1E] = 0x01;
                self.port[0x1F] = code;
            }
        }
    }
}

impl Bus for Board {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        let map = self.map;
        map.read(self, addr)
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        let map = self.map;
        map.write(self, addr, data);
    }

    fn is_halted_for(&self, _master: BusMaster) -> bool {
        false
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState {
            irq: self.irq_line,
            ..InterruptState::default()
        }
    }
}
