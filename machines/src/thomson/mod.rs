//! Thomson TO7, TO7/70, TO8, TO8D, TO9, TO9+, MO5, MO6 and Olivetti PC128.
//!
//! One [`Thomson`] value emulates any of the nine models: a 6809 on a
//! [`Board`] whose memory map, keyboard handling and ROM set follow the
//! selected [`Model`]. The monitor ROMs reach the floppy, tape, pen and
//! printer through trap opcodes serviced by [`peripheral::dispatch`].

pub mod board;
pub mod joystick;
pub mod keyboard;
pub mod media;
pub mod memory;
pub mod model;
pub mod patch;
pub mod peripheral;
pub mod scheduler;
pub mod serializer;
pub mod video;

use std::path::Path;

use moto_core::core::machine::{InputButton, Machine, StateError};
use moto_core::core::BusMaster;
use moto_core::cpu::M6809;
use moto_core::device::SoundDac;

use crate::registry::MachineEntry;
use crate::rom_loader::{RomLoadError, RomSet};

pub use board::{Board, SystemRoms};
pub use media::{MediaError, MediaKind};
pub use model::{Family, Model};
pub use patch::{PatchTarget, RomPatch};

use self::joystick::AXIS_COUNT;
use self::keyboard::{KEY_COUNT, KeyStroke};
use self::memory::{CARTRIDGE_SIZE, CartType, PORT_COUNT, RAM_SIZE};
use self::peripheral::disk::SectorImage;
use self::peripheral::Printer;
use self::scheduler::CYCLES_PER_FRAME;
use self::video::{FRAME_HEIGHT, FRAME_WIDTH, VideoMode};

/// Input ids of the joystick axes; keyboard scancodes use ids below this.
pub const JOYSTICK_INPUT_BASE: u8 = 0x80;

/// Cartridges up to 16 KB sit in a single bank.
const SIMPLE_CARTRIDGE_MAX: usize = 0x4000;
/// Cartridge flags after an insertion: enabled, read-only, bank 0.
const CARTRIDGE_INSERTED: u8 = 0x04;
/// Cartridge flag bits kept by Init-Program.
const CARTRIDGE_KEPT_BITS: u8 = 0xEC;
/// RAM filled with the power-on pattern when a cartridge is inserted.
const CARTRIDGE_CLEARED_RAM: usize = 0xC000;

pub struct Thomson {
    pub(crate) cpu: M6809,
    pub(crate) board: Board,
    rom_set: RomSet,
    patches: Vec<RomPatch>,
    /// The cartridge slot holds the model's built-in MEMO7.
    builtin_cartridge: bool,
    /// Cycles the last frame ran past its budget.
    frame_overshoot: i32,
}

impl Thomson {
    /// Build a machine of the given model and power it on.
    pub fn new(rom_set: &RomSet, model: Model) -> Result<Self, RomLoadError> {
        let mut machine = Self {
            cpu: M6809::new(),
            board: Board::new(model),
            rom_set: rom_set.clone(),
            patches: Vec::new(),
            builtin_cartridge: false,
            frame_overshoot: 0,
        };
        machine.load_roms(model)?;
        machine.hard_reset();
        Ok(machine)
    }

    pub fn model(&self) -> Model {
        self.board.model
    }

    pub fn cpu(&self) -> &M6809 {
        &self.cpu
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Switch to another model: load its ROMs and hard reset. Nothing
    /// happens if the model is already selected.
    pub fn set_model(&mut self, model: Model) -> Result<(), RomLoadError> {
        if model == self.board.model {
            return Ok(());
        }
        self.load_roms(model)?;
        log::info!("model switched to {model}");
        self.hard_reset();
        Ok(())
    }

    fn load_roms(&mut self, model: Model) -> Result<(), RomLoadError> {
        let layout = model.rom_layout();
        let roms = SystemRoms {
            basic: match &layout.basic {
                Some(image) => image.load(&self.rom_set)?,
                None => Vec::new(),
            },
            monitor: layout.monitor.load(&self.rom_set)?,
            disk: layout
                .disk
                .as_ref()
                .map(|image| image.load_or_blank(&self.rom_set))
                .unwrap_or_default(),
        };
        let builtin = match &layout.cartridge {
            Some(image) => Some(image.load_up_to(&self.rom_set)?),
            None => None,
        };

        self.board.roms = roms;
        self.board.model = model;
        self.board.attach_family();
        match builtin {
            Some(cartridge) => {
                self.place_cartridge(&cartridge);
                self.builtin_cartridge = true;
            }
            None if self.builtin_cartridge => {
                self.board.carflags = 0;
                self.builtin_cartridge = false;
            }
            None => {}
        }
        Ok(())
    }

    /// ROM patches re-applied at every hard reset.
    pub fn set_patches(&mut self, patches: Vec<RomPatch>) {
        self.patches = patches;
    }

    /// Power-on: memories, registers, ROM patches, timing and palette,
    /// then Init-Program.
    pub fn hard_reset(&mut self) {
        let board = &mut self.board;
        board.fill_ram_pattern(RAM_SIZE);
        board.port = [0; PORT_COUNT];
        if board.carflags == 0 {
            board.cartridge.fill(0);
        }
        board.tape.rewind();

        for patch in &self.patches {
            patch.apply(&mut board.roms);
        }
        if board.model.has_date_patch() {
            patch::apply_date(&mut board.roms.basic);
        }

        board.timer.reset();
        board.scan.reset();
        board.init_palette();
        board.video.reset_position();
        self.init_program();

        let board = &mut self.board;
        board.timer.reset();
        board.dac = SoundDac::new();
        board.pen.button = false;
        board.keyboard.set_capslock(true);
        self.frame_overshoot = 0;
    }

    /// Restart the program in memory: keys released, joysticks centered,
    /// family windows re-selected and the CPU reset. Media stay inserted.
    pub fn init_program(&mut self) {
        let board = &mut self.board;
        board.keyboard.release_all();
        board.joystick.center();
        board.carflags &= CARTRIDGE_KEPT_BITS;
        board.video.set_mode(VideoMode::To320x16);

        board.attach_family();
        let map = board.map;
        map.init_program(board);
        map.select_video_ram(board);
        map.select_rom_bank(board);

        board.irq_line = false;
        self.cpu.reset(&mut self.board, BusMaster::Cpu(0));
    }

    // -- Input ---------------------------------------------------------------

    /// Key press or release by scancode (0x00-0x53).
    pub fn key(&mut self, code: u8, down: bool) {
        let model = self.board.model;
        if let Some(action) = self.board.keyboard.event(model, code, down) {
            self.board.apply_key_action(action);
        }
    }

    /// Joystick axis: 0-7 directions, 8-9 fire buttons.
    pub fn joystick(&mut self, axis: u8, on: bool) {
        self.board.joystick.set(axis, on);
    }

    /// Light pen or mouse position in 640x200 coordinates.
    pub fn set_pen(&mut self, x: i32, y: i32, button: bool) {
        self.board.pen.x = x;
        self.board.pen.y = y;
        self.board.pen.button = button;
    }

    /// Physical keys to hit for some text on this model. Characters the
    /// keyboard cannot produce are skipped.
    pub fn key_strokes(&self, text: &str) -> Vec<KeyStroke> {
        let model = self.board.model;
        text.chars()
            .filter_map(|c| {
                let stroke = model.key_for_char(c);
                if stroke.is_none() {
                    log::warn!("no key for {c:?} on the {model}");
                }
                stroke
            })
            .collect()
    }

    /// Type text, holding each key for `frames` frames and releasing it
    /// for as long.
    pub fn type_text(&mut self, text: &str, frames: u32) {
        let shift = self.board.model.shift_key();
        for stroke in self.key_strokes(text) {
            if stroke.shift {
                self.key(shift, true);
            }
            self.key(stroke.code, true);
            self.run_frames(frames);
            self.key(stroke.code, false);
            if stroke.shift {
                self.key(shift, false);
            }
            self.run_frames(frames);
        }
    }

    pub fn run_frames(&mut self, frames: u32) {
        for _ in 0..frames {
            self.run_frame();
        }
    }

    // -- Media ---------------------------------------------------------------

    /// Insert a tape, floppy or cartridge chosen by the file extension.
    pub fn insert_media(&mut self, path: &Path) -> Result<MediaKind, MediaError> {
        let kind = MediaKind::from_path(path)?;
        match kind {
            MediaKind::Tape => self.load_tape(path)?,
            MediaKind::Floppy => self.load_floppy(path)?,
            MediaKind::Cartridge => self.load_cartridge(path)?,
        }
        Ok(kind)
    }

    pub fn load_tape(&mut self, path: &Path) -> Result<(), MediaError> {
        self.board.tape.load(path)
    }

    pub fn insert_tape(&mut self, data: Vec<u8>) {
        self.board.tape.insert(data);
    }

    pub fn eject_tape(&mut self) {
        self.board.tape.eject();
    }

    pub fn tape_index(&self) -> usize {
        self.board.tape.index()
    }

    pub fn tape_index_max(&self) -> usize {
        self.board.tape.index_max()
    }

    pub fn seek_tape(&mut self, index: usize) {
        self.board.tape.seek(index);
    }

    pub fn tape_is_basic(&self) -> bool {
        self.board.tape.first_file_is_basic()
    }

    pub fn set_tape_protected(&mut self, protected: bool) {
        self.board.tape.set_protected(protected);
    }

    pub fn load_floppy(&mut self, path: &Path) -> Result<(), MediaError> {
        self.board.floppy.load(path)
    }

    pub fn insert_floppy(&mut self, image: Box<dyn SectorImage>) {
        self.board.floppy.insert(image);
    }

    pub fn eject_floppy(&mut self) {
        self.board.floppy.eject();
    }

    pub fn set_floppy_protected(&mut self, protected: bool) {
        self.board.floppy.set_protected(protected);
    }

    /// Load a cartridge dump and restart on it. A file that cannot be read
    /// empties the slot and hard resets.
    pub fn load_cartridge(&mut self, path: &Path) -> Result<(), MediaError> {
        match std::fs::read(path) {
            Ok(data) => {
                self.insert_cartridge(&data)?;
                log::info!("cartridge {} inserted", path.display());
                Ok(())
            }
            Err(e) => {
                self.eject_cartridge();
                Err(e.into())
            }
        }
    }

    pub fn insert_cartridge(&mut self, data: &[u8]) -> Result<(), MediaError> {
        if data.len() > CARTRIDGE_SIZE {
            return Err(MediaError::TooLarge {
                size: data.len(),
                max: CARTRIDGE_SIZE,
            });
        }
        self.place_cartridge(data);
        self.builtin_cartridge = false;
        self.init_program();
        Ok(())
    }

    fn place_cartridge(&mut self, data: &[u8]) {
        let board = &mut self.board;
        board.cartridge.fill(0);
        board.cartridge[..data.len()].copy_from_slice(data);
        board.fill_ram_pattern(CARTRIDGE_CLEARED_RAM);
        board.cartype = if data.len() > SIMPLE_CARTRIDGE_MAX {
            CartType::BankSwitched
        } else {
            CartType::Simple
        };
        board.carflags = CARTRIDGE_INSERTED;
    }

    pub fn eject_cartridge(&mut self) {
        self.board.carflags = 0;
        self.builtin_cartridge = false;
        self.hard_reset();
    }

    // -- Settings ------------------------------------------------------------

    /// Decode one frame out of `skip + 1`.
    pub fn set_frame_skip(&mut self, skip: u32) {
        self.board.scan.frame_skip = skip.min(i32::MAX as u32 - 1) as i32;
        self.board.scan.vbl = 0;
    }

    pub fn set_printer(&mut self, printer: Printer) {
        self.board.printer = printer;
    }

    /// Current speaker level as a signed 16-bit sample.
    pub fn sound_sample(&self) -> i16 {
        self.board.dac.sample_i16()
    }

    /// RGB24 frame, `FRAME_WIDTH * FRAME_HEIGHT * 3` bytes.
    pub fn frame_buffer(&self) -> &[u8] {
        self.board.video.frame()
    }
}

// ---------------------------------------------------------------------------
// Machine trait
// ---------------------------------------------------------------------------

macro_rules! input_map {
    (keys: [$($key:literal),* $(,)?], joystick: [$($axis:literal => $name:literal),* $(,)?] $(,)?) => {
        [
            $(InputButton { id: $key, name: concat!("Key ", stringify!($key)) },)*
            $(InputButton { id: JOYSTICK_INPUT_BASE + $axis, name: $name },)*
        ]
    };
}

static INPUT_MAP: [InputButton; KEY_COUNT + AXIS_COUNT as usize] = input_map! {
    keys: [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
        0x0E, 0x0F, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B,
        0x1C, 0x1D, 0x1E, 0x1F, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x28, 0x29,
        0x2A, 0x2B, 0x2C, 0x2D, 0x2E, 0x2F, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37,
        0x38, 0x39, 0x3A, 0x3B, 0x3C, 0x3D, 0x3E, 0x3F, 0x40, 0x41, 0x42, 0x43, 0x44, 0x45,
        0x46, 0x47, 0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4D, 0x4E, 0x4F, 0x50, 0x51, 0x52, 0x53,
    ],
    joystick: [
        0 => "Joy 1 Up",
        1 => "Joy 1 Down",
        2 => "Joy 1 Left",
        3 => "Joy 1 Right",
        4 => "Joy 2 Up",
        5 => "Joy 2 Down",
        6 => "Joy 2 Left",
        7 => "Joy 2 Right",
        8 => "Joy 1 Fire",
        9 => "Joy 2 Fire",
    ],
};

impl Machine for Thomson {
    fn display_size(&self) -> (u32, u32) {
        (FRAME_WIDTH as u32, FRAME_HEIGHT as u32)
    }

    fn run_frame(&mut self) {
        self.frame_overshoot = self.run(CYCLES_PER_FRAME - self.frame_overshoot);
    }

    fn render_frame(&self, buffer: &mut [u8]) {
        let frame = self.board.video.frame();
        let n = frame.len().min(buffer.len());
        buffer[..n].copy_from_slice(&frame[..n]);
    }

    fn set_input(&mut self, button: u8, pressed: bool) {
        if (button as usize) < KEY_COUNT {
            self.key(button, pressed);
        } else if (JOYSTICK_INPUT_BASE..JOYSTICK_INPUT_BASE + AXIS_COUNT).contains(&button) {
            self.joystick(button - JOYSTICK_INPUT_BASE, pressed);
        }
    }

    fn input_map(&self) -> &[InputButton] {
        &INPUT_MAP
    }

    fn reset(&mut self) {
        self.hard_reset();
    }

    fn audio_sample(&self) -> i16 {
        self.sound_sample()
    }

    fn set_pointer(&mut self, x: i32, y: i32, pressed: bool) {
        self.set_pen(x, y, pressed);
    }

    fn load_media(&mut self, path: &Path) -> std::io::Result<()> {
        self.insert_media(path)?;
        Ok(())
    }

    fn save_state(&self) -> Vec<u8> {
        self.serialize()
    }

    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        self.restore(data)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

macro_rules! register_model {
    ($create:ident, $model:expr) => {
        fn $create(rom_set: &RomSet) -> Result<Box<dyn Machine>, RomLoadError> {
            Ok(Box::new(Thomson::new(rom_set, $model)?))
        }

        inventory::submit! {
            MachineEntry::new($model.cli_name(), $model.display_name(), $model, $create)
        }
    };
}

register_model!(create_to8, Model::To8);
register_model!(create_to8d, Model::To8d);
register_model!(create_to9, Model::To9);
register_model!(create_to9p, Model::To9p);
register_model!(create_mo5, Model::Mo5);
register_model!(create_mo6, Model::Mo6);
register_model!(create_pc128, Model::Pc128);
register_model!(create_to7, Model::To7);
register_model!(create_to770, Model::To770);
