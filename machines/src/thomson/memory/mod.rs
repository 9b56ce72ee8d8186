//! Address decoding for the three Thomson families.
//!
//! Every CPU access goes through the [`MemoryMap`] of the current family.
//! Banked areas are described by [`Window`]s: a backing region plus a base
//! added to the 16-bit address, re-resolved whenever a bank register is
//! written. An index that falls outside the backing storage reads as 0xFF
//! and ignores writes.

mod mo;
mod to;
mod to7;

use super::board::Board;
use super::model::{Family, Model};
use super::video::VideoMode;

pub use mo::MO_MAP;
pub use to::TO_MAP;
pub use to7::TO7_MAP;

/// Size of the system RAM.
pub const RAM_SIZE: usize = 0x80000;
/// Cartridge space: four 16 KB banks.
pub const CARTRIDGE_SIZE: usize = 0x10000;
/// I/O register file, addressed by `addr & 0x3F`.
pub const PORT_COUNT: usize = 0x40;
/// Palette staging buffer (16 colours, two bytes each).
pub const PALETTE_STAGING_SIZE: usize = 32;

/// Cartridge flag bits (`carflags`).
pub const CART_BANK_MASK: u8 = 0x03;
pub const CART_ENABLED: u8 = 0x04;
pub const CART_WRITABLE: u8 = 0x08;
pub const CART_OS9_BANK: u8 = 0x10;

/// Backing storage a window points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Ram,
    Cartridge,
    Basic,
    Monitor,
    DiskRom,
}

/// A banked view: CPU address `a` maps to `region[base + a]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub region: Region,
    pub base: i32,
}

impl Window {
    pub const fn new(region: Region, base: i32) -> Self {
        Self { region, base }
    }

    fn index(self, addr: i32) -> Option<usize> {
        usize::try_from(self.base + addr).ok()
    }
}

/// The banked windows of the address space.
#[derive(Clone, Copy, Debug)]
pub struct Banks {
    /// Colour/shape video RAM page (TO: 0x4000, MO: 0x0000).
    pub video: Window,
    /// Fixed user RAM.
    pub user: Window,
    /// Switchable RAM bank (TO: 0xA000, MO6: 0x6000).
    pub ram: Window,
    /// Cartridge, BASIC or RAM-over-ROM (TO: 0x0000, MO: 0xB000).
    pub rom: Window,
    /// Monitor ROM (TO: 0xE000, TO7: 0xE800, MO: 0xF000).
    pub system: Window,
}

impl Default for Banks {
    fn default() -> Self {
        Self {
            video: Window::new(Region::Ram, 0),
            user: Window::new(Region::Ram, 0),
            ram: Window::new(Region::Ram, 0),
            rom: Window::new(Region::Cartridge, 0),
            system: Window::new(Region::Monitor, 0),
        }
    }
}

/// Cartridge mapper type, decided from the image size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CartType {
    /// Up to 16 KB.
    #[default]
    Simple,
    /// Bank switched by accesses at 0x0000-0x0003 (TO) or 0xBFFC-0xBFFF (MO).
    BankSwitched,
    /// OS-9 cartridge with an extra bank bit.
    Os9,
}

impl CartType {
    pub fn to_i32(self) -> i32 {
        match self {
            CartType::Simple => 0,
            CartType::BankSwitched => 1,
            CartType::Os9 => 2,
        }
    }
}

/// Read/write decoding of one family.
pub trait MemoryMap: Sync {
    fn read(&self, board: &mut Board, addr: u16) -> u8;
    fn write(&self, board: &mut Board, addr: u16, data: u8);

    /// Re-resolve the video page and the monitor window.
    fn select_video_ram(&self, board: &mut Board);
    /// Re-resolve the cartridge/ROM window.
    fn select_rom_bank(&self, board: &mut Board);
    /// Re-resolve the switchable RAM bank.
    fn select_ram_bank(&self, board: &mut Board);

    /// Family part of Init-Program: fixed windows and bank registers.
    fn init_program(&self, board: &mut Board);
}

pub fn map_for(family: Family) -> &'static dyn MemoryMap {
    match family {
        Family::To => &TO_MAP,
        Family::To7 => &TO7_MAP,
        Family::Mo => &MO_MAP,
    }
}

impl Board {
    fn region(&self, region: Region) -> &[u8] {
        match region {
            Region::Ram => &self.ram,
            Region::Cartridge => &self.cartridge,
            Region::Basic => &self.roms.basic,
            Region::Monitor => &self.roms.monitor,
            Region::DiskRom => &self.roms.disk,
        }
    }

    /// Read through a window; unbacked storage reads 0xFF.
    pub(crate) fn load(&self, window: Window, addr: i32) -> u8 {
        window
            .index(addr)
            .and_then(|i| self.region(window.region).get(i))
            .copied()
            .unwrap_or(0xFF)
    }

    /// Write through a window. ROM regions are read-only.
    pub(crate) fn store(&mut self, window: Window, addr: i32, data: u8) {
        let Some(i) = window.index(addr) else {
            return;
        };
        let slot = match window.region {
            Region::Ram => self.ram.get_mut(i),
            Region::Cartridge => self.cartridge.get_mut(i),
            Region::Basic | Region::Monitor | Region::DiskRom => None,
        };
        if let Some(slot) = slot {
            *slot = data;
        }
    }

    pub(crate) fn port(&self, addr: u16) -> u8 {
        self.port[addr as usize & 0x3F]
    }

    pub(crate) fn set_port(&mut self, addr: u16, data: u8) {
        self.port[addr as usize & 0x3F] = data;
    }

    /// Select the cartridge bank from the two low address bits.
    pub(crate) fn switch_cartridge_bank(&mut self, addr: u16) {
        self.carflags = (self.carflags & !CART_BANK_MASK) | (addr as u8 & CART_BANK_MASK);
        let map = self.map;
        map.select_rom_bank(self);
    }

    // -- Gate array registers shared by the TO8/TO9 and MO6 families --------

    /// Palette data register: bytes accumulate in the staging buffer and
    /// every second byte commits a colour (G:R then B).
    pub(crate) fn write_palette(&mut self, data: u8) {
        let i = self.port[0x1B] as usize & 0x1F;
        self.palette_staging[i] = data;
        self.port[0x1B] = ((i + 1) & 0x1F) as u8;
        if i & 1 != 0 {
            let green_red = self.palette_staging[i & 0x1E];
            self.video
                .set_palette(i >> 1, green_red & 0x0F, green_red >> 4, data & 0x0F);
        }
    }

    /// Palette data register read: auto-increments the staging index.
    pub(crate) fn read_palette(&mut self) -> u8 {
        let i = self.port[0x1B];
        self.port[0x1B] = i.wrapping_add(1);
        self.palette_staging[i as usize & 0x1F]
    }

    /// Video mode register.
    pub(crate) fn select_video_mode(&mut self, data: u8) {
        self.port[0x1C] = data;
        let mode = match data {
            0x21 => VideoMode::Bitmap4,
            0x2A => VideoMode::Col80,
            0x41 => VideoMode::Bitmap4Special,
            0x7B => VideoMode::Bitmap16,
            _ if self.model.is_mo() => VideoMode::Mo320x16,
            _ => VideoMode::To320x16,
        };
        log::debug!("video mode {data:#04X} -> {mode:?}");
        self.video.set_mode(mode);
    }

    /// Displayed page and border colour register.
    pub(crate) fn set_page_and_border(&mut self, data: u8) {
        self.port[0x1D] = data;
        self.display_page = ((data & 0xC0) as usize) << 8;
        self.border = data & 0x0F;
    }

    /// Windows and family accessors for the current model.
    pub(crate) fn attach_family(&mut self) {
        self.map = map_for(self.model.family());
        self.banks.user = match self.model.family() {
            Family::Mo => Window::new(Region::Ram, 0x2000),
            Family::To | Family::To7 => Window::new(Region::Ram, -0x2000),
        };
    }

    /// Re-resolve every window from the registers, after a state restore.
    pub(crate) fn reselect_banks(&mut self) {
        self.attach_family();
        let map = self.map;
        if self.model == Model::Mo5 {
            self.display_page = 0;
        } else {
            self.set_page_and_border(self.port[0x1D]);
            map.select_ram_bank(self);
        }
        map.select_video_ram(self);
        map.select_rom_bank(self);
    }
}
