//! Peripherals reached through the monitor's trap opcodes.
//!
//! The Thomson monitors call floppy, tape, pen and printer services through
//! opcodes with no 6809 meaning. The CPU reports them as a trap and
//! [`dispatch`] performs the service directly: it reads its parameters
//! from the CPU registers and the monitor work area, and answers the same
//! way. Errors go back through the monitor's convention, an error number
//! at 0x604E and the carry flag.

pub mod disk;
pub mod pen;
pub mod printer;
pub mod tape;

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use moto_core::core::{Bus, BusMaster};
use moto_core::cpu::M6809;
use moto_core::cpu::m6809::CcFlag;

use self::disk::{DiskError, SectorAddress};
use super::board::Board;

pub use disk::FloppyDrive;
pub use pen::Pen;
pub use printer::Printer;
pub use tape::TapeDeck;

/// Cycles charged for a serviced trap.
pub const TRAP_CYCLES: u32 = 64;

// Monitor work area used by the floppy calls.
const DISK_UNIT: u16 = 0x6049;
const DISK_TRACK_HIGH: u16 = 0x604A;
const DISK_TRACK: u16 = 0x604B;
const DISK_SECTOR: u16 = 0x604C;
const DISK_ERROR: u16 = 0x604E;
const DISK_BUFFER: u16 = 0x604F;
/// Tape byte being assembled by the monitor's bit reads.
const TAPE_BYTE: u16 = 0x2045;
const MOUSE_Y: u16 = 0x60D6;
const MOUSE_X: u16 = 0x60D8;

/// Work left for the machine after a trap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Followup {
    Continue,
    /// Tape missing, exhausted or refused: restart the program.
    InitProgram,
}

/// Run the service behind a trap code.
pub fn dispatch(code: u16, cpu: &mut M6809, board: &mut Board) -> Followup {
    match code {
        0x14 => read_sector(cpu, board),
        0x15 => write_sector(cpu, board),
        0x18 => format_disk(cpu, board),
        0x41 => return read_tape_bit(cpu, board),
        0x42 => return read_tape_byte(cpu, board),
        0x45 => return write_tape_byte(cpu, board),
        0x4B => read_pen(cpu, board, false),
        0x4E => read_pen(cpu, board, true),
        0x51 => {
            if board.printer.print(cpu.b) {
                cpu.cc &= !(CcFlag::C as u8);
            }
        }
        0x52 => {
            cpu.a = 0x03;
            if board.pen.button {
                cpu.a = 0x00;
                cpu.cc |= CcFlag::C as u8 | CcFlag::Z as u8;
            }
        }
        _ => log::warn!("illegal opcode {code:#06X} at {:#06X}", board.instr_pc),
    }
    Followup::Continue
}

fn peek(board: &mut Board, addr: u16) -> u8 {
    board.read(BusMaster::Dma, addr)
}

fn poke(board: &mut Board, addr: u16, data: u8) {
    board.write(BusMaster::Dma, addr, data);
}

fn poke_word(board: &mut Board, addr: u16, data: u16) {
    let [high, low] = data.to_be_bytes();
    poke(board, addr, high);
    poke(board, addr.wrapping_add(1), low);
}

fn disk_error(cpu: &mut M6809, board: &mut Board, error: DiskError) {
    log::debug!("disk error {}", error.code());
    poke(board, DISK_ERROR, error.code() - 1);
    cpu.cc |= CcFlag::C as u8;
}

/// Sector coordinates from the work area. Only one side per unit exists,
/// so a non-zero high track byte is an I/O error.
fn sector_request(board: &mut Board) -> Result<SectorAddress, DiskError> {
    let unit = peek(board, DISK_UNIT);
    if peek(board, DISK_TRACK_HIGH) != 0 {
        return Err(DiskError::Io);
    }
    let at = SectorAddress {
        unit,
        track: peek(board, DISK_TRACK),
        sector: peek(board, DISK_SECTOR),
    };
    if at.is_valid() { Ok(at) } else { Err(DiskError::Io) }
}

fn buffer_address(board: &mut Board) -> u16 {
    u16::from_be_bytes([peek(board, DISK_BUFFER), peek(board, DISK_BUFFER + 1)])
}

fn read_sector(cpu: &mut M6809, board: &mut Board) {
    let result = if board.floppy.is_loaded() {
        sector_request(board).and_then(|at| board.floppy.read(at))
    } else {
        Err(DiskError::NoDisk)
    };
    match result {
        Ok(data) => {
            let mut addr = buffer_address(board);
            for byte in data {
                poke(board, addr, byte);
                addr = addr.wrapping_add(1);
            }
        }
        Err(e) => disk_error(cpu, board, e),
    }
}

fn writable(board: &Board) -> Result<(), DiskError> {
    if !board.floppy.is_loaded() {
        Err(DiskError::NoDisk)
    } else if board.floppy.is_protected() {
        Err(DiskError::Protected)
    } else {
        Ok(())
    }
}

fn write_sector(cpu: &mut M6809, board: &mut Board) {
    let result = writable(board).and_then(|()| sector_request(board)).and_then(|at| {
        let start = buffer_address(board);
        let data: Vec<u8> = (0..disk::SECTOR_SIZE as u16)
            .map(|i| peek(board, start.wrapping_add(i)))
            .collect();
        board.floppy.write(at, &data)
    });
    if let Err(e) = result {
        disk_error(cpu, board, e);
    }
}

fn format_disk(cpu: &mut M6809, board: &mut Board) {
    let result = writable(board).and_then(|()| {
        let unit = peek(board, DISK_UNIT);
        board.floppy.format(unit)
    });
    if let Err(e) = result {
        disk_error(cpu, board, e);
    }
}

fn read_tape_byte(cpu: &mut M6809, board: &mut Board) -> Followup {
    let Some(byte) = board.tape.read_byte() else {
        return Followup::InitProgram;
    };
    cpu.a = byte;
    board.tape.octet = byte;
    board.tape.bit_mask = 0;
    poke(board, TAPE_BYTE, byte);
    Followup::Continue
}

/// Shift the next tape bit into the byte the monitor assembles at 0x2045.
fn read_tape_bit(cpu: &mut M6809, board: &mut Board) -> Followup {
    let assembled = peek(board, TAPE_BYTE) << 1;
    if board.tape.bit_mask == 0 {
        if read_tape_byte(cpu, board) == Followup::InitProgram {
            return Followup::InitProgram;
        }
        board.tape.bit_mask = 0x80;
    }
    let bit = board.tape.octet & board.tape.bit_mask != 0;
    cpu.a = if bit { 0xFF } else { 0x00 };
    poke(board, TAPE_BYTE, assembled | bit as u8);
    board.tape.bit_mask >>= 1;
    Followup::Continue
}

fn write_tape_byte(cpu: &mut M6809, board: &mut Board) -> Followup {
    if !board.tape.write_byte(cpu.a) {
        return Followup::InitProgram;
    }
    poke(board, TAPE_BYTE, 0);
    Followup::Continue
}

/// Pen or mouse position. X is halved outside the 80-column mode.
fn read_pen(cpu: &mut M6809, board: &mut Board, mouse: bool) {
    let pen = board.pen;
    if !pen.on_screen() {
        cpu.cc |= CcFlag::C as u8;
        return;
    }
    let shift = if board.port[0x1C] == 0x2A { 0 } else { 1 };
    let x = (pen.x >> shift) as u16;
    let y = pen.y as u16;
    if mouse {
        poke_word(board, MOUSE_X, x);
        poke_word(board, MOUSE_Y, y);
    }
    cpu.x = x;
    cpu.y = y;
    cpu.cc &= !(CcFlag::C as u8);
}

// ---------------------------------------------------------------------------
// Image files
// ---------------------------------------------------------------------------

/// File behind an in-memory image. Writes to the image are mirrored to it.
pub(crate) struct ImageFile {
    file: Option<File>,
    read_only: bool,
}

impl ImageFile {
    /// No file: the image only lives in memory.
    pub(crate) fn detached() -> Self {
        Self {
            file: None,
            read_only: false,
        }
    }

    /// Read a whole image. A file that cannot be opened for writing is
    /// opened read-only.
    pub(crate) fn open(path: &Path) -> io::Result<(Vec<u8>, Self)> {
        let (mut file, read_only) = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => (file, false),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => (File::open(path)?, true),
            Err(e) => return Err(e),
        };
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok((
            data,
            Self {
                file: Some(file),
                read_only,
            },
        ))
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub(crate) fn write_at(&mut self, offset: usize, bytes: &[u8]) -> io::Result<()> {
        let Some(file) = &mut self.file else {
            return Ok(());
        };
        if self.read_only {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "image is read-only"));
        }
        file.seek(SeekFrom::Start(offset as u64))?;
        file.write_all(bytes)
    }
}
