//! TO8, TO8D, TO9 and TO9+ address decoding.
//!
//! | Range         | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | 0x0000-0x3FFF | cartridge, BASIC bank or RAM page (halves swapped)     |
//! | 0x4000-0x5FFF | video RAM, colour or shape page                        |
//! | 0x6000-0x9FFF | fixed user RAM                                         |
//! | 0xA000-0xDFFF | switchable RAM bank                                    |
//! | 0xE000-0xFFFF | monitor ROM, I/O at 0xE7C0-0xE7FF                      |

use super::{Board, CART_BANK_MASK, MemoryMap, Region, Window};
use crate::thomson::model::Model;

pub struct ToMap;

pub static TO_MAP: ToMap = ToMap;

/// 0xE7E6 bit 5: RAM page mapped over the ROM space.
const RAM_OVER_ROM: u8 = 0x20;
/// 0xE7E6 bits 5-6: RAM over ROM, write enabled.
const RAM_OVER_ROM_WRITABLE: u8 = 0x60;

impl ToMap {
    /// Side-effect free view of the address space, for instruction probing.
    fn peek(&self, board: &Board, addr: u16) -> u8 {
        let a = addr as i32;
        let overlay = board.port[0x26] & RAM_OVER_ROM != 0;
        match addr >> 12 {
            0x0 | 0x1 => board.load(board.banks.rom, if overlay { a + 0x2000 } else { a }),
            0x2 | 0x3 => board.load(board.banks.rom, if overlay { a - 0x2000 } else { a }),
            0x4 | 0x5 => board.load(board.banks.video, a),
            0x6..=0x9 => board.load(board.banks.user, a),
            0xA..=0xD => board.load(board.banks.ram, a),
            _ if (0xE7C0..0xE800).contains(&addr) => board.port(addr),
            _ => board.load(board.banks.system, a),
        }
    }

    /// Floppy controller registers. Only the status bits some protections
    /// poll are answered; 0xE7D3 recognizes `LDB $03,X / CMPB #n` and
    /// `LDA $03,X / CMPA #n` at the current instruction and returns `n`.
    fn floppy_controller(&self, board: &Board, addr: u16) -> u8 {
        match addr {
            0xE7D0 => {
                if board.port[0x10] & 0x03 != 0 {
                    0x82
                } else {
                    0x80
                }
            }
            0xE7D1 => 0x4A,
            0xE7D3 => {
                let pc = board.instr_pc;
                let op = self.peek(board, pc);
                let offset = self.peek(board, pc.wrapping_add(1));
                let compare = self.peek(board, pc.wrapping_add(2));
                let expected = match op {
                    0xE6 => 0xC1,
                    0xA6 => 0x81,
                    _ => return board.port(addr),
                };
                if offset == 0x03 && compare == expected {
                    self.peek(board, pc.wrapping_add(3))
                } else {
                    board.port(addr)
                }
            }
            _ => board.port(addr),
        }
    }
}

impl MemoryMap for ToMap {
    fn read(&self, board: &mut Board, addr: u16) -> u8 {
        let a = addr as i32;
        let overlay = board.port[0x26] & RAM_OVER_ROM != 0;
        match addr >> 12 {
            // The two 8 KB halves are swapped when RAM overlays the ROM.
            0x0 | 0x1 => board.load(board.banks.rom, if overlay { a + 0x2000 } else { a }),
            0x2 | 0x3 => board.load(board.banks.rom, if overlay { a - 0x2000 } else { a }),
            0x4 | 0x5 => board.load(board.banks.video, a),
            0x6..=0x9 => board.load(board.banks.user, a),
            0xA..=0xD => board.load(board.banks.ram, a),
            0xE => match addr {
                0xE7C0 => board.timer.read_status(),
                0xE7C3 => board.port[0x03] | 0x80 | ((board.pen.button as u8) << 1),
                0xE7C5 => board.timer.control(),
                0xE7C6 => board.timer.read_counter_high(),
                0xE7C7 => board.timer.read_counter_low(),
                0xE7CA => {
                    if board.scan.line_number < 200 {
                        0
                    } else {
                        2
                    }
                }
                0xE7CC => {
                    if board.port[0x0E] & 0x04 != 0 {
                        board.joystick.position()
                    } else {
                        board.port[0x0C]
                    }
                }
                0xE7CD => {
                    if board.port[0x0F] & 0x04 != 0 {
                        board.joystick.action() | board.dac.level()
                    } else {
                        board.port[0x0D]
                    }
                }
                0xE7CE => 0x04,
                0xE7D0..=0xE7D3 => self.floppy_controller(board, addr),
                0xE7DA => board.read_palette(),
                0xE7DF => {
                    // Reading the TO9 key code acknowledges it.
                    board.port[0x1E] = 0;
                    board.port[0x1F]
                }
                0xE7E4 => board.port[0x1D] & 0xF0,
                0xE7E5 => board.port[0x25] & 0x1F,
                0xE7E6 => board.port[0x26] & 0x7F,
                0xE7E7 => (board.port[0x24] & 0x01) | board.scan.frame_sync() | board.scan.line_sync(),
                0xE7C0..=0xE7FF => board.port(addr),
                _ => board.load(board.banks.system, a),
            },
            _ => board.load(board.banks.system, a),
        }
    }

    fn write(&self, board: &mut Board, addr: u16, data: u8) {
        let a = addr as i32;
        let rom_control = board.port[0x26];
        match addr >> 12 {
            0x0 | 0x1 => {
                if board.model == Model::To9 {
                    board.switch_cartridge_bank(addr);
                    return;
                }
                if rom_control & RAM_OVER_ROM == 0 {
                    board.switch_cartridge_bank(addr);
                }
                if rom_control & RAM_OVER_ROM_WRITABLE == RAM_OVER_ROM_WRITABLE {
                    board.store(board.banks.rom, a + 0x2000, data);
                }
            }
            0x2 | 0x3 => {
                if rom_control & RAM_OVER_ROM_WRITABLE == RAM_OVER_ROM_WRITABLE {
                    board.store(board.banks.rom, a - 0x2000, data);
                }
            }
            0x4 | 0x5 => board.store(board.banks.video, a, data),
            0x6..=0x9 => board.store(board.banks.user, a, data),
            0xA..=0xD => board.store(board.banks.ram, a, data),
            0xE => match addr {
                0xE7C0 => board.timer.write_status(data),
                0xE7C1 => {
                    board.port[0x01] = data;
                    board.dac.set_muted(data & 0x08 != 0);
                }
                0xE7C3 => {
                    board.port[0x03] = data & 0x3D;
                    if data & 0x20 == 0 {
                        board.timer.clear_keyboard_irq();
                    }
                    self.select_video_ram(board);
                    self.select_rom_bank(board);
                }
                0xE7C5 => board.timer.write_control(data),
                0xE7C6 => board.timer.write_latch_high(data),
                0xE7C7 => board.timer.write_latch_low(data),
                0xE7C9 => {
                    board.port[0x09] = data;
                    self.select_ram_bank(board);
                }
                0xE7CD => {
                    if board.port[0x0F] & 0x04 != 0 {
                        board.dac.write(data);
                    } else {
                        board.port[0x0D] = data;
                    }
                }
                0xE7D8 => {}
                0xE7DA => board.write_palette(data),
                0xE7DC => board.select_video_mode(data),
                0xE7DD => board.set_page_and_border(data),
                0xE7E5 | 0xE7E7 => {
                    board.set_port(addr, data);
                    self.select_ram_bank(board);
                }
                0xE7E6 => {
                    board.port[0x26] = data;
                    self.select_rom_bank(board);
                }
                0xE7C0..=0xE7FF => board.set_port(addr, data),
                _ => {}
            },
            _ => {}
        }
    }

    fn select_video_ram(&self, board: &mut Board) {
        let page = (board.port[0x03] & 0x01) as i32;
        board.banks.video = Window::new(Region::Ram, -0x4000 + (page << 13));
        let system_bank = if board.model == Model::To9 {
            0
        } else {
            ((board.port[0x03] & 0x10) >> 4) as i32
        };
        board.banks.system = Window::new(Region::Monitor, -0xE000 + (system_bank << 13));
    }

    fn select_rom_bank(&self, board: &mut Board) {
        let bank = (board.carflags & CART_BANK_MASK) as i32;
        board.banks.rom = if board.model == Model::To9 {
            // PIA bits 4-5 select the slot: internal software or cartridge.
            match (board.port[0x03] & 0x30) >> 4 {
                0 => Window::new(Region::Basic, bank << 14),
                1 => Window::new(Region::Basic, (4 + (bank & 1)) << 14),
                2 => Window::new(Region::Basic, (6 + (bank & 1)) << 14),
                _ => Window::new(Region::Cartridge, bank << 14),
            }
        } else if board.port[0x26] & RAM_OVER_ROM != 0 {
            Window::new(Region::Ram, ((board.port[0x26] & 0x1F) as i32) << 14)
        } else if board.port[0x03] & 0x04 != 0 {
            Window::new(Region::Basic, bank << 14)
        } else {
            Window::new(Region::Cartridge, bank << 14)
        };
    }

    fn select_ram_bank(&self, board: &mut Board) {
        select_ram_bank_to(board);
    }

    fn init_program(&self, board: &mut Board) {
        board.set_page_and_border(board.port[0x1D]);
        board.port[0x09] = 0x0F;
        self.select_ram_bank(board);
    }
}

/// RAM bank at 0xA000: a gate array page (TO8 mode, 0xE7E5) or one of the
/// six TO7/70-compatible banks selected through the PIA at 0xE7C9.
pub(super) fn select_ram_bank_to(board: &mut Board) {
    let legacy_banking = matches!(board.model, Model::To9 | Model::To770);
    if board.port[0x27] & 0x10 != 0 && !legacy_banking {
        let page = (board.port[0x25] & 0x1F) as i32;
        board.banks.ram = Window::new(Region::Ram, -0xA000 + (page << 14));
        return;
    }
    let bank = match board.port[0x09] & 0xF8 {
        0x08 => 0,
        0x10 => 1,
        0xE0 => 2,
        0xA0 => {
            if legacy_banking {
                4
            } else {
                3
            }
        }
        0x60 => {
            if legacy_banking {
                3
            } else {
                4
            }
        }
        0x20 => 5,
        _ => return,
    };
    // Bank n is RAM page n + 2.
    board.banks.ram = Window::new(Region::Ram, -0x2000 + (bank << 14));
}
