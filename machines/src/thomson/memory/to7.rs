//! TO7 and TO7/70 address decoding.
//!
//! 0x0000-0x3FFF is the MEMO7 cartridge slot, 0xE800-0xFFFF the monitor.
//! The TO7/70 adds banked RAM at 0xA000 selected through 0xE7C9; on the
//! TO7 that range is plain extension RAM. The keyboard is an 8x8 matrix
//! scanned through the system PIA.

use super::to::select_ram_bank_to;
use super::{Board, CART_BANK_MASK, MemoryMap, Region, Window};
use crate::thomson::model::Model;

pub struct To7Map;

pub static TO7_MAP: To7Map = To7Map;

impl To7Map {
    /// Column bits of the scanned matrix line, active low.
    fn keyboard_columns(&self, board: &Board) -> u8 {
        let line = if board.model == Model::To7 {
            // One output of port B is driven low; its position gives the line.
            let scan = !board.port[0x09];
            if scan == 0 {
                return 0xFF;
            }
            scan.leading_zeros() as usize
        } else {
            (board.port[0x09] & 0x07) as usize
        };
        let pressed = (0..8)
            .filter(|&column| board.keyboard.is_down(line * 8 + column))
            .fold(0u8, |acc, column| acc | 1 << column);
        !pressed
    }

    fn extension_window(&self, board: &Board) -> Window {
        if board.model == Model::To7 {
            board.banks.user
        } else {
            board.banks.ram
        }
    }
}

impl MemoryMap for To7Map {
    fn read(&self, board: &mut Board, addr: u16) -> u8 {
        let a = addr as i32;
        match addr >> 12 {
            0x0..=0x3 => board.load(board.banks.rom, a),
            0x4 | 0x5 => board.load(board.banks.video, a),
            0x6..=0x9 => board.load(board.banks.user, a),
            0xA..=0xD => board.load(self.extension_window(board), a),
            0xE => match addr {
                0xE7C0 => board.timer.read_status(),
                0xE7C3 => board.port[0x03] | 0x80 | ((board.pen.button as u8) << 1),
                0xE7C5 => board.timer.control(),
                0xE7C6 => board.timer.read_counter_high(),
                0xE7C7 => board.timer.read_counter_low(),
                0xE7C8 => self.keyboard_columns(board),
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
                0xE7C0..=0xE7FF => board.port(addr),
                // Floppy controller monitor space, not fitted.
                0xE000..=0xE7BF => 0,
                _ => board.load(board.banks.system, a),
            },
            _ => board.load(board.banks.system, a),
        }
    }

    fn write(&self, board: &mut Board, addr: u16, data: u8) {
        let a = addr as i32;
        match addr >> 12 {
            0x0 | 0x1 => board.switch_cartridge_bank(addr),
            0x2 | 0x3 => {
                let control = board.port[0x26];
                if control & 0x60 == 0x60 {
                    let target = if control & 0x20 != 0 { a - 0x2000 } else { a };
                    board.store(board.banks.rom, target, data);
                }
            }
            0x4 | 0x5 => board.store(board.banks.video, a, data),
            0x6..=0x9 => board.store(board.banks.user, a, data),
            0xA..=0xD => board.store(self.extension_window(board), a, data),
            0xE => match addr {
                0xE7C0 => board.timer.write_status(data),
                0xE7C1 => {
                    board.port[0x01] = data;
                    board.dac.set_muted(data & 0x08 != 0);
                }
                0xE7C3 => {
                    board.port[0x03] = data & 0x7D;
                    self.select_video_ram(board);
                    self.select_rom_bank(board);
                }
                0xE7C5 => board.timer.write_control(data),
                0xE7C6 => board.timer.write_latch_high(data),
                0xE7C7 => board.timer.write_latch_low(data),
                0xE7C9 => {
                    board.port[0x09] = data;
                    if board.model == Model::To770 {
                        select_ram_bank_to(board);
                    }
                }
                0xE7CD => {
                    if board.port[0x0F] & 0x04 != 0 {
                        board.dac.write(data);
                    } else {
                        board.port[0x0D] = data;
                    }
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
        board.banks.system = Window::new(Region::Monitor, -0xE800);
        let p3 = board.port[0x03];
        board.border = if board.model == Model::To7 {
            (p3 >> 4) & 0x07
        } else {
            // TO7/70: bit 2 inverted is the pastel half of the palette.
            ((p3 >> 4) & 0x07) | ((!p3 & 0x04) << 1)
        };
    }

    fn select_rom_bank(&self, board: &mut Board) {
        let bank = (board.carflags & CART_BANK_MASK) as i32;
        board.banks.rom = Window::new(Region::Cartridge, bank << 14);
    }

    fn select_ram_bank(&self, board: &mut Board) {
        if board.model == Model::To770 {
            select_ram_bank_to(board);
        }
    }

    fn init_program(&self, board: &mut Board) {
        board.set_page_and_border(board.port[0x1D]);
        if board.model == Model::To770 {
            board.port[0x09] = 0x0F;
            select_ram_bank_to(board);
        }
    }
}
