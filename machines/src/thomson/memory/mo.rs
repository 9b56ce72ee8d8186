//! MO5, MO6 and PC128 address decoding.
//!
//! Video RAM sits at 0x0000, the system PIA at 0xA7C0 and the monitor at
//! 0xF000. 0xB000-0xEFFF holds BASIC or a cartridge; reading 0xBFFC-0xBFFF
//! switches the bank of a bank-switched cartridge.

use super::{Board, CART_BANK_MASK, CART_ENABLED, CART_OS9_BANK, CART_WRITABLE, CartType, MemoryMap, Region, Window};
use crate::thomson::model::Model;
use crate::thomson::video::VideoMode;

pub struct MoMap;

pub static MO_MAP: MoMap = MoMap;

impl MoMap {
    /// MO6 keyboard: PB4-PB6 give the column, PA3 and PB1-PB3 the line.
    fn mo6_key(&self, board: &Board) -> u8 {
        let column = ((board.port[0x01] & 0x70) >> 4) as usize;
        let mut line = ((board.port[0x00] & 0x08) | ((board.port[0x01] & 0x0E) >> 1)) as usize;
        // Some programs leave PA3 set; line 8 only has five keys.
        if line > 8 || (line == 8 && column > 4) {
            line &= 0x07;
        }
        board.keyboard.matrix_bit(line << 3 | column)
    }

    /// PA5 selects the upper half of the MO6 EPROMs.
    fn mo6_rom_offset(&self, board: &Board) -> i32 {
        ((board.port[0x00] & 0x20) as i32) << 9
    }

    fn ram_window(&self, board: &Board) -> Window {
        if board.model.is_mo6() {
            board.banks.ram
        } else {
            board.banks.user
        }
    }

    fn cartridge_window(&self, board: &Board) -> Window {
        let mut base = -0xB000 + (((board.carflags & CART_BANK_MASK) as i32) << 14);
        if board.cartype == CartType::Os9 && board.carflags & CART_OS9_BANK != 0 {
            base += 0x10000;
        }
        Window::new(Region::Cartridge, base)
    }

    fn switch_memo5_bank(&self, board: &mut Board, addr: u16) {
        if board.cartype != CartType::BankSwitched || addr & 0xFFFC != 0xBFFC {
            return;
        }
        board.switch_cartridge_bank(addr);
    }
}

impl MemoryMap for MoMap {
    fn read(&self, board: &mut Board, addr: u16) -> u8 {
        let a = addr as i32;
        let mo5 = board.model == Model::Mo5;
        match addr >> 12 {
            0x0 | 0x1 => board.load(board.banks.video, a),
            0x2..=0x5 => board.load(board.banks.user, a),
            0x6..=0x9 => board.load(self.ram_window(board), a),
            0xA => match addr {
                0xA7C0 => {
                    let pen = board.pen.button as u8;
                    board.port[0x00] | 0x80 | if mo5 { pen << 5 } else { pen << 1 }
                }
                0xA7C1 => {
                    let key = if mo5 {
                        board.keyboard.matrix_bit(((board.port[0x01] & 0xFE) >> 1) as usize)
                    } else {
                        self.mo6_key(board)
                    };
                    board.port[0x01] | key
                }
                0xA7C2 => board.port[0x02],
                0xA7C3 => board.port[0x03] | !board.scan.frame_sync(),
                0xA7CB => {
                    let flags = board.carflags;
                    (flags & 0x3F) | ((flags & 0x80) >> 1) | ((flags & 0x40) << 1)
                }
                0xA7CC => {
                    if board.port[0x0E] & 0x04 != 0 {
                        board.joystick.position()
                    } else {
                        board.port[0x0C]
                    }
                }
                0xA7CD => {
                    if board.port[0x0F] & 0x04 != 0 {
                        board.joystick.action() | board.dac.level()
                    } else {
                        board.port[0x0D]
                    }
                }
                0xA7CE => 0x04,
                0xA7DA if board.model.is_mo6() => board.read_palette(),
                // Floppy status byte.
                0xA7D8 => !board.scan.frame_sync(),
                // Zero here is a printer error 53.
                0xA7E1 => 0xFF,
                0xA7E4 if board.model.is_mo6() => board.port[0x1D] & 0xF0,
                0xA7E6 => board.scan.line_sync() << 1,
                0xA7E7 => {
                    if mo5 {
                        board.scan.frame_sync()
                    } else {
                        (board.port[0x24] & 0x01) | board.scan.frame_sync() | board.scan.line_sync()
                    }
                }
                0xA000..=0xA7BF => board.load(Window::new(Region::DiskRom, 0), a & 0x7FF),
                0xA7C0..=0xA7FF => board.port(addr),
                _ => 0,
            },
            0xB => {
                self.switch_memo5_bank(board, addr);
                board.load(board.banks.rom, a)
            }
            0xC..=0xE => board.load(board.banks.rom, a),
            _ => board.load(board.banks.system, a),
        }
    }

    fn write(&self, board: &mut Board, addr: u16, data: u8) {
        let a = addr as i32;
        let mo6 = board.model.is_mo6();
        match addr >> 12 {
            0x0 | 0x1 => board.store(board.banks.video, a, data),
            0x2..=0x5 => board.store(board.banks.user, a, data),
            0x6..=0x9 => board.store(self.ram_window(board), a, data),
            0xA => match addr {
                0xA7C0 => {
                    if board.model == Model::Mo5 {
                        board.port[0x00] = data & 0x5F;
                        self.select_video_ram(board);
                    } else {
                        board.port[0x00] = data & 0x39;
                        self.select_video_ram(board);
                        self.select_rom_bank(board);
                    }
                }
                0xA7C1 => {
                    board.port[0x01] = data & 0x7F;
                    board.dac.write((data & 0x01) << 5);
                }
                0xA7C2 | 0xA7C3 => board.set_port(addr, data & 0x3F),
                0xA7CB => {
                    board.carflags = data;
                    self.select_rom_bank(board);
                }
                0xA7CD => {
                    board.port[0x0D] = data;
                    board.dac.write(data);
                }
                0xA7DA if mo6 => board.write_palette(data),
                0xA7DC if mo6 => board.select_video_mode(data),
                0xA7DD if mo6 => {
                    board.set_page_and_border(data);
                    board.carflags = (board.carflags & !CART_ENABLED) | ((!data & 0x20) >> 3);
                    self.select_rom_bank(board);
                }
                0xA7E4 if mo6 => board.port[0x24] = data & 0x01,
                0xA7E5 if mo6 => {
                    board.port[0x25] = data;
                    self.select_ram_bank(board);
                }
                0xA7C0..=0xA7FF => board.set_port(addr, data),
                _ => {}
            },
            0xB..=0xE => {
                if board.carflags & CART_WRITABLE != 0 && board.cartype == CartType::Simple {
                    board.store(board.banks.rom, a, data);
                }
            }
            _ => {}
        }
    }

    fn select_video_ram(&self, board: &mut Board) {
        let page = (board.port[0x00] & 0x01) as i32;
        board.banks.video = Window::new(Region::Ram, page << 13);
        if board.model == Model::Mo5 {
            board.banks.system = Window::new(Region::Monitor, -0xF000);
            board.border = (board.port[0x00] >> 1) & 0x0F;
        } else {
            board.banks.system = Window::new(Region::Monitor, self.mo6_rom_offset(board) + 0x3000 - 0xF000);
        }
    }

    fn select_rom_bank(&self, board: &mut Board) {
        if board.carflags & CART_ENABLED != 0 {
            board.banks.rom = self.cartridge_window(board);
            return;
        }
        if board.model == Model::Mo5 {
            board.banks.rom = Window::new(Region::Basic, -0xC000);
            return;
        }
        let offset = self.mo6_rom_offset(board);
        board.banks.rom = if board.port[0x1D] & 0x10 != 0 {
            // BASIC 128
            Window::new(Region::Basic, offset - 0xB000)
        } else {
            // BASIC 1 shares the monitor EPROM
            Window::new(Region::Monitor, offset - 0xC000)
        };
        board.banks.system = Window::new(Region::Monitor, offset + 0x3000 - 0xF000);
    }

    fn select_ram_bank(&self, board: &mut Board) {
        if board.model.is_mo6() {
            let page = (board.port[0x25] & 0x1F) as i32;
            board.banks.ram = Window::new(Region::Ram, -0x6000 + (page << 14));
        }
    }

    fn init_program(&self, board: &mut Board) {
        if board.model == Model::Mo5 {
            board.video.set_mode(VideoMode::Mo320x16);
            board.display_page = 0;
        } else {
            // RAM bank 0
            board.port[0x25] = 0x02;
            self.select_ram_bank(board);
        }
    }
}
