//! Run loop: the CPU paced against the video beam.
//!
//! A line lasts 64 cycles and a frame 312 lines:
//!
//! | Lines   | Contents                    |
//! |---------|-----------------------------|
//! | 0-47    | off screen                  |
//! | 48-55   | top border                  |
//! | 56-255  | active display              |
//! | 256-263 | bottom border               |
//! | 264-311 | off screen (vertical blank) |
//!
//! Only one frame in `frame_skip + 1` is decoded.

use moto_core::core::BusMaster;
use moto_core::device::mc6846::IrqChange;

use super::Thomson;
use super::peripheral::{self, Followup, TRAP_CYCLES};
use super::video::Beam;
use moto_core::cpu::m6809::StepOutcome;

pub const CYCLES_PER_LINE: i32 = 64;
pub const LINES_PER_FRAME: i32 = 312;
/// One frame of CPU time.
pub const CYCLES_PER_FRAME: i32 = CYCLES_PER_LINE * LINES_PER_FRAME;

/// Default number of skipped frames between two decoded ones.
pub const DEFAULT_FRAME_SKIP: i32 = 1;

/// Beam position and frame counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scan {
    pub line_cycle: i32,
    pub line_number: i32,
    /// Frame counter, modulo `frame_skip + 1`; frame 0 is decoded.
    pub vbl: i32,
    pub display: bool,
    pub frame_skip: i32,
}

impl Default for Scan {
    fn default() -> Self {
        Self {
            line_cycle: 0,
            line_number: 0,
            vbl: 0,
            display: false,
            frame_skip: DEFAULT_FRAME_SKIP,
        }
    }
}

impl Scan {
    /// Back to the top of the frame; the frame skip setting is kept.
    pub fn reset(&mut self) {
        *self = Self {
            frame_skip: self.frame_skip,
            ..Self::default()
        };
    }

    /// Horizontal window signal (INILN), bit 5.
    pub fn line_sync(&self) -> u8 {
        if (11..=51).contains(&self.line_cycle) {
            0x20
        } else {
            0
        }
    }

    /// Vertical window signal (INITN), bit 7: the 200 active lines, give
    /// or take the cycles before and after the visible part of the line.
    pub fn frame_sync(&self) -> u8 {
        let line = self.line_number;
        let cycle = self.line_cycle;
        let inside = (56..=255).contains(&line)
            && !(line == 56 && cycle < 12)
            && !(line == 255 && cycle > 50);
        if inside { 0x80 } else { 0 }
    }

    /// Close the line once its 64 cycles are spent. Returns true at the
    /// start of a new frame. `next_line` is called when a displayed line ends.
    fn end_line(&mut self, mut next_line: impl FnMut(i32)) -> bool {
        if self.line_cycle < CYCLES_PER_LINE {
            return false;
        }
        let mut new_frame = false;
        self.line_cycle -= CYCLES_PER_LINE;
        if self.display {
            next_line(self.line_number);
        }
        self.line_number += 1;
        if self.line_number >= LINES_PER_FRAME {
            self.line_number -= LINES_PER_FRAME;
            self.vbl = (self.vbl + 1) % (self.frame_skip + 1);
            new_frame = true;
        }
        self.display = self.vbl == 0 && self.line_number > 47 && self.line_number < 264;
        new_frame
    }

    #[cfg(test)]
    fn advance(&mut self, cycles: i32, next_line: impl FnMut(i32)) -> bool {
        self.line_cycle += cycles;
        self.end_line(next_line)
    }
}

impl Thomson {
    /// Run for at least `budget` cycles. Returns the cycles run past the
    /// budget, to be taken off the next call.
    pub fn run(&mut self, budget: i32) -> i32 {
        let mut elapsed = 0;
        while elapsed < budget {
            self.board.instr_pc = self.cpu.pc;
            let cycles = match self.cpu.step(&mut self.board, BusMaster::Cpu(0)) {
                StepOutcome::Executed(cycles) => cycles,
                StepOutcome::Trap(code) => {
                    log::debug!("trap {code:#04X} at {:#06X}", self.board.instr_pc);
                    if peripheral::dispatch(code, &mut self.cpu, &mut self.board) == Followup::InitProgram {
                        self.init_program();
                    }
                    TRAP_CYCLES
                }
            };
            elapsed += cycles as i32;
            self.advance_beam(cycles as i32);

            if !self.board.model.is_mo() {
                match self.board.timer.tick(cycles) {
                    Some(IrqChange::Raise) => self.board.irq_line = true,
                    Some(IrqChange::Clear) => self.board.irq_line = false,
                    None => {}
                }
            }
        }
        elapsed - budget
    }

    fn advance_beam(&mut self, cycles: i32) {
        let board = &mut self.board;
        board.scan.line_cycle += cycles;
        if board.scan.display {
            let beam = Beam {
                line: board.scan.line_number,
                line_cycle: board.scan.line_cycle,
                border: board.border,
                page: board.display_page,
            };
            board.video.display_segment(&board.ram, beam);
        }
        let video = &mut board.video;
        let new_frame = board.scan.end_line(|line| video.next_line(line));
        if new_frame && board.model.is_mo() {
            self.cpu.irq(&mut self.board, BusMaster::Cpu(0));
        }
    }
}
