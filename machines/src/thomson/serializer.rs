//! Save states.
//!
//! A state is a flat little-endian blob laid out in a fixed order:
//!
//! | Block            | Size            |
//! |------------------|-----------------|
//! | model id         | 4               |
//! | CPU              | 13 x i32        |
//! | video decoder    | `SERIAL_SIZE`   |
//! | RAM              | 512 KB          |
//! | I/O ports        | 64              |
//! | palette staging  | 32              |
//! | tape shifter     | 2 x i32         |
//! | frame overshoot  | i32             |
//! | reserved         | 3 x i32         |
//! | cartridge flags  | i32             |
//! | keys             | 84 x i32        |
//! | trailer          | 17 x i32        |
//!
//! The trailer holds caps lock, joysticks, pen, beam position, border,
//! sound and the 6846 counters. Media contents are not part of a state.

use moto_core::core::bus::InterruptState;
use moto_core::core::machine::StateError;
use moto_core::cpu::Cpu;
use moto_core::cpu::m6809::SyncState;

use super::keyboard::KEY_COUNT;
use super::memory::{PALETTE_STAGING_SIZE, PORT_COUNT, RAM_SIZE};
use super::model::Model;
use super::video::SERIAL_SIZE;
use super::Thomson;

const CPU_WORDS: usize = 13;
const TAPE_WORDS: usize = 2;
const RESERVED_WORDS: usize = 3;
const TRAILER_WORDS: usize = 17;

/// Size in bytes of every state, whatever the model.
pub const STATE_SIZE: usize = 4
    + CPU_WORDS * 4
    + SERIAL_SIZE
    + RAM_SIZE
    + PORT_COUNT
    + PALETTE_STAGING_SIZE
    + TAPE_WORDS * 4
    + 4
    + RESERVED_WORDS * 4
    + 4
    + KEY_COUNT * 4
    + TRAILER_WORDS * 4;

/// Offset of the CSR and TCR copies in the port block.
const PORT_CSR: usize = 0x00;
const PORT_TCR: usize = 0x05;

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, len: usize) -> &'a [u8] {
        let chunk = &self.data[self.pos..self.pos + len];
        self.pos += len;
        chunk
    }

    fn i32(&mut self) -> i32 {
        let mut word = [0; 4];
        word.copy_from_slice(self.bytes(4));
        i32::from_le_bytes(word)
    }

    fn u8(&mut self) -> u8 {
        self.i32() as u8
    }

    fn u16(&mut self) -> u16 {
        self.i32() as u16
    }

    fn bool(&mut self) -> bool {
        self.i32() != 0
    }
}

fn put(out: &mut Vec<u8>, value: i32) {
    out.extend_from_slice(&value.to_le_bytes());
}

impl Thomson {
    /// Capture the whole machine.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_SIZE);
        let cpu = &self.cpu;
        let board = &self.board;
        let lines = cpu.interrupt_lines();

        put(&mut out, board.model.id());
        for word in [
            0,
            cpu.sync.to_i32(),
            board.irq_line as i32,
            lines.firq as i32,
            lines.nmi as i32,
            cpu.cc as i32,
            cpu.pc as i32,
            cpu.get_d() as i32,
            cpu.x as i32,
            cpu.y as i32,
            cpu.u as i32,
            cpu.s as i32,
            cpu.dp as i32,
        ] {
            put(&mut out, word);
        }
        board.video.serialize(&mut out);

        out.extend_from_slice(&board.ram);
        let mut ports = board.port;
        if !board.model.is_mo() {
            ports[PORT_CSR] = board.timer.status();
            ports[PORT_TCR] = board.timer.control();
        }
        out.extend_from_slice(&ports);
        out.extend_from_slice(&board.palette_staging);

        put(&mut out, board.tape.bit_mask as i32);
        put(&mut out, board.tape.octet as i32);
        put(&mut out, self.frame_overshoot);
        for _ in 0..RESERVED_WORDS {
            put(&mut out, 0);
        }
        put(&mut out, board.carflags as i32);
        for &key in board.keyboard.keys() {
            put(&mut out, key as i32);
        }

        let scan = &board.scan;
        let [counter, latch, keyboard_irq, timer_irq] = board.timer.save_counters();
        for word in [
            board.keyboard.capslock() as i32,
            board.joystick.position() as i32,
            board.joystick.action() as i32,
            board.pen.x,
            board.pen.y,
            board.pen.button as i32,
            scan.line_cycle,
            scan.line_number,
            scan.vbl,
            scan.display as i32,
            board.border as i32,
            board.dac.level() as i32,
            board.dac.is_muted() as i32,
            counter,
            latch,
            keyboard_irq,
            timer_irq,
        ] {
            put(&mut out, word);
        }
        debug_assert_eq!(out.len(), STATE_SIZE);
        out
    }

    /// Replace the machine state with a blob from [`serialize`](Self::serialize).
    /// A state saved on another model switches to that model first.
    pub fn restore(&mut self, data: &[u8]) -> Result<(), StateError> {
        if data.len() != STATE_SIZE {
            return Err(StateError::SizeMismatch {
                expected: STATE_SIZE,
                actual: data.len(),
            });
        }
        let mut r = Reader { data, pos: 0 };
        let id = r.i32();
        let model = Model::from_id(id).ok_or(StateError::UnknownModel(id))?;
        self.set_model(model)
            .map_err(|e| StateError::ModelUnavailable {
                model: id,
                reason: e.to_string(),
            })?;

        let _extra_cycles = r.i32();
        self.cpu.sync = SyncState::from_i32(r.i32());
        let irq = r.bool();
        let firq = r.bool();
        let nmi = r.bool();
        self.cpu.cc = r.u8();
        self.cpu.pc = r.u16();
        self.cpu.set_d(r.u16());
        self.cpu.x = r.u16();
        self.cpu.y = r.u16();
        self.cpu.u = r.u16();
        self.cpu.s = r.u16();
        self.cpu.dp = r.u8();
        self.cpu.signal_interrupt(InterruptState {
            irq: false,
            firq,
            nmi,
        });

        let board = &mut self.board;
        board.irq_line = irq;
        board.video.deserialize(r.bytes(SERIAL_SIZE));
        board.ram.copy_from_slice(r.bytes(RAM_SIZE));
        board.port.copy_from_slice(r.bytes(PORT_COUNT));
        board.palette_staging.copy_from_slice(r.bytes(PALETTE_STAGING_SIZE));

        board.tape.bit_mask = r.u8();
        board.tape.octet = r.u8();
        let frame_overshoot = r.i32();
        r.bytes(RESERVED_WORDS * 4);
        board.carflags = r.u8();
        let mut keys = [0; KEY_COUNT];
        for key in &mut keys {
            *key = r.u8();
        }
        board.keyboard.restore_keys(keys);

        board.keyboard.set_capslock(r.bool());
        let position = r.u8();
        let action = r.u8();
        board.joystick.restore(position, action);
        board.pen.x = r.i32();
        board.pen.y = r.i32();
        board.pen.button = r.bool();
        board.scan.line_cycle = r.i32();
        board.scan.line_number = r.i32();
        board.scan.vbl = r.i32();
        board.scan.display = r.bool();
        board.border = r.u8();
        board.dac.write(r.u8());
        board.dac.set_muted(r.bool());
        let counters = [r.i32(), r.i32(), r.i32(), r.i32()];

        if !board.model.is_mo() {
            board.timer.write_status(board.port[PORT_CSR]);
            board.timer.write_control(board.port[PORT_TCR]);
        }
        board.timer.load_counters(counters);
        board.reselect_banks();
        self.frame_overshoot = frame_overshoot;
        log::info!("state restored ({})", self.board.model);
        Ok(())
    }
}
