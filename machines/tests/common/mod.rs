#![allow(dead_code)]

use moto_core::core::{Bus, BusMaster};
use moto_machines::rom_loader::RomSet;
use moto_machines::thomson::{Model, Thomson};

/// Where the synthetic monitors jump at reset.
pub const PROGRAM: u16 = 0x6100;
/// IRQ vector of the synthetic monitors.
pub const IRQ_HANDLER: u16 = 0x6200;

/// A monitor image with the reset and IRQ vectors at the top of every
/// 4 KB page and at the end of the image, so that whatever part of it is
/// mapped at 0xF000-0xFFFF has them.
fn monitor(size: usize) -> Vec<u8> {
    let mut rom = vec![0x12; size];
    let mut put_vectors = |top: usize| {
        rom[top..top + 2].copy_from_slice(&IRQ_HANDLER.to_be_bytes());
        rom[top + 6..top + 8].copy_from_slice(&PROGRAM.to_be_bytes());
    };
    for page in (0..size).step_by(0x1000) {
        put_vectors(page + 0xFF8);
    }
    put_vectors(size - 8);
    rom
}

/// Every image of every model, filled with recognizable bytes.
pub fn rom_set() -> RomSet {
    let basic = |size: usize| vec![0x5A; size];
    RomSet::from_entries(vec![
        ("to8_basic.rom".into(), basic(0x10000)),
        ("to8_monitor.rom".into(), monitor(0x4000)),
        ("to8d_monitor.rom".into(), monitor(0x4000)),
        ("to9_basic.rom".into(), basic(0x20000)),
        ("to9_monitor.rom".into(), monitor(0x2000)),
        ("to9p_basic.rom".into(), basic(0x10000)),
        ("to9p_monitor.rom".into(), monitor(0x4000)),
        ("mo5_basic.rom".into(), basic(0x3000)),
        ("mo5_monitor.rom".into(), monitor(0x1000)),
        ("mo6_basic128.rom".into(), basic(0x8000)),
        ("mo6_basic1.rom".into(), monitor(0x8000)),
        ("pc128_basic128.rom".into(), basic(0x8000)),
        ("pc128_basic1.rom".into(), monitor(0x8000)),
        ("to7_monitor.rom".into(), monitor(0x1800)),
        ("to770_monitor.rom".into(), monitor(0x1800)),
        ("basic1_memo7.rom".into(), basic(0x4000)),
        ("basic128_memo7.rom".into(), basic(0xC000)),
    ])
}

pub fn machine(model: Model) -> Thomson {
    Thomson::new(&rom_set(), model).expect("synthetic ROM set is complete")
}

pub fn poke(m: &mut Thomson, addr: u16, bytes: &[u8]) {
    for (i, &byte) in bytes.iter().enumerate() {
        m.board_mut().write(BusMaster::Dma, addr.wrapping_add(i as u16), byte);
    }
}

pub fn peek(m: &mut Thomson, addr: u16) -> u8 {
    m.board_mut().read(BusMaster::Dma, addr)
}

/// Machine whose CPU is about to run `code` from `PROGRAM`.
pub fn machine_running(model: Model, code: &[u8]) -> Thomson {
    let mut m = machine(model);
    poke(&mut m, PROGRAM, code);
    m
}
