use moto_core::cpu::m6809::CcFlag;
mod common;
use common::{setup, step};

const I: u8 = CcFlag::I as u8;
const F: u8 = CcFlag::F as u8;
const E: u8 = CcFlag::E as u8;

#[test]
fn test_swi_masks_both_interrupts() {
    let (mut cpu, mut bus) = setup(&[0x3F]);
    bus.set_vector(0xFFFA, 0x4000);
    cpu.a = 0x12;
    assert_eq!(step(&mut cpu, &mut bus), 19);
    assert_eq!(cpu.pc, 0x4000);
    assert_eq!(cpu.s, 0x8000 - 12);
    assert_eq!(cpu.cc, I | F | E);
    assert_eq!(bus.memory[0x7FF4], E, "stacked CC has E but not the masks");
    assert_eq!(bus.memory[0x7FF5], 0x12);
    assert_eq!(&bus.memory[0x7FFE..0x8000], &[0x00, 0x01]);
}

#[test]
fn test_swi2_swi3_leave_masks() {
    for (prefix, vector) in [(0x10u8, 0xFFF4u16), (0x11, 0xFFF2)] {
        let (mut cpu, mut bus) = setup(&[prefix, 0x3F]);
        bus.set_vector(vector, 0x5000);
        assert_eq!(step(&mut cpu, &mut bus), 20);
        assert_eq!(cpu.pc, 0x5000);
        assert_eq!(cpu.cc, E, "prefix {prefix:#04X}");
        assert_eq!(&bus.memory[0x7FFE..0x8000], &[0x00, 0x02]);
    }
}

#[test]
fn test_swi_then_rti() {
    let (mut cpu, mut bus) = setup(&[0x3F, 0x12]);
    bus.set_vector(0xFFFA, 0x4000);
    bus.load(0x4000, &[0x86, 0x00, 0x3B]); // LDA #0, RTI
    cpu.a = 0x77;
    cpu.x = 0x1234;
    step(&mut cpu, &mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0);
    assert_eq!(step(&mut cpu, &mut bus), 15);
    assert_eq!(cpu.pc, 0x0001);
    assert_eq!(cpu.a, 0x77);
    assert_eq!(cpu.x, 0x1234);
    assert_eq!(cpu.cc & (I | F), 0);
    assert_eq!(cpu.s, 0x8000);
}

#[test]
fn test_swi2_keeps_masks_already_set() {
    let (mut cpu, mut bus) = setup(&[0x10, 0x3F]);
    bus.set_vector(0xFFF4, 0x5000);
    cpu.cc = I | F;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.cc, I | F | E);
    assert_eq!(bus.memory[0x7FF4], I | F | E);
}
