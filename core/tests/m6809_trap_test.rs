use moto_core::core::BusMaster;
use moto_core::cpu::m6809::StepOutcome;
mod common;
use common::{setup, step};

#[test]
fn test_peripheral_codes_trap_with_their_opcode() {
    for code in [0x14u8, 0x15, 0x18, 0x41, 0x42, 0x45, 0x4B, 0x4E, 0x51, 0x52] {
        let (mut cpu, mut bus) = setup(&[code]);
        cpu.a = 0x5A;
        let outcome = cpu.step(&mut bus, BusMaster::Cpu(0));
        assert_eq!(outcome, StepOutcome::Trap(code as u16));
        assert_eq!(cpu.pc, 1, "PC is left after the opcode");
        assert_eq!(cpu.a, 0x5A, "no register changes");
    }
}

#[test]
fn test_prefixed_codes_carry_the_prefix() {
    let (mut cpu, mut bus) = setup(&[0x10, 0x20]);
    assert_eq!(cpu.step(&mut bus, BusMaster::Cpu(0)), StepOutcome::Trap(0x1020));
    assert_eq!(cpu.pc, 2);

    let (mut cpu, mut bus) = setup(&[0x11, 0x8E]);
    assert_eq!(cpu.step(&mut bus, BusMaster::Cpu(0)), StepOutcome::Trap(0x118E));
}

#[test]
fn test_last_prefix_wins() {
    // 0x10 0x11 0x3F is SWI3.
    let (mut cpu, mut bus) = setup(&[0x10, 0x11, 0x3F]);
    bus.set_vector(0xFFF2, 0x6000);
    assert_eq!(step(&mut cpu, &mut bus), 20);
    assert_eq!(cpu.pc, 0x6000);
    assert_eq!(&bus.memory[0x7FFE..0x8000], &[0x00, 0x03]);
}

#[test]
fn test_code_01_is_a_direct_noop() {
    let (mut cpu, mut bus) = setup(&[0x01, 0x40, 0x12]);
    cpu.a = 0x33;
    cpu.cc = 0x0F;
    assert_eq!(step(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc, 2);
    assert_eq!((cpu.a, cpu.cc), (0x33, 0x0F));
}

#[test]
fn test_execution_resumes_after_trap() {
    let (mut cpu, mut bus) = setup(&[0x41, 0x86, 0x99]); // trap, LDA #$99
    assert!(matches!(cpu.step(&mut bus, BusMaster::Cpu(0)), StepOutcome::Trap(0x41)));
    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(cpu.a, 0x99);
}
