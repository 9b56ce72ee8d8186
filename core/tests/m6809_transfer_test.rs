mod common;
use common::{setup, step};

#[test]
fn test_tfr_16bit() {
    let (mut cpu, mut bus) = setup(&[0x1F, 0x12]); // TFR X,Y
    cpu.x = 0xABCD;
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.y, 0xABCD);
    assert_eq!(cpu.x, 0xABCD);
}

#[test]
fn test_tfr_to_pc_jumps() {
    let (mut cpu, mut bus) = setup(&[0x1F, 0x15]); // TFR X,PC
    cpu.x = 0x4000;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.pc, 0x4000);
}

#[test]
fn test_tfr_into_cc() {
    let (mut cpu, mut bus) = setup(&[0x1F, 0x8A]); // TFR A,CC
    cpu.a = 0x5F;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.cc, 0x5F);
}

#[test]
fn test_exg_d_x() {
    let (mut cpu, mut bus) = setup(&[0x1E, 0x01]); // EXG D,X
    cpu.set_d(0x1122);
    cpu.x = 0x3344;
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.get_d(), 0x3344);
    assert_eq!(cpu.x, 0x1122);
}

#[test]
fn test_mixed_width_transfer_is_a_noop() {
    let (mut cpu, mut bus) = setup(&[
        0x1F, 0x89, // TFR A,B (valid)
        0x1F, 0x81, // TFR A,X (mixed width)
        0x1E, 0x88, // EXG A,A (same register)
    ]);
    cpu.a = 0x42;
    cpu.x = 0x9999;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.b, 0x42);
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.x, 0x9999);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 6);
}
