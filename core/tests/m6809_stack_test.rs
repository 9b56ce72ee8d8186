mod common;
use common::{run, setup, step};

#[test]
fn test_pshs_puls_round_trip() {
    let (mut cpu, mut bus) = setup(&[
        0x86, 0xAA, // LDA #$AA
        0xC6, 0xBB, // LDB #$BB
        0x8E, 0x12, 0x34, // LDX #$1234
        0x34, 0x16, // PSHS A,B,X
        0x4F, // CLRA
        0x5F, // CLRB
        0x8E, 0x00, 0x00, // LDX #$0000
        0x35, 0x16, // PULS A,B,X
    ]);
    run(&mut cpu, &mut bus, 3);

    assert_eq!(step(&mut cpu, &mut bus), 9, "PSHS: 5 + 4 bytes");
    assert_eq!(cpu.s, 0x7FFC);
    assert_eq!(&bus.memory[0x7FFC..0x8000], &[0xAA, 0xBB, 0x12, 0x34]);

    run(&mut cpu, &mut bus, 3);
    assert_eq!((cpu.a, cpu.b, cpu.x), (0, 0, 0));

    assert_eq!(step(&mut cpu, &mut bus), 9, "PULS: 5 + 4 bytes");
    assert_eq!(cpu.s, 0x8000);
    assert_eq!((cpu.a, cpu.b, cpu.x), (0xAA, 0xBB, 0x1234));
}

#[test]
fn test_pshu_pushes_s() {
    let (mut cpu, mut bus) = setup(&[
        0x36, 0x40, // PSHU S
        0x37, 0x40, // PULU S
    ]);
    cpu.u = 0x6000;
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.u, 0x5FFE);
    assert_eq!(&bus.memory[0x5FFE..0x6000], &[0x80, 0x00]);

    cpu.s = 0;
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.s, 0x8000);
    assert_eq!(cpu.u, 0x6000);
}

#[test]
fn test_puls_pc_returns() {
    let (mut cpu, mut bus) = setup(&[
        0x35, 0x81, // PULS CC,PC
    ]);
    cpu.s = 0x7000;
    bus.load(0x7000, &[0x05, 0x12, 0x34]);
    assert_eq!(step(&mut cpu, &mut bus), 8);
    assert_eq!(cpu.cc, 0x05);
    assert_eq!(cpu.pc, 0x1234);
    assert_eq!(cpu.s, 0x7003);
}

#[test]
fn test_push_order_is_pc_first() {
    let (mut cpu, mut bus) = setup(&[0x34, 0xFF]); // PSHS all
    cpu.a = 0x01;
    cpu.b = 0x02;
    cpu.dp = 0x03;
    cpu.x = 0x0405;
    cpu.y = 0x0607;
    cpu.u = 0x0809;
    cpu.cc = 0x50;
    assert_eq!(step(&mut cpu, &mut bus), 17);
    assert_eq!(cpu.s, 0x8000 - 12);
    assert_eq!(
        &bus.memory[0x7FF4..0x8000],
        &[0x50, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x00, 0x02]
    );
}
