use moto_core::core::BusMaster;
use moto_core::cpu::m6809::{CcFlag, M6809};
use proptest::prelude::*;
mod common;
use common::{TestBus, setup, step};

fn flag(cpu: &M6809, f: CcFlag) -> bool {
    cpu.cc & f as u8 != 0
}

proptest! {
    #[test]
    fn prop_adda_matches_integer_math(a in 0u8..=255, m in 0u8..=255) {
        let (mut cpu, mut bus) = setup(&[0x8B, m]); // ADDA #m
        cpu.a = a;
        step(&mut cpu, &mut bus);
        let wide = a as u16 + m as u16;
        prop_assert_eq!(cpu.a, wide as u8);
        prop_assert_eq!(flag(&cpu, CcFlag::C), wide > 0xFF);
        prop_assert_eq!(flag(&cpu, CcFlag::Z), wide as u8 == 0);
        prop_assert_eq!(flag(&cpu, CcFlag::N), wide as u8 & 0x80 != 0);
        let signed = a as i8 as i16 + m as i8 as i16;
        prop_assert_eq!(flag(&cpu, CcFlag::V), !(-128..=127).contains(&signed));
        prop_assert_eq!(flag(&cpu, CcFlag::H), (a & 0x0F) + (m & 0x0F) > 0x0F);
    }

    #[test]
    fn prop_suba_matches_integer_math(a in 0u8..=255, m in 0u8..=255) {
        let (mut cpu, mut bus) = setup(&[0x80, m]); // SUBA #m
        cpu.a = a;
        step(&mut cpu, &mut bus);
        prop_assert_eq!(cpu.a, a.wrapping_sub(m));
        prop_assert_eq!(flag(&cpu, CcFlag::C), m > a);
        let signed = a as i8 as i16 - m as i8 as i16;
        prop_assert_eq!(flag(&cpu, CcFlag::V), !(-128..=127).contains(&signed));
    }

    #[test]
    fn prop_exg_twice_is_identity(x in 0u16..=0xFFFF, y in 0u16..=0xFFFF) {
        let (mut cpu, mut bus) = setup(&[0x1E, 0x12, 0x1E, 0x21]); // EXG X,Y; EXG Y,X
        cpu.x = x;
        cpu.y = y;
        step(&mut cpu, &mut bus);
        prop_assert_eq!((cpu.x, cpu.y), (y, x));
        step(&mut cpu, &mut bus);
        prop_assert_eq!((cpu.x, cpu.y), (x, y));
    }

    #[test]
    fn prop_push_pull_restores_registers(
        mask in 0u8..=255,
        a in 0u8..=255,
        b in 0u8..=255,
        x in 0u16..=0xFFFF,
        u in 0u16..=0xFFFF,
    ) {
        // PSHS mask then PULS mask with PC excluded so control flow stays put.
        let mask = mask & 0x7F;
        let (mut cpu, mut bus) = setup(&[0x34, mask, 0x35, mask]);
        cpu.a = a;
        cpu.b = b;
        cpu.x = x;
        cpu.u = u;
        let before = (cpu.a, cpu.b, cpu.x, cpu.u, cpu.s);
        step(&mut cpu, &mut bus);
        step(&mut cpu, &mut bus);
        prop_assert_eq!((cpu.a, cpu.b, cpu.x, cpu.u, cpu.s), before);
    }

    #[test]
    fn prop_same_program_same_state(program in proptest::collection::vec(0u8..=255, 1..32)) {
        // Any byte stream, run twice from the same state, ends the same way.
        let run = |program: &[u8]| {
            let mut bus = TestBus::new();
            bus.load(0x1000, program);
            let mut cpu = M6809::new();
            cpu.pc = 0x1000;
            cpu.s = 0x8000;
            let mut total = 0u64;
            for _ in 0..8 {
                match cpu.step(&mut bus, BusMaster::Cpu(0)) {
                    moto_core::cpu::m6809::StepOutcome::Executed(c) => total += c as u64,
                    moto_core::cpu::m6809::StepOutcome::Trap(code) => total += code as u64,
                }
            }
            (cpu.a, cpu.b, cpu.x, cpu.y, cpu.u, cpu.s, cpu.pc, cpu.cc, total)
        };
        prop_assert_eq!(run(&program), run(&program));
    }
}
