use std::path::Path;

use moto_core::core::BusMaster;
use moto_core::cpu::{CpuStateTrait, M6809};
use moto_core::cpu::m6809::{CcFlag, StepOutcome, table};
use moto_cpu_validation::{BusOp, TestCase, TracingBus, random_case, run_case};
use rand::SeedableRng;
use rand::rngs::StdRng;

const ORIGIN: u16 = 0x1000;

fn cpu_at(program: &[u8]) -> (M6809, TracingBus) {
    let mut cpu = M6809::new();
    let mut bus = TracingBus::new();
    bus.load(ORIGIN, program);
    cpu.pc = ORIGIN;
    cpu.s = 0x8000;
    (cpu, bus)
}

fn step(cpu: &mut M6809, bus: &mut TracingBus) -> StepOutcome {
    cpu.step(bus, BusMaster::Cpu(0))
}

// =================================================================
// Hand-checked cycle counts and bus traffic
// =================================================================

#[test]
fn test_lda_immediate() {
    let (mut cpu, mut bus) = cpu_at(&[0x86, 0x80]);
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(2));
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.cc & CcFlag::N as u8, CcFlag::N as u8);
    assert_eq!(cpu.cc & CcFlag::Z as u8, 0);
    assert_eq!(cpu.pc, ORIGIN + 2);
}

#[test]
fn test_lda_extended_trace() {
    let (mut cpu, mut bus) = cpu_at(&[0xB6, 0x12, 0x34]);
    bus.memory[0x1234] = 0x5A;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(5));
    let trace: Vec<_> = bus.accesses.iter().map(|a| (a.addr, a.data, a.op)).collect();
    assert_eq!(
        trace,
        vec![
            (ORIGIN, 0xB6, BusOp::Read),
            (ORIGIN + 1, 0x12, BusOp::Read),
            (ORIGIN + 2, 0x34, BusOp::Read),
            (0x1234, 0x5A, BusOp::Read),
        ]
    );
}

#[test]
fn test_indexed_post_increment_adds_cycles() {
    // LDD ,X++
    let (mut cpu, mut bus) = cpu_at(&[0xEC, 0x81]);
    cpu.x = 0x2000;
    bus.load(0x2000, &[0xBE, 0xEF]);
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(8));
    let snap = cpu.snapshot();
    assert_eq!(snap.d(), 0xBEEF);
    assert_eq!(snap.x, 0x2002);
}

#[test]
fn test_five_bit_offset_costs_one_cycle() {
    // LDA 5,X
    let (mut cpu, mut bus) = cpu_at(&[0xA6, 0x05]);
    cpu.x = 0x2000;
    bus.memory[0x2005] = 0x11;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(5));
    assert_eq!(cpu.a, 0x11);
}

#[test]
fn test_pshs_counts_pushed_bytes() {
    // PSHS A,B,X
    let (mut cpu, mut bus) = cpu_at(&[0x34, 0x16]);
    cpu.a = 0x01;
    cpu.b = 0x02;
    cpu.x = 0x0304;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(9));
    assert_eq!(cpu.s, 0x8000 - 4);
    assert_eq!(&bus.memory[0x7FFC..0x8000], &[0x01, 0x02, 0x03, 0x04]);
    let writes = bus.accesses.iter().filter(|a| a.op == BusOp::Write).count();
    assert_eq!(writes, 4);
}

#[test]
fn test_long_branch_taken_costs_extra_cycle() {
    // LBEQ +$0100
    let (mut cpu, mut bus) = cpu_at(&[0x10, 0x27, 0x01, 0x00]);
    cpu.cc = CcFlag::Z as u8;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(6));
    assert_eq!(cpu.pc, ORIGIN + 4 + 0x100);

    let (mut cpu, mut bus) = cpu_at(&[0x10, 0x27, 0x01, 0x00]);
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(5));
    assert_eq!(cpu.pc, ORIGIN + 4);
}

#[test]
fn test_mul_carry_from_bit_seven() {
    let (mut cpu, mut bus) = cpu_at(&[0x3D]);
    cpu.a = 0x10;
    cpu.b = 0x08;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(11));
    assert_eq!(cpu.get_d(), 0x0080);
    assert_eq!(cpu.cc & CcFlag::C as u8, CcFlag::C as u8);
}

// =================================================================
// Interrupt entry and traps
// =================================================================

#[test]
fn test_irq_entry_stacks_everything() {
    let (mut cpu, mut bus) = cpu_at(&[0x12]);
    bus.load(0xFFF8, &[0x40, 0x00]);
    bus.interrupts.irq = true;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(19));
    assert_eq!(cpu.pc, 0x4000);
    assert_eq!(cpu.s, 0x8000 - 12);
    assert_ne!(cpu.cc & CcFlag::I as u8, 0);
    assert_ne!(cpu.cc & CcFlag::E as u8, 0);
    assert_eq!(cpu.cc & CcFlag::F as u8, 0);
}

#[test]
fn test_masked_irq_runs_the_instruction() {
    let (mut cpu, mut bus) = cpu_at(&[0x12]);
    cpu.cc = CcFlag::I as u8;
    bus.interrupts.irq = true;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(2));
    assert_eq!(cpu.pc, ORIGIN + 1);
}

#[test]
fn test_firq_entry_stacks_pc_and_cc() {
    let (mut cpu, mut bus) = cpu_at(&[0x12]);
    bus.load(0xFFF6, &[0x50, 0x00]);
    bus.interrupts.firq = true;
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Executed(10));
    assert_eq!(cpu.pc, 0x5000);
    assert_eq!(cpu.s, 0x8000 - 3);
    assert_eq!(cpu.cc & CcFlag::E as u8, 0);
}

#[test]
fn test_undocumented_codes_trap() {
    let (mut cpu, mut bus) = cpu_at(&[0x41]);
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Trap(0x0041));
    assert_eq!(cpu.pc, ORIGIN + 1);

    let (mut cpu, mut bus) = cpu_at(&[0x10, 0x14]);
    assert_eq!(step(&mut cpu, &mut bus), StepOutcome::Trap(0x1014));
    assert_eq!(cpu.pc, ORIGIN + 2);
}

// =================================================================
// Vector files
// =================================================================

#[test]
fn test_seeded_vectors_survive_json() {
    let mut rng = StdRng::seed_from_u64(0x6809);
    let mut cases: Vec<TestCase> = Vec::new();
    for code in 0..=0xFFu8 {
        if table::lookup(0, code).is_some() {
            cases.extend((0..4).filter_map(|_| random_case(&mut rng, None, code)));
        }
    }
    for code in [0x8E, 0xCE, 0x83, 0x27] {
        cases.extend((0..4).filter_map(|_| random_case(&mut rng, Some(0x10), code)));
    }
    assert!(cases.len() > 800);

    let json = serde_json::to_string(&cases).unwrap();
    let parsed: Vec<TestCase> = serde_json::from_str(&json).unwrap();
    for tc in &parsed {
        run_case(tc).unwrap();
    }
}

#[test]
fn test_recorded_vectors() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data/m6809");
    if !test_dir.exists() {
        eprintln!(
            "no recorded vectors; run: cargo run -p moto-cpu-validation --bin gen_m6809_tests -- all"
        );
        return;
    }

    let mut json_files: Vec<_> = std::fs::read_dir(&test_dir)
        .unwrap()
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.extension().and_then(|e| e.to_str()) == Some("json")).then_some(path)
        })
        .collect();
    json_files.sort();

    let mut total = 0;
    let mut failures = Vec::new();
    for path in &json_files {
        let json = std::fs::read_to_string(path).unwrap();
        let tests: Vec<TestCase> = serde_json::from_str(&json)
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        total += tests.len();
        failures.extend(tests.iter().filter_map(|tc| run_case(tc).err()));
    }

    assert!(
        failures.is_empty(),
        "{} of {total} vectors failed, first: {}",
        failures.len(),
        failures[0]
    );
    eprintln!("Validated {total} vectors across {} files", json_files.len());
}
