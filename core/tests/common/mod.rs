#![allow(dead_code)]

use moto_core::core::{Bus, BusMaster, bus::InterruptState};
use moto_core::cpu::m6809::{M6809, StepOutcome};

/// Minimal bus for testing: flat 64KB read/write memory with interrupt
/// lines and a halt line the test drives directly.
pub struct TestBus {
    pub memory: [u8; 0x10000],
    pub irq: bool,
    pub firq: bool,
    pub nmi: bool,
    pub halted: bool,
}

impl TestBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            irq: false,
            firq: false,
            nmi: false,
            halted: false,
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        let start = addr as usize;
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    pub fn set_vector(&mut self, vector: u16, target: u16) {
        self.load(vector, &target.to_be_bytes());
    }
}

impl Bus for TestBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
    }

    fn is_halted_for(&self, _master: BusMaster) -> bool {
        self.halted
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        InterruptState {
            nmi: self.nmi,
            irq: self.irq,
            firq: self.firq,
        }
    }
}

/// Execute one instruction and return its cycle count, failing on a trap.
pub fn step(cpu: &mut M6809, bus: &mut TestBus) -> u32 {
    match cpu.step(bus, BusMaster::Cpu(0)) {
        StepOutcome::Executed(cycles) => cycles,
        StepOutcome::Trap(code) => panic!("unexpected trap {code:#06X} at {:#06X}", cpu.pc),
    }
}

/// Execute `n` instructions and return the total cycle count.
pub fn run(cpu: &mut M6809, bus: &mut TestBus, n: usize) -> u32 {
    (0..n).map(|_| step(cpu, bus)).sum()
}

/// Load `program` at 0x0000 and return a CPU with S at 0x8000 ready to run it.
pub fn setup(program: &[u8]) -> (M6809, TestBus) {
    let mut bus = TestBus::new();
    bus.load(0, program);
    let mut cpu = M6809::new();
    cpu.s = 0x8000;
    (cpu, bus)
}
