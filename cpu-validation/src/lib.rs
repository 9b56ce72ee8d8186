use std::collections::BTreeSet;

use moto_core::core::bus::InterruptState;
use moto_core::core::{Bus, BusMaster};
use moto_core::cpu::m6809::StepOutcome;
use moto_core::cpu::{CpuStateTrait, M6809};
use rand::Rng;
use serde::{Deserialize, Serialize};

// --- TracingBus: flat 64KB memory recording every access ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    Read,
    Write,
}

impl BusOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BusOp::Read => "read",
            BusOp::Write => "write",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BusAccess {
    pub addr: u16,
    pub data: u8,
    pub op: BusOp,
}

pub struct TracingBus {
    pub memory: [u8; 0x10000],
    pub accesses: Vec<BusAccess>,
    /// Lines reported to the CPU on every `check_interrupts`.
    pub interrupts: InterruptState,
}

impl TracingBus {
    pub fn new() -> Self {
        Self {
            memory: [0; 0x10000],
            accesses: Vec::new(),
            interrupts: InterruptState::default(),
        }
    }

    pub fn load(&mut self, addr: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.memory[addr.wrapping_add(i as u16) as usize] = byte;
        }
    }

    pub fn clear_accesses(&mut self) {
        self.accesses.clear();
    }
}

impl Default for TracingBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for TracingBus {
    type Address = u16;
    type Data = u8;

    fn read(&mut self, _master: BusMaster, addr: u16) -> u8 {
        let data = self.memory[addr as usize];
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Read,
        });
        data
    }

    fn write(&mut self, _master: BusMaster, addr: u16, data: u8) {
        self.memory[addr as usize] = data;
        self.accesses.push(BusAccess {
            addr,
            data,
            op: BusOp::Write,
        });
    }

    fn is_halted_for(&self, _master: BusMaster) -> bool {
        false
    }

    fn check_interrupts(&self, _target: BusMaster) -> InterruptState {
        self.interrupts
    }
}

// --- JSON test vectors ---

/// One instruction: registers and touched memory before and after, the
/// cycle count `step` reported and every bus access in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub initial: CpuState,
    #[serde(rename = "final")]
    pub final_state: CpuState,
    pub cycles: u32,
    pub bus: Vec<(u16, u8, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub pc: u16,
    pub s: u16,
    pub u: u16,
    pub a: u8,
    pub b: u8,
    pub dp: u8,
    pub x: u16,
    pub y: u16,
    pub cc: u8,
    pub ram: Vec<(u16, u8)>,
}

impl CpuState {
    pub fn capture(cpu: &M6809) -> Self {
        let snap = cpu.snapshot();
        Self {
            pc: snap.pc,
            s: snap.s,
            u: snap.u,
            a: snap.a,
            b: snap.b,
            dp: snap.dp,
            x: snap.x,
            y: snap.y,
            cc: snap.cc,
            ram: Vec::new(),
        }
    }

    pub fn apply(&self, cpu: &mut M6809, bus: &mut TracingBus) {
        cpu.pc = self.pc;
        cpu.s = self.s;
        cpu.u = self.u;
        cpu.a = self.a;
        cpu.b = self.b;
        cpu.dp = self.dp;
        cpu.x = self.x;
        cpu.y = self.y;
        cpu.cc = self.cc;
        for &(addr, value) in &self.ram {
            bus.memory[addr as usize] = value;
        }
    }

    fn registers_match(&self, other: &CpuState) -> Option<&'static str> {
        let pairs: [(&str, u16, u16); 9] = [
            ("PC", self.pc, other.pc),
            ("S", self.s, other.s),
            ("U", self.u, other.u),
            ("A", self.a as u16, other.a as u16),
            ("B", self.b as u16, other.b as u16),
            ("DP", self.dp as u16, other.dp as u16),
            ("X", self.x, other.x),
            ("Y", self.y, other.y),
            ("CC", self.cc as u16, other.cc as u16),
        ];
        pairs
            .iter()
            .find(|(_, a, b)| a != b)
            .map(|(name, _, _)| *name)
    }
}

fn ram_at(memory: &[u8; 0x10000], addresses: &BTreeSet<u16>) -> Vec<(u16, u8)> {
    addresses
        .iter()
        .map(|&addr| (addr, memory[addr as usize]))
        .collect()
}

/// Build one vector for `prefix`/`opcode` from random registers and memory.
/// Returns `None` for codes the CPU hands back as traps.
pub fn random_case(rng: &mut impl Rng, prefix: Option<u8>, opcode: u8) -> Option<TestCase> {
    let mut cpu = M6809::new();
    let mut bus = TracingBus::new();
    rng.fill(&mut bus.memory[..]);

    cpu.a = rng.r#gen();
    cpu.b = rng.r#gen();
    cpu.dp = rng.r#gen();
    cpu.x = rng.r#gen();
    cpu.y = rng.r#gen();
    cpu.u = rng.r#gen();
    cpu.s = rng.r#gen();
    cpu.cc = rng.r#gen();
    cpu.pc = rng.r#gen();

    let mut at = cpu.pc;
    if let Some(prefix) = prefix {
        bus.memory[at as usize] = prefix;
        at = at.wrapping_add(1);
    }
    bus.memory[at as usize] = opcode;

    let before = bus.memory;
    let mut initial = CpuState::capture(&cpu);
    let cycles = match cpu.step(&mut bus, BusMaster::Cpu(0)) {
        StepOutcome::Executed(cycles) => cycles,
        StepOutcome::Trap(_) => return None,
    };
    let mut final_state = CpuState::capture(&cpu);

    let touched: BTreeSet<u16> = bus.accesses.iter().map(|a| a.addr).collect();
    initial.ram = ram_at(&before, &touched);
    final_state.ram = ram_at(&bus.memory, &touched);

    // Name after the bytes fetched in sequence from the start PC.
    let fetched = bus
        .accesses
        .iter()
        .enumerate()
        .take_while(|(i, a)| a.op == BusOp::Read && a.addr == initial.pc.wrapping_add(*i as u16))
        .count();
    let name = bus.accesses[..fetched]
        .iter()
        .map(|a| format!("{:02x}", a.data))
        .collect::<Vec<_>>()
        .join(" ");

    Some(TestCase {
        name,
        initial,
        final_state,
        cycles,
        bus: bus
            .accesses
            .iter()
            .map(|a| (a.addr, a.data, a.op.as_str().to_string()))
            .collect(),
    })
}

/// Replay a vector and report the first difference.
pub fn run_case(tc: &TestCase) -> Result<(), String> {
    let mut cpu = M6809::new();
    let mut bus = TracingBus::new();
    tc.initial.apply(&mut cpu, &mut bus);

    let cycles = match cpu.step(&mut bus, BusMaster::Cpu(0)) {
        StepOutcome::Executed(cycles) => cycles,
        StepOutcome::Trap(code) => return Err(format!("{}: trapped on {code:04X}", tc.name)),
    };

    let actual = CpuState::capture(&cpu);
    if let Some(reg) = actual.registers_match(&tc.final_state) {
        return Err(format!("{}: {reg} differs", tc.name));
    }
    for &(addr, expected) in &tc.final_state.ram {
        let got = bus.memory[addr as usize];
        if got != expected {
            return Err(format!(
                "{}: RAM[{addr:04X}] = {got:02X}, expected {expected:02X}",
                tc.name
            ));
        }
    }
    if cycles != tc.cycles {
        return Err(format!("{}: {cycles} cycles, expected {}", tc.name, tc.cycles));
    }
    if bus.accesses.len() != tc.bus.len() {
        return Err(format!(
            "{}: {} bus accesses, expected {}",
            tc.name,
            bus.accesses.len(),
            tc.bus.len()
        ));
    }
    for (i, (got, (addr, data, op))) in bus.accesses.iter().zip(&tc.bus).enumerate() {
        if got.addr != *addr || got.data != *data || got.op.as_str() != op {
            return Err(format!(
                "{}: access {i} was {} {:04X}={:02X}, expected {op} {addr:04X}={data:02X}",
                tc.name,
                got.op.as_str(),
                got.addr,
                got.data
            ));
        }
    }
    Ok(())
}
