//! Static opcode tables.
//!
//! One table per opcode page (no prefix, 0x10, 0x11). Each entry carries the
//! addressing mode, the base cycle count and the operation; `M6809::execute`
//! consumes them. Empty slots are codes without 6809 semantics and surface
//! as `StepOutcome::Trap`.

/// Operand addressing mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Inherent,
    Immediate8,
    Immediate16,
    Direct,
    Indexed,
    Extended,
    Relative8,
    Relative16,
}

/// 8-bit accumulators.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Acc {
    A,
    B,
}

/// 16-bit registers addressable by word instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reg16 {
    D,
    X,
    Y,
    U,
    S,
}

/// Target of a read-modify-write instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Target {
    A,
    B,
    Memory,
}

/// Stack selected by PSH/PUL.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stack {
    S,
    U,
}

/// Branch condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cond {
    Always,
    Never,
    Hi,
    Ls,
    Cc,
    Cs,
    Ne,
    Eq,
    Vc,
    Vs,
    Pl,
    Mi,
    Ge,
    Lt,
    Gt,
    Le,
}

/// Single-operand read-modify-write operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Unary {
    Neg,
    Com,
    Lsr,
    Ror,
    Asr,
    Asl,
    Rol,
    Dec,
    Inc,
    Tst,
    Clr,
}

/// Two-operand 8-bit operations against an accumulator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alu8 {
    Sub,
    Cmp,
    Sbc,
    And,
    Bit,
    Ld,
    Eor,
    Adc,
    Or,
    Add,
}

/// Two-operand 16-bit operations against a word register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Alu16 {
    Sub,
    Add,
    Cmp,
    Ld,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Unary(Unary, Target),
    Alu8(Alu8, Acc),
    Store8(Acc),
    Alu16(Alu16, Reg16),
    Store16(Reg16),
    Lea(Reg16),
    Branch(Cond),
    LongBranch(Cond),
    Bsr,
    Jsr,
    Jmp,
    Rts,
    Rti,
    Swi(u8),
    Push(Stack),
    Pull(Stack),
    Exg,
    Tfr,
    Nop,
    Sync,
    Daa,
    Orcc,
    Andcc,
    Sex,
    Abx,
    Cwai,
    Mul,
}

/// One decoded table entry.
#[derive(Copy, Clone, Debug)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub mode: Mode,
    pub cycles: u8,
    pub op: Op,
}

const fn entry(mnemonic: &'static str, mode: Mode, cycles: u8, op: Op) -> Option<Opcode> {
    Some(Opcode {
        mnemonic,
        mode,
        cycles,
        op,
    })
}

type Table = [Option<Opcode>; 256];

/// Fills the direct (0x0_), indexed (0x6_) and extended (0x7_) memory unary rows
/// plus the register rows (0x4_ for A, 0x5_ for B).
const fn unary_rows(t: &mut Table, low: usize, name: [&'static str; 3], u: Unary) {
    t[low] = entry(name[0], Mode::Direct, 6, Op::Unary(u, Target::Memory));
    t[0x40 | low] = entry(name[1], Mode::Inherent, 2, Op::Unary(u, Target::A));
    t[0x50 | low] = entry(name[2], Mode::Inherent, 2, Op::Unary(u, Target::B));
    t[0x60 | low] = entry(name[0], Mode::Indexed, 6, Op::Unary(u, Target::Memory));
    t[0x70 | low] = entry(name[0], Mode::Extended, 7, Op::Unary(u, Target::Memory));
}

/// Fills the four addressing forms of an 8-bit accumulator operation.
/// `base` is the immediate opcode (0x8_ for A, 0xC_ for B).
const fn alu8_column(t: &mut Table, base: usize, name: &'static str, op: Op) {
    t[base] = entry(name, Mode::Immediate8, 2, op);
    t[base + 0x10] = entry(name, Mode::Direct, 4, op);
    t[base + 0x20] = entry(name, Mode::Indexed, 4, op);
    t[base + 0x30] = entry(name, Mode::Extended, 5, op);
}

/// Fills the four addressing forms of a 16-bit operation with the
/// immediate/direct/indexed/extended base cycles given.
const fn word_column(t: &mut Table, base: usize, name: &'static str, op: Op, cycles: [u8; 4]) {
    t[base] = entry(name, Mode::Immediate16, cycles[0], op);
    t[base + 0x10] = entry(name, Mode::Direct, cycles[1], op);
    t[base + 0x20] = entry(name, Mode::Indexed, cycles[2], op);
    t[base + 0x30] = entry(name, Mode::Extended, cycles[3], op);
}

/// Fills the direct/indexed/extended forms of a store.
const fn store_column(t: &mut Table, base: usize, name: &'static str, op: Op, cycles: [u8; 3]) {
    t[base + 0x10] = entry(name, Mode::Direct, cycles[0], op);
    t[base + 0x20] = entry(name, Mode::Indexed, cycles[1], op);
    t[base + 0x30] = entry(name, Mode::Extended, cycles[2], op);
}

const BRANCHES: [(&str, &str, Cond); 16] = [
    ("BRA", "LBRA", Cond::Always),
    ("BRN", "LBRN", Cond::Never),
    ("BHI", "LBHI", Cond::Hi),
    ("BLS", "LBLS", Cond::Ls),
    ("BCC", "LBCC", Cond::Cc),
    ("BCS", "LBCS", Cond::Cs),
    ("BNE", "LBNE", Cond::Ne),
    ("BEQ", "LBEQ", Cond::Eq),
    ("BVC", "LBVC", Cond::Vc),
    ("BVS", "LBVS", Cond::Vs),
    ("BPL", "LBPL", Cond::Pl),
    ("BMI", "LBMI", Cond::Mi),
    ("BGE", "LBGE", Cond::Ge),
    ("BLT", "LBLT", Cond::Lt),
    ("BGT", "LBGT", Cond::Gt),
    ("BLE", "LBLE", Cond::Le),
];

const ALU8: [(usize, &str, &str, Alu8); 10] = [
    (0x0, "SUBA", "SUBB", Alu8::Sub),
    (0x1, "CMPA", "CMPB", Alu8::Cmp),
    (0x2, "SBCA", "SBCB", Alu8::Sbc),
    (0x4, "ANDA", "ANDB", Alu8::And),
    (0x5, "BITA", "BITB", Alu8::Bit),
    (0x6, "LDA", "LDB", Alu8::Ld),
    (0x8, "EORA", "EORB", Alu8::Eor),
    (0x9, "ADCA", "ADCB", Alu8::Adc),
    (0xA, "ORA", "ORB", Alu8::Or),
    (0xB, "ADDA", "ADDB", Alu8::Add),
];

const fn build_page0() -> Table {
    let mut t: Table = [None; 256];

    unary_rows(&mut t, 0x0, ["NEG", "NEGA", "NEGB"], Unary::Neg);
    unary_rows(&mut t, 0x3, ["COM", "COMA", "COMB"], Unary::Com);
    unary_rows(&mut t, 0x4, ["LSR", "LSRA", "LSRB"], Unary::Lsr);
    unary_rows(&mut t, 0x6, ["ROR", "RORA", "RORB"], Unary::Ror);
    unary_rows(&mut t, 0x7, ["ASR", "ASRA", "ASRB"], Unary::Asr);
    unary_rows(&mut t, 0x8, ["ASL", "ASLA", "ASLB"], Unary::Asl);
    unary_rows(&mut t, 0x9, ["ROL", "ROLA", "ROLB"], Unary::Rol);
    unary_rows(&mut t, 0xA, ["DEC", "DECA", "DECB"], Unary::Dec);
    unary_rows(&mut t, 0xC, ["INC", "INCA", "INCB"], Unary::Inc);
    unary_rows(&mut t, 0xD, ["TST", "TSTA", "TSTB"], Unary::Tst);
    unary_rows(&mut t, 0xF, ["CLR", "CLRA", "CLRB"], Unary::Clr);

    // 0x01 consumes a direct operand and does nothing.
    t[0x01] = entry("BRN", Mode::Direct, 3, Op::Nop);
    t[0x0E] = entry("JMP", Mode::Direct, 3, Op::Jmp);
    t[0x6E] = entry("JMP", Mode::Indexed, 3, Op::Jmp);
    t[0x7E] = entry("JMP", Mode::Extended, 4, Op::Jmp);

    t[0x12] = entry("NOP", Mode::Inherent, 2, Op::Nop);
    t[0x13] = entry("SYNC", Mode::Inherent, 4, Op::Sync);
    t[0x16] = entry("LBRA", Mode::Relative16, 5, Op::LongBranch(Cond::Always));
    t[0x17] = entry("LBSR", Mode::Relative16, 9, Op::Bsr);
    t[0x19] = entry("DAA", Mode::Inherent, 2, Op::Daa);
    t[0x1A] = entry("ORCC", Mode::Immediate8, 3, Op::Orcc);
    t[0x1C] = entry("ANDCC", Mode::Immediate8, 3, Op::Andcc);
    t[0x1D] = entry("SEX", Mode::Inherent, 2, Op::Sex);
    t[0x1E] = entry("EXG", Mode::Immediate8, 8, Op::Exg);
    t[0x1F] = entry("TFR", Mode::Immediate8, 6, Op::Tfr);

    let mut i = 0;
    while i < 16 {
        let (short, _, cond) = BRANCHES[i];
        t[0x20 + i] = entry(short, Mode::Relative8, 3, Op::Branch(cond));
        i += 1;
    }

    t[0x30] = entry("LEAX", Mode::Indexed, 4, Op::Lea(Reg16::X));
    t[0x31] = entry("LEAY", Mode::Indexed, 4, Op::Lea(Reg16::Y));
    t[0x32] = entry("LEAS", Mode::Indexed, 4, Op::Lea(Reg16::S));
    t[0x33] = entry("LEAU", Mode::Indexed, 4, Op::Lea(Reg16::U));
    t[0x34] = entry("PSHS", Mode::Immediate8, 5, Op::Push(Stack::S));
    t[0x35] = entry("PULS", Mode::Immediate8, 5, Op::Pull(Stack::S));
    t[0x36] = entry("PSHU", Mode::Immediate8, 5, Op::Push(Stack::U));
    t[0x37] = entry("PULU", Mode::Immediate8, 5, Op::Pull(Stack::U));
    t[0x39] = entry("RTS", Mode::Inherent, 5, Op::Rts);
    t[0x3A] = entry("ABX", Mode::Inherent, 3, Op::Abx);
    t[0x3B] = entry("RTI", Mode::Inherent, 6, Op::Rti);
    t[0x3C] = entry("CWAI", Mode::Immediate8, 20, Op::Cwai);
    t[0x3D] = entry("MUL", Mode::Inherent, 11, Op::Mul);
    t[0x3F] = entry("SWI", Mode::Inherent, 19, Op::Swi(1));

    let mut i = 0;
    while i < ALU8.len() {
        let (low, name_a, name_b, alu) = ALU8[i];
        alu8_column(&mut t, 0x80 + low, name_a, Op::Alu8(alu, Acc::A));
        alu8_column(&mut t, 0xC0 + low, name_b, Op::Alu8(alu, Acc::B));
        i += 1;
    }

    store_column(&mut t, 0x87, "STA", Op::Store8(Acc::A), [4, 4, 5]);
    store_column(&mut t, 0xC7, "STB", Op::Store8(Acc::B), [4, 4, 5]);

    word_column(&mut t, 0x83, "SUBD", Op::Alu16(Alu16::Sub, Reg16::D), [4, 6, 6, 7]);
    word_column(&mut t, 0xC3, "ADDD", Op::Alu16(Alu16::Add, Reg16::D), [4, 6, 6, 7]);
    word_column(&mut t, 0x8C, "CMPX", Op::Alu16(Alu16::Cmp, Reg16::X), [4, 6, 6, 7]);
    word_column(&mut t, 0x8E, "LDX", Op::Alu16(Alu16::Ld, Reg16::X), [3, 5, 5, 6]);
    word_column(&mut t, 0xCC, "LDD", Op::Alu16(Alu16::Ld, Reg16::D), [3, 5, 5, 6]);
    word_column(&mut t, 0xCE, "LDU", Op::Alu16(Alu16::Ld, Reg16::U), [3, 5, 5, 6]);
    store_column(&mut t, 0x8F, "STX", Op::Store16(Reg16::X), [5, 5, 6]);
    store_column(&mut t, 0xCD, "STD", Op::Store16(Reg16::D), [5, 5, 6]);
    store_column(&mut t, 0xCF, "STU", Op::Store16(Reg16::U), [5, 5, 6]);

    // BSR sits where an immediate JSR would be.
    t[0x8D] = entry("BSR", Mode::Relative8, 7, Op::Bsr);
    t[0x9D] = entry("JSR", Mode::Direct, 7, Op::Jsr);
    t[0xAD] = entry("JSR", Mode::Indexed, 5, Op::Jsr);
    t[0xBD] = entry("JSR", Mode::Extended, 8, Op::Jsr);

    t
}

const fn build_page2() -> Table {
    let mut t: Table = [None; 256];

    let mut i = 1;
    while i < 16 {
        let (_, long, cond) = BRANCHES[i];
        t[0x20 + i] = entry(long, Mode::Relative16, 5, Op::LongBranch(cond));
        i += 1;
    }
    t[0x3F] = entry("SWI2", Mode::Inherent, 20, Op::Swi(2));

    word_column(&mut t, 0x83, "CMPD", Op::Alu16(Alu16::Cmp, Reg16::D), [5, 7, 7, 8]);
    word_column(&mut t, 0x8C, "CMPY", Op::Alu16(Alu16::Cmp, Reg16::Y), [5, 7, 7, 8]);
    word_column(&mut t, 0x8E, "LDY", Op::Alu16(Alu16::Ld, Reg16::Y), [4, 6, 6, 7]);
    word_column(&mut t, 0xCE, "LDS", Op::Alu16(Alu16::Ld, Reg16::S), [4, 6, 6, 7]);
    store_column(&mut t, 0x8F, "STY", Op::Store16(Reg16::Y), [6, 6, 7]);
    store_column(&mut t, 0xCF, "STS", Op::Store16(Reg16::S), [6, 6, 7]);

    t
}

const fn build_page3() -> Table {
    let mut t: Table = [None; 256];
    t[0x3F] = entry("SWI3", Mode::Inherent, 20, Op::Swi(3));
    word_column(&mut t, 0x83, "CMPU", Op::Alu16(Alu16::Cmp, Reg16::U), [5, 7, 7, 8]);
    word_column(&mut t, 0x8C, "CMPS", Op::Alu16(Alu16::Cmp, Reg16::S), [5, 7, 7, 8]);
    t
}

pub static PAGE0: Table = build_page0();
pub static PAGE2: Table = build_page2();
pub static PAGE3: Table = build_page3();

/// Look up an opcode. `prefix` is 0x00, 0x10 or 0x11.
pub fn lookup(prefix: u8, code: u8) -> Option<&'static Opcode> {
    let table = match prefix {
        0x10 => &PAGE2,
        0x11 => &PAGE3,
        _ => &PAGE0,
    };
    table[code as usize].as_ref()
}
