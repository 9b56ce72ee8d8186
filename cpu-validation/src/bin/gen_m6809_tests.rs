use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use moto_core::cpu::m6809::table;
use moto_cpu_validation::{TestCase, random_case};
use rand::Rng;

const NUM_TESTS: usize = 1000;

/// Every documented opcode as `(prefix, code)`. Codes without an entry are
/// the ones the Thomson machines use as monitor traps.
fn documented_opcodes() -> Vec<(Option<u8>, u8)> {
    let mut codes = Vec::new();
    for prefix in [None, Some(0x10), Some(0x11)] {
        for code in 0..=0xFFu8 {
            if table::lookup(prefix.unwrap_or(0), code).is_some() {
                codes.push((prefix, code));
            }
        }
    }
    codes
}

fn file_name(prefix: Option<u8>, code: u8) -> String {
    match prefix {
        Some(p) => format!("{p:02x}{code:02x}.json"),
        None => format!("{code:02x}.json"),
    }
}

fn generate_and_write(
    rng: &mut impl Rng,
    prefix: Option<u8>,
    code: u8,
    out_dir: &Path,
) -> Result<PathBuf, String> {
    let tests: Vec<TestCase> = (0..NUM_TESTS)
        .filter_map(|_| random_case(rng, prefix, code))
        .collect();
    let path = out_dir.join(file_name(prefix, code));
    let json = serde_json::to_string_pretty(&tests).map_err(|e| e.to_string())?;
    fs::write(&path, json).map_err(|e| format!("{}: {e}", path.display()))?;
    println!("{:>5} vectors -> {}", tests.len(), path.display());
    Ok(path)
}

/// `86`, `0x86` or `10ce`.
fn parse_opcode(arg: &str) -> Option<(Option<u8>, u8)> {
    let hex = arg.trim_start_matches("0x").trim_start_matches("0X");
    let value = u16::from_str_radix(hex, 16).ok()?;
    let (prefix, code) = match value >> 8 {
        0 => (None, value as u8),
        p @ (0x10 | 0x11) => (Some(p as u8), value as u8),
        _ => return None,
    };
    table::lookup(prefix.unwrap_or(0), code)?;
    Some((prefix, code))
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: gen_m6809_tests <opcode_hex | all>");
        eprintln!("  gen_m6809_tests 86");
        eprintln!("  gen_m6809_tests 10ce");
        eprintln!("  gen_m6809_tests all");
        return ExitCode::FAILURE;
    }

    let out_dir = Path::new("test_data/m6809");
    if let Err(e) = fs::create_dir_all(out_dir) {
        eprintln!("{}: {e}", out_dir.display());
        return ExitCode::FAILURE;
    }

    let codes = if args[1] == "all" {
        documented_opcodes()
    } else {
        match parse_opcode(&args[1]) {
            Some(code) => vec![code],
            None => {
                eprintln!("{} is not a documented 6809 opcode", args[1]);
                return ExitCode::FAILURE;
            }
        }
    };

    let mut rng = rand::thread_rng();
    for &(prefix, code) in &codes {
        if let Err(e) = generate_and_write(&mut rng, prefix, code, out_dir) {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }
    println!("Generated vectors for {} opcodes", codes.len());
    ExitCode::SUCCESS
}
