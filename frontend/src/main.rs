use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use moto_machines::registry;
use moto_machines::thomson::peripheral::Printer;
use moto_machines::thomson::video::{FRAME_HEIGHT, FRAME_WIDTH};
use moto_machines::thomson::{MediaKind, Model, Thomson, media};

mod config;
mod rom_path;
mod screenshot;

/// Frames to let the monitor reach its menu before typing.
const BOOT_FRAMES: u32 = 100;
/// Frames each typed key is held, and then released.
const KEY_FRAMES: u32 = 2;

#[derive(Parser, Debug)]
#[command(name = "moto", version, about = "Thomson TO7 to TO9+ and MO5/MO6 emulator")]
struct Args {
    /// Model to emulate (to7, to770, mo5, to9, to8, to8d, to9p, mo6, pc128).
    /// Guessed from the first media file name when absent.
    #[arg(long)]
    model: Option<Model>,

    /// ROM directory or ZIP archive.
    #[arg(long, value_name = "PATH")]
    rom_path: Option<PathBuf>,

    /// Configuration file (default: <config dir>/moto/moto.toml).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Frames to run (50 per emulated second).
    #[arg(long, default_value_t = 250)]
    frames: u32,

    /// Write the last frame as a PNG.
    #[arg(long, value_name = "FILE")]
    screenshot: Option<PathBuf>,

    /// Write a save state when done.
    #[arg(long, value_name = "FILE")]
    save_state: Option<PathBuf>,

    /// Restore a save state before running.
    #[arg(long, value_name = "FILE")]
    load_state: Option<PathBuf>,

    /// Text to type on the keyboard (`\n` for ENTREE).
    #[arg(long, value_name = "TEXT")]
    r#type: Option<String>,

    /// Type the command that starts the first media.
    #[arg(long)]
    autostart: bool,

    /// List the available models and exit.
    #[arg(long)]
    list: bool,

    /// Tape (.k7), floppy (.fd, .sap) or cartridge (.rom, .m7, .m5) images.
    media: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        for entry in registry::all() {
            println!("{:<8} {}", entry.name, entry.display_name);
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Command line first, then the media file name, then the config file.
fn choose_model(args: &Args, config: &config::Config) -> Result<Model, config::ConfigError> {
    if let Some(model) = args.model {
        return Ok(model);
    }
    let detected = args
        .media
        .first()
        .and_then(|p| p.file_name())
        .and_then(|name| Model::detect(&name.to_string_lossy()));
    if let Some(model) = detected {
        log::info!("model {model} guessed from the media name");
        return Ok(model);
    }
    Ok(config.model()?.unwrap_or(Model::To8d))
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = config::load(args.config.as_deref())?;
    let model = choose_model(args, &config)?;

    let rom_dir = args
        .rom_path
        .clone()
        .or_else(|| config.rom_path.clone())
        .unwrap_or_else(|| PathBuf::from("roms"));
    let roms = rom_path::load_rom_set(&rom_dir)?;

    let mut machine = Thomson::new(&roms, model)?;
    let patches = config.rom_patches()?;
    if !patches.is_empty() {
        machine.set_patches(patches);
        machine.hard_reset();
    }
    machine.set_frame_skip(config.frame_skip);
    let mut printer = match &config.printer.path {
        Some(path) => Printer::to_file(path),
        None => Printer::default(),
    };
    printer.set_enabled(config.printer.enabled);
    machine.set_printer(printer);

    let mut first_kind = None;
    for path in &args.media {
        let kind = machine.insert_media(path)?;
        log::info!("{}: {kind:?}", path.display());
        first_kind.get_or_insert(kind);
    }
    if config.protect.tape {
        machine.set_tape_protected(true);
    }
    if config.protect.floppy {
        machine.set_floppy_protected(true);
    }

    if let Some(path) = &args.load_state {
        machine.restore(&std::fs::read(path)?)?;
    }

    let mut frames = args.frames;
    if let (true, Some(kind)) = (args.autostart, first_kind) {
        let basic = kind == MediaKind::Tape && machine.tape_is_basic();
        let text = media::autostart_text(machine.model(), kind, basic);
        machine.run_frames(BOOT_FRAMES);
        machine.type_text(text, KEY_FRAMES);
        frames = frames.saturating_sub(BOOT_FRAMES);
    }
    if let Some(text) = &args.r#type {
        machine.type_text(&unescape(text), KEY_FRAMES);
    }
    machine.run_frames(frames);

    if let Some(path) = &args.screenshot {
        save_screenshot(&machine, path)?;
    }
    if let Some(path) = &args.save_state {
        std::fs::write(path, machine.serialize())?;
        log::info!("state saved to {}", path.display());
    }
    Ok(())
}

fn save_screenshot(machine: &Thomson, path: &Path) -> Result<(), png::EncodingError> {
    screenshot::write_png(
        path,
        FRAME_WIDTH as u32,
        FRAME_HEIGHT as u32,
        machine.frame_buffer(),
    )?;
    log::info!("screenshot written to {}", path.display());
    Ok(())
}

/// Shell-friendly `\n` and `\\` in `--type` text.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_newlines() {
        assert_eq!(unescape(r"RUN\n"), "RUN\n");
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(unescape(r"end\"), r"end\");
    }

    #[test]
    fn args_parse() {
        let args = Args::try_parse_from([
            "moto", "--model", "mo5", "--frames", "10", "--type", "RUN\\n", "game.k7",
        ])
        .unwrap();
        assert_eq!(args.model, Some(Model::Mo5));
        assert_eq!(args.frames, 10);
        assert_eq!(args.media, vec![PathBuf::from("game.k7")]);
    }

    #[test]
    fn model_from_media_name_beats_config() {
        let args = Args::try_parse_from(["moto", "Arkanoid_MO5.k7"]).unwrap();
        let config = config::parse("model = \"to7\"").unwrap();
        assert_eq!(choose_model(&args, &config).unwrap(), Model::Mo5);

        let args = Args::try_parse_from(["moto", "game.k7"]).unwrap();
        assert_eq!(choose_model(&args, &config).unwrap(), Model::To7);

        let args = Args::try_parse_from(["moto"]).unwrap();
        let config = config::parse("").unwrap();
        assert_eq!(choose_model(&args, &config).unwrap(), Model::To8d);
    }
}
