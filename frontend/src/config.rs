//! `moto.toml`: defaults the command line can override.
//!
//! ```toml
//! model = "to8d"
//! rom_path = "/usr/share/moto/roms"
//! frame_skip = 0
//!
//! [protect]
//! floppy = false
//! tape = true
//!
//! [printer]
//! enabled = true
//! path = "printer.txt"
//!
//! [[patch]]
//! image = "monitor"
//! offset = 0x1234
//! bytes = [0x12, 0x12]
//! ```

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use moto_machines::thomson::Model;
use moto_machines::thomson::patch::{PatchTarget, RomPatch};
use serde::Deserialize;

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, io::Error),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "{}: {e}", path.display()),
            ConfigError::Parse(msg) => write!(f, "bad configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: Option<String>,
    pub rom_path: Option<PathBuf>,
    pub frame_skip: u32,
    pub protect: Protect,
    pub printer: PrinterConfig,
    #[serde(rename = "patch")]
    pub patches: Vec<PatchConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Protect {
    pub floppy: bool,
    pub tape: bool,
}

/// Printing is off unless the config file turns it on.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrinterConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchConfig {
    pub image: String,
    pub offset: usize,
    pub bytes: Vec<u8>,
}

/// `<config dir>/moto/moto.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("moto").join("moto.toml"))
}

/// Read the configuration. An explicit `path` must exist; a missing file at
/// the default location gives the defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            log::info!("configuration: {}", path.display());
            parse(&text)
        }
        Err(e) if !required && e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(ConfigError::Io(path, e)),
    }
}

pub fn parse(text: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(text)?)
}

impl Config {
    pub fn model(&self) -> Result<Option<Model>, ConfigError> {
        self.model
            .as_deref()
            .map(|name| name.parse::<Model>().map_err(ConfigError::Parse))
            .transpose()
    }

    pub fn rom_patches(&self) -> Result<Vec<RomPatch>, ConfigError> {
        self.patches
            .iter()
            .map(|p| {
                let target: PatchTarget = p.image.parse().map_err(ConfigError::Parse)?;
                Ok(RomPatch::new(target, p.offset, p.bytes.clone()))
            })
            .collect()
    }
}
