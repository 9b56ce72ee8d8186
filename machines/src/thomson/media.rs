//! Media files: kind detection from the extension and load errors.

use std::fmt;
use std::io;
use std::path::Path;

use super::model::Model;

/// What slot a media file goes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// `.k7` tape image.
    Tape,
    /// `.fd` or `.sap` floppy image.
    Floppy,
    /// `.rom`, `.m7` or `.m5` cartridge dump.
    Cartridge,
}

impl MediaKind {
    /// Kind from the file extension, case-insensitive.
    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "k7" => Ok(MediaKind::Tape),
            "fd" | "sap" => Ok(MediaKind::Floppy),
            "rom" | "m7" | "m5" => Ok(MediaKind::Cartridge),
            _ => Err(MediaError::UnknownFormat(path.display().to_string())),
        }
    }
}

/// Failure to insert a media image.
#[derive(Debug)]
pub enum MediaError {
    Io(io::Error),
    /// The extension names no known media type.
    UnknownFormat(String),
    /// A `.sap` file without the SAP signature.
    BadSapHeader,
    /// A cartridge larger than the 64 KB slot.
    TooLarge { size: usize, max: usize },
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::Io(e) => write!(f, "I/O error: {e}"),
            MediaError::UnknownFormat(name) => write!(f, "{name}: unknown media type"),
            MediaError::BadSapHeader => f.write_str("not a SAP archive"),
            MediaError::TooLarge { size, max } => {
                write!(f, "image is {size} bytes, the slot holds {max}")
            }
        }
    }
}

impl std::error::Error for MediaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MediaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MediaError {
    fn from(e: io::Error) -> Self {
        MediaError::Io(e)
    }
}

impl From<MediaError> for io::Error {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

/// Keys typed to start the program on a freshly inserted media: a menu
/// choice on the models that boot into one, then the BASIC command.
/// `basic` tells a BASIC tape from a binary one.
pub fn autostart_text(model: Model, kind: MediaKind, basic: bool) -> &'static str {
    let command = |basic| if basic { "RUN\"\n" } else { "LOADM\"\",,R\n" };
    match model {
        Model::Mo5 => command(basic),
        Model::Mo6 | Model::Pc128 => match kind {
            MediaKind::Cartridge => "0",
            _ if basic => "2RUN\"\n",
            _ => "2LOADM\"\",,R\n",
        },
        Model::To7 | Model::To770 => match kind {
            MediaKind::Cartridge => "1",
            _ if basic => "1RUN\"\n",
            _ => "1LOADM\"\",,R\n",
        },
        // BASIC 128 for floppies, BASIC 1 for tapes.
        Model::To9 => match kind {
            MediaKind::Cartridge => "0",
            MediaKind::Tape => "e",
            MediaKind::Floppy => "d",
        },
        // BASIC 512 for floppies, BASIC 1 for tapes.
        Model::To8 | Model::To8d | Model::To9p => match kind {
            MediaKind::Cartridge => "0",
            MediaKind::Tape => "c",
            MediaKind::Floppy => "b",
        },
    }
}
