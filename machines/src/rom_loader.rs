//! ROM images for the Thomson models.
//!
//! A [`RomSet`] is a bag of named files, read from a directory (or a ZIP by
//! the frontend) or built from byte slices in tests. Each model describes the
//! images it needs with [`RomImage`] entries; loading checks the size and,
//! when known, the CRC32 of every image.

use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// CRC-32
// ---------------------------------------------------------------------------

/// CRC-32 lookup table (reflected polynomial 0xEDB88320), as used by ZIP.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// CRC-32 of a byte slice.
pub fn crc32(data: &[u8]) -> u32 {
    let crc = data.iter().fold(0xFFFF_FFFFu32, |crc, &byte| {
        (crc >> 8) ^ CRC32_TABLE[((crc ^ byte as u32) & 0xFF) as usize]
    });
    crc ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading ROM images.
#[derive(Debug)]
pub enum RomLoadError {
    /// Underlying I/O error (directory missing, permission denied, ...).
    Io(std::io::Error),

    /// A required image is not in the set.
    MissingFile(String),

    /// Image size does not match the model's layout.
    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    /// CRC32 is not one of the known dumps.
    ChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },
}

impl std::fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MissingFile(name) => write!(f, "missing ROM image: {name}"),
            Self::SizeMismatch {
                file,
                expected,
                actual,
            } => write!(f, "ROM {file}: expected {expected} bytes, got {actual}"),
            Self::ChecksumMismatch {
                file,
                expected,
                actual,
            } => write!(
                f,
                "ROM {file}: CRC32 expected 0x{expected:08X}, got 0x{actual:08X}"
            ),
        }
    }
}

impl std::error::Error for RomLoadError {}

impl From<std::io::Error> for RomLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// RomSet
// ---------------------------------------------------------------------------

/// Named ROM files, kept by the machine so a model switch can reload images.
#[derive(Clone, Default)]
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Read every regular file of a directory (non-recursive), keyed by
    /// file name in lower case.
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if !file_path.is_file() {
                continue;
            }
            let Some(name) = file_path.file_name() else {
                continue;
            };
            let name = name.to_string_lossy().into_owned();
            entries.push((name, std::fs::read(&file_path)?));
        }
        log::debug!("{} ROM files found in {}", entries.len(), path.display());
        Ok(Self::from_entries(entries))
    }

    /// Build a set from owned (name, data) pairs, e.g. the members of a ZIP.
    /// Directory prefixes are dropped and names are matched case-insensitively.
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        let files = entries
            .into_iter()
            .map(|(name, data)| {
                let base = name.rsplit('/').next().unwrap_or(&name).to_ascii_lowercase();
                (base, data)
            })
            .collect();
        Self { files }
    }

    /// Build a set from byte slices (for testing).
    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        Self::from_entries(
            entries
                .iter()
                .map(|(name, data)| (name.to_string(), data.to_vec()))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
    }

    pub fn require(&self, name: &str) -> Result<&[u8], RomLoadError> {
        self.get(name)
            .ok_or_else(|| RomLoadError::MissingFile(name.to_string()))
    }

    /// Get an image, validating its exact size.
    pub fn require_sized(&self, name: &str, expected_size: usize) -> Result<&[u8], RomLoadError> {
        let data = self.require(name)?;
        if data.len() != expected_size {
            return Err(RomLoadError::SizeMismatch {
                file: name.to_string(),
                expected: expected_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Get an image of at most `max_size` bytes (cartridge dumps vary in length).
    pub fn require_max(&self, name: &str, max_size: usize) -> Result<&[u8], RomLoadError> {
        let data = self.require(name)?;
        if data.is_empty() || data.len() > max_size {
            return Err(RomLoadError::SizeMismatch {
                file: name.to_string(),
                expected: max_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(|s| s.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// RomImage
// ---------------------------------------------------------------------------

/// One ROM image of a model layout.
#[derive(Clone, Copy, Debug)]
pub struct RomImage {
    /// File name in the ROM set.
    pub name: &'static str,
    /// Exact size, or the maximum size for images loaded with `load_up_to`.
    pub size: usize,
    /// Known CRC32 values. Empty means any dump of the right size is accepted.
    pub crc32: &'static [u32],
}

impl RomImage {
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self {
            name,
            size,
            crc32: &[],
        }
    }

    /// Load the image, checking size and checksum.
    pub fn load(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        let data = rom_set.require_sized(self.name, self.size)?;
        self.verify(data)?;
        Ok(data.to_vec())
    }

    /// Load an image of variable length up to `size` bytes.
    pub fn load_up_to(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        let data = rom_set.require_max(self.name, self.size)?;
        self.verify(data)?;
        Ok(data.to_vec())
    }

    /// Load the image if present; a missing or malformed image yields
    /// `size` bytes of 0xFF (unpopulated socket).
    pub fn load_or_blank(&self, rom_set: &RomSet) -> Vec<u8> {
        match self.load(rom_set) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("{e}; continuing without it");
                vec![0xFF; self.size]
            }
        }
    }

    fn verify(&self, data: &[u8]) -> Result<(), RomLoadError> {
        if self.crc32.is_empty() {
            return Ok(());
        }
        let actual = crc32(data);
        if self.crc32.contains(&actual) {
            Ok(())
        } else {
            Err(RomLoadError::ChecksumMismatch {
                file: self.name.to_string(),
                expected: self.crc32[0],
                actual,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_vectors() {
        assert_eq!(crc32(&[]), 0x0000_0000);
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
    }

    #[test]
    fn names_are_case_insensitive() {
        let rom_set = RomSet::from_slices(&[("TO8_Monitor.ROM", &[0x01, 0x02])]);
        assert_eq!(rom_set.get("to8_monitor.rom"), Some(&[0x01, 0x02][..]));
    }

    #[test]
    fn zip_member_paths_are_flattened() {
        let rom_set = RomSet::from_entries(vec![("roms/mo5_basic.rom".into(), vec![7])]);
        assert_eq!(rom_set.get("mo5_basic.rom"), Some(&[7][..]));
    }

    #[test]
    fn require_missing_returns_error() {
        let rom_set = RomSet::from_slices(&[]);
        assert!(matches!(
            rom_set.require("missing.rom"),
            Err(RomLoadError::MissingFile(_))
        ));
    }

    #[test]
    fn require_sized_checks_length() {
        let rom_set = RomSet::from_slices(&[("test.rom", &[0u8; 100])]);
        assert!(matches!(
            rom_set.require_sized("test.rom", 64),
            Err(RomLoadError::SizeMismatch { expected: 64, actual: 100, .. })
        ));
        assert!(rom_set.require_sized("test.rom", 100).is_ok());
    }

    #[test]
    fn require_max_accepts_shorter_images() {
        let rom_set = RomSet::from_slices(&[("cart.m7", &[0u8; 0x4000])]);
        assert!(rom_set.require_max("cart.m7", 0x10000).is_ok());
        assert!(rom_set.require_max("cart.m7", 0x2000).is_err());
    }

    #[test]
    fn image_checksum_is_validated() {
        const GOOD: RomImage = RomImage {
            name: "a.rom",
            size: 9,
            crc32: &[0xCBF4_3926],
        };
        const BAD: RomImage = RomImage {
            name: "a.rom",
            size: 9,
            crc32: &[0xDEAD_BEEF],
        };
        let rom_set = RomSet::from_slices(&[("a.rom", b"123456789")]);
        assert_eq!(GOOD.load(&rom_set).unwrap(), b"123456789");
        assert!(matches!(
            BAD.load(&rom_set),
            Err(RomLoadError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn missing_optional_image_is_blank() {
        let image = RomImage::new("cd90_640.rom", 0x800);
        let data = image.load_or_blank(&RomSet::default());
        assert_eq!(data.len(), 0x800);
        assert!(data.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn from_directory_loads_files() {
        let dir = std::env::temp_dir().join("moto_rom_loader_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("test.rom"), [0xAA, 0xBB]).unwrap();

        let rom_set = RomSet::from_directory(&dir).unwrap();
        assert_eq!(rom_set.get("test.rom"), Some(&[0xAA, 0xBB][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
