//! Where the system ROMs come from: a ZIP archive or a directory of
//! loose images, in the layout [`RomSet`] expects.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use moto_machines::rom_loader::{RomLoadError, RomSet};

/// Archive looked for inside a ROM directory.
const ARCHIVE_NAME: &str = "thomson.zip";

/// Load every ROM image under `path`.
///
/// A `.zip` path is read as an archive. A directory is searched for
/// `thomson.zip` first and otherwise read file by file.
pub fn load_rom_set(path: &Path) -> Result<RomSet, RomLoadError> {
    let is_zip = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_zip {
        return read_archive(path);
    }
    if !path.is_dir() {
        return Err(RomLoadError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no ROM directory or archive at {}", path.display()),
        )));
    }

    let archive = path.join(ARCHIVE_NAME);
    if archive.is_file() {
        read_archive(&archive)
    } else {
        RomSet::from_directory(path)
    }
}

fn bad_zip(e: zip::result::ZipError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("ZIP archive: {e}"))
}

fn read_archive(path: &Path) -> Result<RomSet, RomLoadError> {
    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?)).map_err(bad_zip)?;

    let mut images = Vec::new();
    for index in 0..archive.len() {
        let mut member = archive.by_index(index).map_err(bad_zip)?;
        if member.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        member.read_to_end(&mut data)?;
        images.push((member.name().to_owned(), data));
    }
    log::info!("{} ROM images in {}", images.len(), path.display());
    Ok(RomSet::from_entries(images))
}
