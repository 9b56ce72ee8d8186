//! Floppy images behind the monitor's sector calls.
//!
//! Two containers are supported:
//!
//! * `.fd`: a flat dump of 256-byte sectors, 16 per track, 80 tracks per
//!   face and up to four faces (units) in a row.
//! * `.sap`: the Pukall archive. A 66-byte header, then one record per
//!   sector: 4 header bytes, the payload XORed with 0xB3 and a big-endian
//!   CRC over the header and plain payload. Single unit.
//!
//! Images are held in memory; writes go through to the file when there
//! is one.

use std::path::Path;

use super::ImageFile;
use crate::thomson::media::MediaError;

pub const SECTOR_SIZE: usize = 256;
pub const SECTORS_PER_TRACK: usize = 16;
pub const TRACKS: usize = 80;
pub const UNITS: usize = 4;
/// Sectors on one face.
pub const UNIT_SECTORS: usize = SECTORS_PER_TRACK * TRACKS;

const FORMAT_FILL: u8 = 0xE5;
/// Track 20 holds the directory and the FAT.
const DIRECTORY_TRACK_OFFSET: usize = 20 * SECTORS_PER_TRACK * SECTOR_SIZE;
/// Allocation blocks described by the FAT of a freshly formatted face.
const FAT_BLOCKS: usize = 160;

/// Error reported to the monitor. The code lands (minus one) at 0x604E.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiskError {
    NoDisk,
    Io,
    Protected,
}

impl DiskError {
    pub fn code(self) -> u8 {
        match self {
            DiskError::NoDisk => 71,
            DiskError::Io => 53,
            DiskError::Protected => 72,
        }
    }
}

/// Sector coordinates as the monitor passes them (sector is 1-based).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorAddress {
    pub unit: u8,
    pub track: u8,
    pub sector: u8,
}

impl SectorAddress {
    pub fn is_valid(self) -> bool {
        (self.unit as usize) < UNITS
            && (self.track as usize) < TRACKS
            && (1..=SECTORS_PER_TRACK as u8).contains(&self.sector)
    }

    /// Sector index from the start of unit 0.
    fn linear(self) -> usize {
        self.sector as usize - 1 + SECTORS_PER_TRACK * self.track as usize + UNIT_SECTORS * self.unit as usize
    }
}

/// A floppy image addressed by sector.
pub trait SectorImage {
    /// Payload size of one sector.
    fn sector_size(&self) -> usize;

    fn read_sector(&self, at: SectorAddress) -> Result<Vec<u8>, DiskError>;

    fn write_sector(&mut self, at: SectorAddress, data: &[u8]) -> Result<(), DiskError>;

    /// Rewrite one face as a blank, freshly formatted disk.
    fn format(&mut self, unit: u8) -> Result<(), DiskError>;
}

/// Layout of a formatted face, sector by sector: `(linear index, contents)`.
fn formatted_face(sector_size: usize) -> impl Iterator<Item = (usize, Vec<u8>)> {
    let directory_first = DIRECTORY_TRACK_OFFSET / SECTOR_SIZE;
    (0..UNIT_SECTORS).map(move |i| {
        let mut data = vec![FORMAT_FILL; sector_size];
        if (directory_first..directory_first + SECTORS_PER_TRACK).contains(&i) {
            data.fill(0xFF);
            if i == directory_first + 1 {
                // FAT: block 0 reserved, track 20 blocks marked used.
                data[0] = 0x00;
                for (j, byte) in data.iter_mut().enumerate() {
                    if j == 0x29 || j == 0x2A || j > FAT_BLOCKS {
                        *byte = 0xFE;
                    }
                }
            }
        }
        (i, data)
    })
}

// ---------------------------------------------------------------------------
// .fd
// ---------------------------------------------------------------------------

pub struct FdImage {
    data: Vec<u8>,
    file: ImageFile,
}

impl FdImage {
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            file: ImageFile::detached(),
        }
    }

    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let (data, file) = ImageFile::open(path)?;
        Ok(Self { data, file })
    }

    pub fn is_read_only(&self) -> bool {
        self.file.is_read_only()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn store(&mut self, offset: usize, bytes: &[u8]) -> Result<(), DiskError> {
        let end = offset + bytes.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(bytes);
        self.file.write_at(offset, bytes).map_err(|e| {
            log::warn!("floppy write failed: {e}");
            DiskError::Io
        })
    }
}

impl SectorImage for FdImage {
    fn sector_size(&self) -> usize {
        SECTOR_SIZE
    }

    fn read_sector(&self, at: SectorAddress) -> Result<Vec<u8>, DiskError> {
        let offset = at.linear() * SECTOR_SIZE;
        self.data
            .get(offset..offset + SECTOR_SIZE)
            .map(|s| s.to_vec())
            .ok_or(DiskError::Io)
    }

    fn write_sector(&mut self, at: SectorAddress, data: &[u8]) -> Result<(), DiskError> {
        let mut sector = [0u8; SECTOR_SIZE];
        let n = data.len().min(SECTOR_SIZE);
        sector[..n].copy_from_slice(&data[..n]);
        self.store(at.linear() * SECTOR_SIZE, &sector)
    }

    fn format(&mut self, unit: u8) -> Result<(), DiskError> {
        let base = unit as usize * UNIT_SECTORS;
        let mut face = Vec::with_capacity(UNIT_SECTORS * SECTOR_SIZE);
        for (_, sector) in formatted_face(SECTOR_SIZE) {
            face.extend_from_slice(&sector);
        }
        self.store(base * SECTOR_SIZE, &face)
    }
}

// ---------------------------------------------------------------------------
// .sap
// ---------------------------------------------------------------------------

pub const SAP_HEADER_SIZE: usize = 66;
pub const SAP_SIGNATURE: &[u8] = b"SYSTEME D'ARCHIVAGE PUKALL S.A.P.";
const SAP_RECORD_HEADER: usize = 4;
const SAP_CRC_SIZE: usize = 2;
const SAP_XOR: u8 = 0xB3;

/// Nibble table of the SAP CRC.
const PUK_TABLE: [u16; 16] = [
    0x0000, 0x1081, 0x2102, 0x3183, 0x4204, 0x5285, 0x6306, 0x7387, 0x8408, 0x9489, 0xA50A, 0xB58B,
    0xC60C, 0xD68D, 0xE70E, 0xF78F,
];

/// SAP CRC: low nibble first, then high nibble, from 0xFFFF.
pub fn sap_crc(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0xFFFF, |crc, &byte| {
        let crc = ((crc >> 4) & 0x0FFF) ^ PUK_TABLE[((crc ^ byte as u16) & 0x0F) as usize];
        ((crc >> 4) & 0x0FFF) ^ PUK_TABLE[((crc ^ (byte >> 4) as u16) & 0x0F) as usize]
    })
}

/// Sector size announced by the format byte of a SAP header.
fn sap_sector_size(format: u8) -> Option<usize> {
    match format {
        1 => Some(SECTOR_SIZE),
        2 => Some(128),
        _ => None,
    }
}

pub struct SapImage {
    data: Vec<u8>,
    file: ImageFile,
    sector_size: usize,
}

impl SapImage {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, MediaError> {
        Self::with_file(data, ImageFile::detached())
    }

    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let (data, file) = ImageFile::open(path)?;
        Self::with_file(data, file)
    }

    fn with_file(data: Vec<u8>, file: ImageFile) -> Result<Self, MediaError> {
        if data.len() < SAP_HEADER_SIZE || !data[1..].starts_with(SAP_SIGNATURE) {
            return Err(MediaError::BadSapHeader);
        }
        let Some(sector_size) = sap_sector_size(data[0]) else {
            return Err(MediaError::BadSapHeader);
        };
        Ok(Self {
            data,
            file,
            sector_size,
        })
    }

    /// Blank archive of the given format (2: 128-byte sectors, otherwise
    /// format 1 with 256-byte sectors).
    pub fn blank(format: u8) -> Self {
        let format = if format == 2 { 2 } else { 1 };
        let sector_size = if format == 2 { 128 } else { SECTOR_SIZE };
        let mut data = vec![0u8; SAP_HEADER_SIZE];
        data[0] = format;
        data[1..1 + SAP_SIGNATURE.len()].copy_from_slice(SAP_SIGNATURE);
        let mut image = Self {
            data,
            file: ImageFile::detached(),
            sector_size,
        };
        for track in 0..TRACKS as u8 {
            for sector in 1..=SECTORS_PER_TRACK as u8 {
                image.put_record(track, sector, 0, &vec![FORMAT_FILL; sector_size]);
            }
        }
        image
    }

    pub fn is_read_only(&self) -> bool {
        self.file.is_read_only()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn record_size(&self) -> usize {
        SAP_RECORD_HEADER + self.sector_size + SAP_CRC_SIZE
    }

    fn record_offset(&self, track: u8, sector: u8) -> usize {
        SAP_HEADER_SIZE + (track as usize * SECTORS_PER_TRACK + sector as usize - 1) * self.record_size()
    }

    /// Encode one record in memory and return its offset and bytes.
    fn put_record(&mut self, track: u8, sector: u8, protection: u8, payload: &[u8]) -> (usize, Vec<u8>) {
        let format = self.data[0];
        let mut record = vec![format, protection, track, sector];
        record.extend_from_slice(payload);
        record.resize(SAP_RECORD_HEADER + self.sector_size, 0);
        let crc = sap_crc(&record);
        for byte in &mut record[SAP_RECORD_HEADER..] {
            *byte ^= SAP_XOR;
        }
        record.extend_from_slice(&crc.to_be_bytes());

        let offset = self.record_offset(track, sector);
        let end = offset + record.len();
        if self.data.len() < end {
            self.data.resize(end, 0);
        }
        self.data[offset..end].copy_from_slice(&record);
        (offset, record)
    }
}

impl SectorImage for SapImage {
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn read_sector(&self, at: SectorAddress) -> Result<Vec<u8>, DiskError> {
        if at.unit != 0 {
            return Err(DiskError::Io);
        }
        let offset = self.record_offset(at.track, at.sector);
        let record = self
            .data
            .get(offset..offset + self.record_size())
            .ok_or(DiskError::Io)?;
        let (body, crc) = record.split_at(SAP_RECORD_HEADER + self.sector_size);
        let mut plain = body.to_vec();
        for byte in &mut plain[SAP_RECORD_HEADER..] {
            *byte ^= SAP_XOR;
        }
        if sap_crc(&plain) != u16::from_be_bytes([crc[0], crc[1]]) {
            log::warn!("SAP CRC error at track {} sector {}", at.track, at.sector);
            return Err(DiskError::Io);
        }
        Ok(plain.split_off(SAP_RECORD_HEADER))
    }

    fn write_sector(&mut self, at: SectorAddress, data: &[u8]) -> Result<(), DiskError> {
        if at.unit != 0 {
            return Err(DiskError::Io);
        }
        let offset = self.record_offset(at.track, at.sector);
        let protection = *self.data.get(offset + 1).ok_or(DiskError::Io)?;
        if protection != 0 {
            return Err(DiskError::Protected);
        }
        let (offset, record) = self.put_record(at.track, at.sector, protection, data);
        self.file.write_at(offset, &record).map_err(|e| {
            log::warn!("SAP write failed: {e}");
            DiskError::Io
        })
    }

    fn format(&mut self, unit: u8) -> Result<(), DiskError> {
        if unit != 0 {
            return Err(DiskError::Io);
        }
        let sector_size = self.sector_size;
        for (i, data) in formatted_face(sector_size) {
            let track = (i / SECTORS_PER_TRACK) as u8;
            let sector = (i % SECTORS_PER_TRACK) as u8 + 1;
            let (offset, record) = self.put_record(track, sector, 0, &data);
            self.file.write_at(offset, &record).map_err(|_| DiskError::Io)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Drive
// ---------------------------------------------------------------------------

/// The floppy drive: an optional image and the write-protect switch.
#[derive(Default)]
pub struct FloppyDrive {
    image: Option<Box<dyn SectorImage>>,
    protected: bool,
}

impl FloppyDrive {
    pub fn insert(&mut self, image: Box<dyn SectorImage>) {
        self.image = Some(image);
    }

    /// Open an `.fd` or `.sap` file; a read-only file is write protected.
    pub fn load(&mut self, path: &Path) -> Result<(), MediaError> {
        let is_sap = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("sap"));
        let (image, read_only): (Box<dyn SectorImage>, bool) = if is_sap {
            let image = SapImage::open(path)?;
            let read_only = image.is_read_only();
            (Box::new(image), read_only)
        } else {
            let image = FdImage::open(path)?;
            let read_only = image.is_read_only();
            (Box::new(image), read_only)
        };
        if read_only {
            self.protected = true;
        }
        self.insert(image);
        log::info!("floppy {} inserted", path.display());
        Ok(())
    }

    pub fn eject(&mut self) {
        self.image = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn read(&self, at: SectorAddress) -> Result<Vec<u8>, DiskError> {
        let image = self.image.as_ref().ok_or(DiskError::NoDisk)?;
        if !at.is_valid() {
            return Err(DiskError::Io);
        }
        image.read_sector(at)
    }

    pub fn write(&mut self, at: SectorAddress, data: &[u8]) -> Result<(), DiskError> {
        let image = self.writable_image()?;
        if !at.is_valid() {
            return Err(DiskError::Io);
        }
        image.write_sector(at, data)
    }

    /// Format one face. An out-of-range unit is ignored.
    pub fn format(&mut self, unit: u8) -> Result<(), DiskError> {
        let image = self.writable_image()?;
        if unit as usize >= UNITS {
            return Ok(());
        }
        image.format(unit)
    }

    fn writable_image(&mut self) -> Result<&mut Box<dyn SectorImage>, DiskError> {
        let protected = self.protected;
        let image = self.image.as_mut().ok_or(DiskError::NoDisk)?;
        if protected {
            return Err(DiskError::Protected);
        }
        Ok(image)
    }
}
