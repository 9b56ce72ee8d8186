//! Binary patches applied to the system ROMs at hard reset.

use chrono::{DateTime, Local, TimeZone};

use super::board::SystemRoms;

/// ROM image a patch targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchTarget {
    Basic,
    Monitor,
    Disk,
}

impl std::str::FromStr for PatchTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(PatchTarget::Basic),
            "monitor" => Ok(PatchTarget::Monitor),
            "disk" => Ok(PatchTarget::Disk),
            _ => Err(format!("unknown ROM image '{s}'")),
        }
    }
}

/// Bytes written at an offset of one ROM image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RomPatch {
    pub target: PatchTarget,
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl RomPatch {
    pub fn new(target: PatchTarget, offset: usize, bytes: Vec<u8>) -> Self {
        Self {
            target,
            offset,
            bytes,
        }
    }

    /// Write the bytes; a patch running past the image end is skipped.
    pub fn apply(&self, roms: &mut SystemRoms) -> bool {
        let image = match self.target {
            PatchTarget::Basic => &mut roms.basic,
            PatchTarget::Monitor => &mut roms.monitor,
            PatchTarget::Disk => &mut roms.disk,
        };
        let Some(slot) = image.get_mut(self.offset..self.offset + self.bytes.len()) else {
            log::warn!(
                "{:?} patch at {:#06X} ({} bytes) is outside the image",
                self.target,
                self.offset,
                self.bytes.len()
            );
            return false;
        };
        slot.copy_from_slice(&self.bytes);
        true
    }
}

/// "jj-mm-aa" date shown by the TO8/TO9+ BASIC.
const DATE_TEXT: usize = 0xEB90;
/// End-of-string marker after the date.
const DATE_END: usize = 0xEB98;
/// Reset code that copies the date to RAM: `LDX #$2B90 / JSR $29C8`.
const DATE_INIT: usize = 0xE4E2;
const DATE_INIT_CODE: [u8; 6] = [0x8E, 0x2B, 0x90, 0xBD, 0x29, 0xC8];

/// Put today's date in a TO8/TO8D/TO9+ BASIC image.
pub fn apply_date(basic: &mut [u8]) {
    apply_date_at(basic, &Local::now());
}

pub fn apply_date_at<Tz: TimeZone>(basic: &mut [u8], now: &DateTime<Tz>)
where
    Tz::Offset: std::fmt::Display,
{
    if basic.len() <= DATE_END {
        log::warn!("BASIC image too small for the date patch");
        return;
    }
    let text = now.format("%d-%m-%y").to_string();
    basic[DATE_TEXT..DATE_END].copy_from_slice(&text.as_bytes()[..DATE_END - DATE_TEXT]);
    basic[DATE_END] = 0x1F;
    basic[DATE_INIT..DATE_INIT + DATE_INIT_CODE.len()].copy_from_slice(&DATE_INIT_CODE);
}
