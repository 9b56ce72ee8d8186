//! Cassette deck for `.k7` images.
//!
//! A `.k7` file is the raw byte stream the monitor reads. The deck keeps
//! the image in memory with a read/write position; the counter shown to
//! the user advances in 512-byte blocks.

use std::path::Path;

use super::ImageFile;
use crate::thomson::media::MediaError;

/// Size of one counter step.
pub const BLOCK_SIZE: usize = 512;

/// Patterns identifying a BASIC program as the first file of a tape.
const BASIC_PATTERNS: [&[u8]; 3] = [b"BAS\0", b"ENTETE  MO", b"ENTETE  TO"];
const BASIC_PROBE_LEN: usize = 32;

struct Tape {
    data: Vec<u8>,
    file: ImageFile,
    position: usize,
}

/// The cassette deck, with the bit shift state of the monitor's bit reads.
#[derive(Default)]
pub struct TapeDeck {
    tape: Option<Tape>,
    protected: bool,
    index: usize,
    /// Mask of the next bit to deliver; 0 when a new byte must be read.
    pub(crate) bit_mask: u8,
    /// Byte being delivered bit by bit.
    pub(crate) octet: u8,
}

impl TapeDeck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an in-memory tape.
    pub fn insert(&mut self, data: Vec<u8>) {
        self.insert_with_file(data, ImageFile::detached());
    }

    pub fn load(&mut self, path: &Path) -> Result<(), MediaError> {
        let (data, file) = ImageFile::open(path)?;
        if file.is_read_only() {
            self.protected = true;
        }
        self.insert_with_file(data, file);
        log::info!(
            "tape {} inserted, {} blocks",
            path.display(),
            self.index_max()
        );
        Ok(())
    }

    fn insert_with_file(&mut self, data: Vec<u8>, file: ImageFile) {
        self.tape = Some(Tape {
            data,
            file,
            position: 0,
        });
        self.index = 0;
    }

    pub fn eject(&mut self) {
        self.tape = None;
        self.index = 0;
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.tape.is_some()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    pub fn rewind(&mut self) {
        if let Some(tape) = &mut self.tape {
            tape.position = 0;
        }
        self.index = 0;
    }

    /// Counter value, in blocks.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Counter value at the end of the tape.
    pub fn index_max(&self) -> usize {
        self.tape.as_ref().map_or(0, |t| t.data.len() / BLOCK_SIZE)
    }

    /// Move to the start of a block, clamped to the end of the tape.
    pub fn seek(&mut self, index: usize) {
        let Some(tape) = &mut self.tape else {
            return;
        };
        tape.position = index.saturating_mul(BLOCK_SIZE).min(tape.data.len());
        self.index = tape.position / BLOCK_SIZE;
    }

    pub fn position(&self) -> usize {
        self.tape.as_ref().map_or(0, |t| t.position)
    }

    /// Next byte. `None` without a tape or at the end of it; the end
    /// rewinds the tape.
    pub fn read_byte(&mut self) -> Option<u8> {
        let tape = self.tape.as_mut()?;
        let Some(&byte) = tape.data.get(tape.position) else {
            log::debug!("end of tape");
            self.rewind();
            return None;
        };
        tape.position += 1;
        self.track_block();
        Some(byte)
    }

    /// Record a byte at the current position. Fails without a tape, when
    /// the deck is protected or when the image file refuses the write; a
    /// failed write leaves the tape untouched.
    pub fn write_byte(&mut self, byte: u8) -> bool {
        if self.protected {
            return false;
        }
        let Some(tape) = self.tape.as_mut() else {
            return false;
        };
        let offset = tape.position;
        if let Err(e) = tape.file.write_at(offset, &[byte]) {
            log::warn!("tape write failed: {e}");
            return false;
        }
        if offset < tape.data.len() {
            tape.data[offset] = byte;
        } else {
            tape.data.push(byte);
        }
        tape.position += 1;
        self.track_block();
        true
    }

    fn track_block(&mut self) {
        let position = self.position();
        if position % BLOCK_SIZE == 0 {
            self.index = position / BLOCK_SIZE;
        }
    }

    /// Whether the first file on the tape looks like a BASIC program.
    pub fn first_file_is_basic(&self) -> bool {
        self.tape.as_ref().is_some_and(|t| is_basic(&t.data))
    }
}

/// BASIC program markers in the first bytes of a tape image.
pub fn is_basic(data: &[u8]) -> bool {
    let probe = &data[..data.len().min(BASIC_PROBE_LEN)];
    BASIC_PATTERNS
        .iter()
        .any(|pattern| probe.windows(pattern.len()).any(|w| w == *pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_then_rewinds_at_end() {
        let mut deck = TapeDeck::new();
        assert_eq!(deck.read_byte(), None);
        deck.insert(vec![1, 2]);
        assert_eq!(deck.read_byte(), Some(1));
        assert_eq!(deck.read_byte(), Some(2));
        assert_eq!(deck.read_byte(), None);
        assert_eq!(deck.position(), 0);
        assert_eq!(deck.read_byte(), Some(1));
    }

    #[test]
    fn counter_advances_per_block() {
        let mut deck = TapeDeck::new();
        deck.insert(vec![0; 1300]);
        assert_eq!(deck.index_max(), 2);
        for _ in 0..511 {
            deck.read_byte();
        }
        assert_eq!(deck.index(), 0);
        deck.read_byte();
        assert_eq!(deck.index(), 1);
        deck.seek(2);
        assert_eq!((deck.index(), deck.position()), (2, 1024));
        deck.seek(10);
        assert_eq!(deck.position(), 1300);
        deck.seek(usize::MAX);
        assert_eq!((deck.index(), deck.position()), (2, 1300));
    }

    #[test]
    fn writes_respect_protection() {
        let mut deck = TapeDeck::new();
        assert!(!deck.write_byte(1));
        deck.insert(vec![9]);
        assert!(deck.write_byte(5));
        assert!(deck.write_byte(6));
        deck.rewind();
        assert_eq!(deck.read_byte(), Some(5));
        assert_eq!(deck.read_byte(), Some(6));
        deck.set_protected(true);
        assert!(!deck.write_byte(7));
    }

    #[test]
    fn failed_file_write_leaves_tape_alone() {
        let path = std::env::temp_dir().join("moto_tape_readonly.k7");
        std::fs::write(&path, [1, 2, 3]).unwrap();
        // A handle without write access fails even where permission bits
        // are not enforced.
        let file = ImageFile {
            file: Some(std::fs::File::open(&path).unwrap()),
            read_only: false,
        };
        let mut deck = TapeDeck::new();
        deck.insert_with_file(vec![1, 2, 3], file);

        assert!(!deck.write_byte(9));
        assert_eq!(deck.position(), 0);
        assert_eq!(deck.read_byte(), Some(1));
        assert_eq!(std::fs::read(&path).unwrap(), [1, 2, 3]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn basic_detection() {
        let mut header = vec![0x01, 0x3C, 0x00];
        header.extend_from_slice(b"ENTETE  MO5");
        assert!(is_basic(&header));
        assert!(is_basic(b"\x3c\x5aPROGRAM BAS\0"));
        assert!(!is_basic(b"GAME    BIN"));
        // Only the first 32 bytes count.
        let mut late = vec![0u8; 40];
        late.extend_from_slice(b"BAS\0");
        assert!(!is_basic(&late));
    }
}
