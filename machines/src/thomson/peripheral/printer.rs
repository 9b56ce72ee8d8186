//! Printer port: every printed byte is appended to a sink, usually a file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_PRINTER_FILE: &str = "moto-printer.txt";

/// Destination of the printer output.
pub enum PrinterSink {
    /// Opened lazily on the first byte, in append mode.
    File { path: PathBuf, file: Option<File> },
    Memory(Vec<u8>),
}

pub struct Printer {
    enabled: bool,
    sink: PrinterSink,
}

/// Disabled, writing to [`DEFAULT_PRINTER_FILE`] once enabled.
impl Default for Printer {
    fn default() -> Self {
        let mut printer = Self::to_file(Path::new(DEFAULT_PRINTER_FILE));
        printer.enabled = false;
        printer
    }
}

impl Printer {
    pub fn to_file(path: &Path) -> Self {
        Self {
            enabled: true,
            sink: PrinterSink::File {
                path: path.to_path_buf(),
                file: None,
            },
        }
    }

    pub fn in_memory() -> Self {
        Self {
            enabled: true,
            sink: PrinterSink::Memory(Vec::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Bytes printed so far, for the in-memory sink.
    pub fn output(&self) -> Option<&[u8]> {
        match &self.sink {
            PrinterSink::Memory(buf) => Some(buf),
            PrinterSink::File { .. } => None,
        }
    }

    /// Print one byte. Returns false if the printer is off or the file
    /// cannot be written.
    pub fn print(&mut self, byte: u8) -> bool {
        if !self.enabled {
            return false;
        }
        match self.write(byte) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("printer output failed: {e}");
                false
            }
        }
    }

    fn write(&mut self, byte: u8) -> io::Result<()> {
        match &mut self.sink {
            PrinterSink::Memory(buf) => {
                buf.push(byte);
                Ok(())
            }
            PrinterSink::File { path, file } => {
                if file.is_none() {
                    *file = Some(OpenOptions::new().create(true).append(true).open(&*path)?);
                }
                match file {
                    Some(file) => file.write_all(&[byte]),
                    None => Ok(()),
                }
            }
        }
    }
}
