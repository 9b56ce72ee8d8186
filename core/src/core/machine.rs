use std::fmt;
use std::io;
use std::path::Path;

/// Describes a single input button that a machine accepts.
pub struct InputButton {
    /// Machine-defined button identifier, passed to `set_input()`.
    pub id: u8,
    /// Human-readable name for display/configuration (e.g., "ENT", "Joy 1 Up").
    pub name: &'static str,
}

/// Failure to restore a serialized machine state.
#[derive(Debug, PartialEq, Eq)]
pub enum StateError {
    /// The blob does not have the size this machine serializes to.
    SizeMismatch { expected: usize, actual: usize },
    /// The blob names a model id this machine does not know.
    UnknownModel(i32),
    /// The blob was saved on another model whose ROMs cannot be loaded.
    ModelUnavailable { model: i32, reason: String },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::SizeMismatch { expected, actual } => {
                write!(f, "state size mismatch: expected {expected} bytes, got {actual}")
            }
            StateError::UnknownModel(id) => write!(f, "unknown model id {id} in state"),
            StateError::ModelUnavailable { model, reason } => {
                write!(f, "cannot switch to model {model}: {reason}")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Machine-agnostic interface for emulated systems.
///
/// The frontend drives a machine only through this trait: it does not know
/// about gate arrays, bank registers or peripheral traps.
pub trait Machine {
    /// Native display resolution as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Run one frame of emulation (advance the clock by one frame's worth of cycles).
    fn run_frame(&mut self);

    /// Render the current video state into an RGB24 pixel buffer.
    ///
    /// The buffer must be at least `width * height * 3` bytes (from `display_size()`).
    /// Pixels are stored left-to-right, top-to-bottom, 3 bytes per pixel (R, G, B).
    fn render_frame(&self, buffer: &mut [u8]);

    /// Handle an input event. `button` is a machine-defined ID from `input_map()`.
    /// `pressed` is true for key-down, false for key-up.
    fn set_input(&mut self, button: u8, pressed: bool);

    /// Get the list of input buttons this machine accepts.
    fn input_map(&self) -> &[InputButton];

    /// Reset the machine to its initial power-on state.
    fn reset(&mut self);

    /// Current speaker level as a signed 16-bit sample.
    fn audio_sample(&self) -> i16 {
        0
    }

    /// Position of the light pen / mouse in display coordinates and button state.
    fn set_pointer(&mut self, _x: i32, _y: i32, _pressed: bool) {}

    /// Insert a media image (tape, floppy, cartridge) chosen from the file name.
    fn load_media(&mut self, path: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{}: this machine has no media slots", path.display()),
        ))
    }

    /// Serialize the whole machine state.
    fn save_state(&self) -> Vec<u8> {
        Vec::new()
    }

    /// Restore a state produced by `save_state()`.
    fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        Err(StateError::SizeMismatch {
            expected: 0,
            actual: data.len(),
        })
    }
}
