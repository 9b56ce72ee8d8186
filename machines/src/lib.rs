pub mod registry;
pub mod rom_loader;
pub mod thomson;

pub use rom_loader::{RomLoadError, RomSet};
pub use thomson::{Model, Thomson};
