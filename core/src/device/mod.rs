pub mod dac;
pub mod mc6846;

pub use dac::SoundDac;
pub use mc6846::Mc6846;
