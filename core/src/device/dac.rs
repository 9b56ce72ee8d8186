/// 6-bit sound DAC of the Thomson machines.
///
/// The TO machines drive it through the music and games extension (PIA port
/// B with CRB bit 2 set), the MO machines also through the single buzzer bit
/// of the system PIA, which lands on bit 5 of the level. A mute bit on the
/// 6846 control register silences the output.
pub struct SoundDac {
    /// Current level, 0-63.
    level: u8,
    muted: bool,
}

pub const MAX_LEVEL: u8 = 0x3F;

impl Default for SoundDac {
    fn default() -> Self {
        Self {
            level: 0,
            muted: false,
        }
    }
}

impl SoundDac {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a level; only the low six bits are kept.
    pub fn write(&mut self, data: u8) {
        self.level = data & MAX_LEVEL;
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Return current output as a signed 16-bit PCM sample.
    /// Maps 0 → -32768, 63 → +32767; muted output is 0.
    pub fn sample_i16(&self) -> i16 {
        if self.muted {
            return 0;
        }
        (self.level as i32 * 65535 / MAX_LEVEL as i32 - 32768) as i16
    }
}
