//! Keyboard state and the per-family key delivery.
//!
//! Every model keeps the same 84-entry key array (0x00 = down, 0x80 = up),
//! scanned directly by the MO and TO7 matrices. The TO8 monitor instead
//! expects a scancode dropped in its RAM followed by a CP1 interrupt, and the
//! TO9 keyboard controller hands over ASCII through 0xE7DE/0xE7DF.

use super::model::{Family, Model};

pub const KEY_COUNT: usize = 84;

pub const KEY_CAPS_LOCK: u8 = 0x50;
pub const KEY_SHIFT_LEFT: u8 = 0x51;
pub const KEY_SHIFT_RIGHT: u8 = 0x52;
pub const KEY_CTRL: u8 = 0x53;

const KEY_DOWN: u8 = 0x00;
const KEY_UP: u8 = 0x80;

/// TO9 keyboard controller: ASCII of each scancode, unshifted then shifted.
#[rustfmt::skip]
const TO9_ASCII: [u8; 0xA0] = [
    0x91, 0x5F, 0x79, 0x68, 0x0B, 0x09, 0x1E, 0x6E, 0x92, 0x28, 0x74, 0x67, 0x3D, 0x08, 0x1C, 0x62,
    0x93, 0x27, 0x72, 0x66, 0x16, 0x31, 0x1D, 0x76, 0x94, 0x22, 0x65, 0x64, 0x37, 0x34, 0x30, 0x63,
    0x90, 0x80, 0x7A, 0x73, 0x38, 0x32, 0x2E, 0x78, 0x23, 0x2A, 0x61, 0x71, 0x5B, 0x35, 0x36, 0x77,
    0x02, 0x81, 0x75, 0x6A, 0x20, 0x39, 0x0D, 0x2C, 0xB0, 0x21, 0x69, 0x6B, 0x24, 0x0A, 0x5D, 0x3B,
    0xB7, 0x82, 0x6F, 0x6C, 0x2D, 0x84, 0x0D, 0x3A, 0xB3, 0x83, 0x70, 0x6D, 0x29, 0x5E, 0x33, 0x3E,
    // shifted
    0x96, 0x36, 0x59, 0x48, 0x0B, 0x09, 0x0C, 0x4E, 0x97, 0x35, 0x54, 0x47, 0x2B, 0x08, 0x1C, 0x42,
    0x98, 0x34, 0x52, 0x46, 0x16, 0x31, 0x7F, 0x56, 0x99, 0x33, 0x45, 0x44, 0x37, 0x34, 0x30, 0x43,
    0x95, 0x32, 0x5A, 0x53, 0x38, 0x32, 0x2E, 0x58, 0x40, 0x31, 0x41, 0x51, 0x7B, 0x35, 0x36, 0x57,
    0x03, 0x37, 0x55, 0x4A, 0x20, 0x39, 0x0D, 0x3F, 0xB0, 0x38, 0x49, 0x4B, 0x26, 0x0A, 0x7D, 0x2E,
    0xB8, 0x39, 0x4F, 0x4C, 0x5C, 0x25, 0x0D, 0x2F, 0xB3, 0x30, 0x50, 0x4D, 0x86, 0x85, 0x33, 0x3C,
];

/// Letter keys that CAPS LOCK shifts on the TO keyboard.
const LETTER_KEYS: [u8; 26] = [
    0x02, 0x03, 0x07, 0x0A, 0x0B, 0x0F, 0x12, 0x13, 0x17, 0x1A, 0x1B, 0x1F, 0x22, 0x23, 0x27, 0x2A,
    0x2B, 0x2F, 0x32, 0x33, 0x3A, 0x3B, 0x42, 0x43, 0x4A, 0x4B,
];

/// What a key event requires from the rest of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Last key released on a TO8/TO9: clear E7C8 bit 0 and the CP1 window.
    AllReleased,
    /// TO8/TO8D: scancode with bit 7 for SHIFT, plus the CTRL state.
    Scancode { code: u8, ctrl: bool },
    /// TO9/TO9+: ASCII code from the keyboard controller.
    Ascii(u8),
}

pub struct Keyboard {
    keys: [u8; KEY_COUNT],
    capslock: bool,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            keys: [KEY_UP; KEY_COUNT],
            capslock: true,
        }
    }

    pub fn release_all(&mut self) {
        self.keys = [KEY_UP; KEY_COUNT];
    }

    pub fn is_down(&self, code: usize) -> bool {
        self.keys.get(code) == Some(&KEY_DOWN)
    }

    /// Raw matrix value of a key: 0x00 down, 0x80 up.
    pub fn matrix_bit(&self, code: usize) -> u8 {
        self.keys.get(code).copied().unwrap_or(KEY_UP)
    }

    pub fn capslock(&self) -> bool {
        self.capslock
    }

    pub fn set_capslock(&mut self, on: bool) {
        self.capslock = on;
    }

    pub fn keys(&self) -> &[u8; KEY_COUNT] {
        &self.keys
    }

    pub fn restore_keys(&mut self, keys: [u8; KEY_COUNT]) {
        self.keys = keys;
    }

    /// Record a key transition and work out what the model's keyboard
    /// hardware does with it. A repeated key-down is ignored.
    pub fn event(&mut self, model: Model, code: u8, down: bool) -> Option<KeyAction> {
        let index = code as usize;
        if index >= KEY_COUNT || (down && self.is_down(index)) {
            return None;
        }
        self.keys[index] = if down { KEY_DOWN } else { KEY_UP };
        if model.family() != Family::To {
            return None;
        }

        if !down {
            let any_down = (0..KEY_CAPS_LOCK as usize).any(|k| self.is_down(k));
            return (!any_down).then_some(KeyAction::AllReleased);
        }

        if code == KEY_CAPS_LOCK {
            self.capslock = !self.capslock;
        }
        if code >= KEY_CAPS_LOCK {
            return None;
        }
        let shift = self.is_down(KEY_SHIFT_LEFT as usize)
            || self.is_down(KEY_SHIFT_RIGHT as usize)
            || (self.capslock && LETTER_KEYS.contains(&code));
        let ctrl = self.is_down(KEY_CTRL as usize);

        if matches!(model, Model::To8 | Model::To8d) {
            let code = if shift { code | 0x80 } else { code };
            return Some(KeyAction::Scancode { code, ctrl });
        }

        let index = if shift { code as usize + 0x50 } else { code as usize };
        let mut ascii = TO9_ASCII[index];
        if ctrl {
            ascii = match ascii {
                23 => 0,
                0x40..=0x5F => ascii - 0x40,
                0x61..=0x7F => ascii - 0x60,
                other => other,
            };
        }
        Some(KeyAction::Ascii(ascii))
    }
}

/// A physical key to hit for a character, and whether SHIFT must be held.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyStroke {
    pub code: u8,
    pub shift: bool,
}

// MO keyboards (AZERTY except the PC128), indexed by letter then digit.
#[rustfmt::skip]
const MO5_LETTERS: [u8; 26] = [
    0x2D, 0x22, 0x32, 0x1B, 0x1D, 0x13, 0x0B, 0x03, 0x0C, 0x02, 0x0A, 0x12, 0x1A,
    0x00, 0x14, 0x1C, 0x2B, 0x15, 0x23, 0x0D, 0x04, 0x2A, 0x30, 0x28, 0x05, 0x25,
];
const MO5_DIGITS: [u8; 10] = [0x1E, 0x2F, 0x27, 0x1F, 0x17, 0x0F, 0x07, 0x06, 0x0E, 0x16];

#[rustfmt::skip]
const MO6_LETTERS: [u8; 26] = [
    0x2D, 0x14, 0x16, 0x1B, 0x2B, 0x1A, 0x19, 0x18, 0x21, 0x10, 0x11, 0x12, 0x13,
    0x00, 0x22, 0x23, 0x1D, 0x2A, 0x1C, 0x29, 0x20, 0x15, 0x06, 0x05, 0x28, 0x2C,
];
#[rustfmt::skip]
const PC128_LETTERS: [u8; 26] = [
    0x1D, 0x14, 0x16, 0x1B, 0x2B, 0x1A, 0x19, 0x18, 0x21, 0x10, 0x11, 0x12, 0x01,
    0x00, 0x22, 0x23, 0x2D, 0x2A, 0x1C, 0x29, 0x20, 0x15, 0x2C, 0x05, 0x28, 0x06,
];
const MO6_DIGITS: [u8; 10] = [0x33, 0x3D, 0x3C, 0x3B, 0x3A, 0x39, 0x38, 0x30, 0x31, 0x32];

impl Model {
    /// Key used as SHIFT when typing on this model.
    pub fn shift_key(self) -> u8 {
        match self {
            Model::Mo5 => 0x38,
            Model::Mo6 | Model::Pc128 => 0x07,
            _ => KEY_SHIFT_LEFT,
        }
    }

    /// Key to press for `c`, for typing text on the emulated keyboard.
    pub fn key_for_char(self, c: char) -> Option<KeyStroke> {
        let plain = |code| Some(KeyStroke { code, shift: false });
        let shifted = |code| Some(KeyStroke { code, shift: true });

        if self.family() != Family::Mo {
            return match c {
                '\n' => plain(0x46),
                ' ' => plain(0x34),
                _ if c.is_ascii() => {
                    let lower = c.to_ascii_lowercase() as u8;
                    TO9_ASCII
                        .iter()
                        .position(|&a| a == lower)
                        .map(|i| KeyStroke {
                            code: (i % 0x50) as u8,
                            shift: i >= 0x50,
                        })
                }
                _ => None,
            };
        }

        let (letters, digits, space, enter) = match self {
            Model::Mo5 => (&MO5_LETTERS, &MO5_DIGITS, 0x20, 0x34),
            Model::Pc128 => (&PC128_LETTERS, &MO6_DIGITS, 0x04, 0x26),
            _ => (&MO6_LETTERS, &MO6_DIGITS, 0x04, 0x26),
        };
        match c {
            'a'..='z' | 'A'..='Z' => plain(letters[(c.to_ascii_lowercase() as u8 - b'a') as usize]),
            '0'..='9' => plain(digits[(c as u8 - b'0') as usize]),
            ' ' => plain(space),
            '\n' => plain(enter),
            '"' if self == Model::Mo6 => shifted(MO6_DIGITS[3]),
            '"' => shifted(digits[2]),
            ',' if self == Model::Mo5 => plain(0x08),
            ',' => plain(0x01),
            '.' if self == Model::Mo5 => plain(0x10),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_down_is_filtered() {
        let mut kb = Keyboard::new();
        assert!(kb.event(Model::To8, 0x2A, true).is_some());
        assert_eq!(kb.event(Model::To8, 0x2A, true), None);
    }

    #[test]
    fn matrix_models_only_record_state() {
        let mut kb = Keyboard::new();
        assert_eq!(kb.event(Model::Mo5, 0x10, true), None);
        assert!(kb.is_down(0x10));
        assert_eq!(kb.matrix_bit(0x10), 0x00);
        assert_eq!(kb.event(Model::To7, 0x10, false), None);
        assert_eq!(kb.matrix_bit(0x10), 0x80);
    }

    #[test]
    fn to8_capslock_shifts_letters() {
        let mut kb = Keyboard::new();
        assert!(kb.capslock());
        assert_eq!(
            kb.event(Model::To8, 0x2A, true),
            Some(KeyAction::Scancode { code: 0xAA, ctrl: false })
        );
        // Digit row is not affected by CAPS LOCK.
        kb.event(Model::To8, 0x2A, false);
        assert_eq!(
            kb.event(Model::To8, 0x29, true),
            Some(KeyAction::Scancode { code: 0x29, ctrl: false })
        );
    }

    #[test]
    fn release_reports_only_when_all_keys_are_up() {
        let mut kb = Keyboard::new();
        kb.event(Model::To9, 0x01, true);
        kb.event(Model::To9, 0x02, true);
        assert_eq!(kb.event(Model::To9, 0x01, false), None);
        assert_eq!(kb.event(Model::To9, 0x02, false), Some(KeyAction::AllReleased));
    }

    #[test]
    fn to9_translates_to_ascii() {
        let mut kb = Keyboard::new();
        kb.set_capslock(false);
        assert_eq!(kb.event(Model::To9p, 0x2A, true), Some(KeyAction::Ascii(b'a')));
        kb.event(Model::To9p, 0x2A, false);

        kb.event(Model::To9p, KEY_SHIFT_LEFT, true);
        assert_eq!(kb.event(Model::To9p, 0x2A, true), Some(KeyAction::Ascii(b'A')));
        kb.event(Model::To9p, 0x2A, false);
        kb.event(Model::To9p, KEY_SHIFT_LEFT, false);

        kb.event(Model::To9p, KEY_CTRL, true);
        assert_eq!(kb.event(Model::To9p, 0x2A, true), Some(KeyAction::Ascii(0x01)));
    }

    #[test]
    fn capslock_key_toggles() {
        let mut kb = Keyboard::new();
        assert_eq!(kb.event(Model::To8d, KEY_CAPS_LOCK, true), None);
        assert!(!kb.capslock());
    }

    #[test]
    fn typing_maps_characters() {
        assert_eq!(
            Model::To8.key_for_char('r'),
            Some(KeyStroke { code: 0x12, shift: false })
        );
        assert_eq!(
            Model::To8.key_for_char('"'),
            Some(KeyStroke { code: 0x19, shift: false })
        );
        // Digits come from the numeric keypad.
        assert_eq!(
            Model::To8.key_for_char('1'),
            Some(KeyStroke { code: 0x15, shift: false })
        );
        assert_eq!(
            Model::Mo5.key_for_char('R'),
            Some(KeyStroke { code: 0x15, shift: false })
        );
        assert_eq!(
            Model::Mo5.key_for_char('"'),
            Some(KeyStroke { code: 0x27, shift: true })
        );
        assert_eq!(Model::Pc128.key_for_char('a').map(|k| k.code), Some(0x1D));
        assert_eq!(Model::Mo6.key_for_char('~'), None);
    }
}
