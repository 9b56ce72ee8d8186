//! Two-stick joystick interface of the music and games extension.
//!
//! Directions and fire buttons are active low. The position byte holds
//! both sticks (bits 0-3 stick 0 up/down/left/right, bits 4-7 stick 1) and
//! the action byte the two buttons on bits 6 and 7.

/// Number of axes: eight directions then two buttons.
pub const AXIS_COUNT: u8 = 10;

const POSITION_CENTERED: u8 = 0xFF;
const ACTION_RELEASED: u8 = 0xC0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Joystick {
    position: u8,
    action: u8,
}

impl Default for Joystick {
    fn default() -> Self {
        Self::new()
    }
}

impl Joystick {
    pub fn new() -> Self {
        Self {
            position: POSITION_CENTERED,
            action: ACTION_RELEASED,
        }
    }

    /// Both sticks centered, buttons released.
    pub fn center(&mut self) {
        *self = Self::new();
    }

    /// Press or release one axis. A direction is refused while its
    /// opposite is held.
    pub fn set(&mut self, axis: u8, on: bool) {
        match axis {
            0..=7 => {
                let bit = 1u8 << axis;
                let opposite = 1u8 << (axis ^ 1);
                if on && self.position & opposite == 0 {
                    return;
                }
                if on {
                    self.position &= !bit;
                } else {
                    self.position |= bit;
                }
            }
            8 | 9 => {
                let bit = if axis == 8 { 0x40 } else { 0x80 };
                if on {
                    self.action &= !bit;
                } else {
                    self.action |= bit;
                }
            }
            _ => log::debug!("joystick axis {axis} ignored"),
        }
    }

    pub fn position(&self) -> u8 {
        self.position
    }

    pub fn action(&self) -> u8 {
        self.action
    }

    /// Restore raw values from a saved state.
    pub fn restore(&mut self, position: u8, action: u8) {
        self.position = position;
        self.action = action;
    }
}
