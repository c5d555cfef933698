//! Input events consumed by the core.
//!
//! Key transitions come from the matrix scanner, encoder steps from the quadrature decoder.
//! Both arrive as a [`KeyboardEvent`]; the timestamp is taken from the [`Clock`](crate::timer::Clock)
//! when the event is processed.

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

/// `KeyboardEvent` is the event whose `KeyAction` is stored in the keymap or the encoder map.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardEvent {
    pub pressed: bool,
    pub pos: KeyboardEventPos,
}

impl KeyboardEvent {
    pub fn key(row: u8, col: u8, pressed: bool) -> Self {
        Self {
            pressed,
            pos: KeyboardEventPos::Key(KeyPos { row, col }),
        }
    }

    /// One encoder step or push. Encoder events are momentary, they have no release.
    pub fn rotary_encoder(id: u8, direction: Direction) -> Self {
        Self {
            pressed: true,
            pos: KeyboardEventPos::RotaryEncoder(RotaryEncoderPos { id, direction }),
        }
    }

    /// The same position with the given pressed state
    pub(crate) fn with_pressed(self, pressed: bool) -> Self {
        Self { pressed, ..self }
    }
}

/// The position of the keyboard event.
///
/// The position can be either a key (row, col), or a rotary encoder (id, direction)
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyboardEventPos {
    Key(KeyPos),
    RotaryEncoder(RotaryEncoderPos),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RotaryEncoderPos {
    /// The id of the rotary encoder
    pub id: u8,
    /// The direction of the rotary encoder
    pub direction: Direction,
}

/// Encoder input, as produced by the quadrature decoder
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// A clockwise step, `+1`
    Clockwise,
    /// A counterclockwise step, `-1`
    CounterClockwise,
    /// The encoder's push button
    Push,
}
