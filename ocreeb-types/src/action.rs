//! Keyboard actions and behaviors.
//!
//! Key types:
//! - [`Action`] - Single operations that the macropad sends or executes
//! - [`KeyAction`] - What a key position is bound to, including the timing wrappers
//! - [`EncoderAction`] - The (clockwise, counter-clockwise, push) tuple of a rotary encoder

use serde::{Deserialize, Serialize};

use crate::keycode::KeyCode;
use crate::modifier::ModifierCombination;

/// A KeyAction is the action at a keyboard position, stored in keymap.
///
/// `RapidFire`, `TapDance` reference an entry of the corresponding behavior table by index.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyAction {
    /// No action.
    No,
    /// Transparent action, the next layer in the active stack will be checked.
    Transparent,
    /// A single action, triggered when pressed and cancelled when released.
    Single(Action),
    /// Don't wait the release of the key, press and release on key press.
    Tap(Action),
    /// Repeat an action while the key is held, or until pressed again in toggle mode.
    RapidFire(u8),
    /// Resolve to different actions by the number of taps.
    TapDance(u8),
}

impl KeyAction {
    /// The layer index referenced by this binding, if any
    pub fn layer(&self) -> Option<u8> {
        match self {
            KeyAction::Single(a) | KeyAction::Tap(a) => a.layer(),
            _ => None,
        }
    }
}

/// A single basic action that the macropad can execute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// A normal key stroke.
    Key(KeyCode),
    /// Key stroke with modifier combination triggered.
    KeyWithModifier(KeyCode, ModifierCombination),
    /// Activate a layer while the key is held
    LayerOn(u8),
    /// Deactivate a layer
    LayerOff(u8),
    /// Replace the whole active layer stack with the given layer
    LayerTo(u8),
    /// Go to the next layer, wrapping around
    LayerNext,
    /// Go to the previous layer, wrapping around
    LayerPrev,
    /// Triggers the macro at the index.
    TriggerMacro(u8),
    /// Switch the encoders between their normal and alternate bindings
    ToggleEncoderMode,
    /// Adjust the status light
    Light(LightAction),
}

impl Action {
    /// The layer index referenced by this action, if any
    pub fn layer(&self) -> Option<u8> {
        match self {
            Action::LayerOn(l) | Action::LayerOff(l) | Action::LayerTo(l) => Some(*l),
            _ => None,
        }
    }
}

/// Adjustments of the status light.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LightAction {
    Toggle,
    HueUp,
    HueDown,
    SaturationUp,
    SaturationDown,
    ValueUp,
    ValueDown,
}

/// EncoderAction is the action tuple of an encoder, stored in encoder_map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderAction {
    clockwise: KeyAction,
    counter_clockwise: KeyAction,
    push: KeyAction,
}

impl Default for EncoderAction {
    fn default() -> Self {
        Self {
            clockwise: KeyAction::No,
            counter_clockwise: KeyAction::No,
            push: KeyAction::No,
        }
    }
}

impl EncoderAction {
    /// Create a new encoder action.
    pub const fn new(clockwise: KeyAction, counter_clockwise: KeyAction, push: KeyAction) -> Self {
        Self {
            clockwise,
            counter_clockwise,
            push,
        }
    }

    pub fn clockwise(&self) -> KeyAction {
        self.clockwise
    }

    pub fn counter_clockwise(&self) -> KeyAction {
        self.counter_clockwise
    }

    pub fn push(&self) -> KeyAction {
        self.push
    }

    /// All three bindings, in (clockwise, counter-clockwise, push) order
    pub fn actions(&self) -> [KeyAction; 3] {
        [self.clockwise, self.counter_clockwise, self.push]
    }
}
