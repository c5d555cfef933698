use core::ops::BitOr;

use bitfield_struct::bitfield;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::keycode::KeyCode;

/// To represent all combinations of modifiers, at least 5 bits are needed.
/// 1 bit for Left/Right, 4 bits for modifier type. Represented in LSB format.
///
/// | bit4 | bit3 | bit2 | bit1 | bit0 |
/// | --- | --- | --- | --- | --- |
/// | L/R | GUI | ALT |SHIFT| CTRL|
#[bitfield(u8, order = Lsb, defmt = cfg(feature = "defmt"))]
#[derive(Serialize, Deserialize, MaxSize, Eq, PartialEq)]
pub struct ModifierCombination {
    #[bits(1)]
    pub ctrl: bool,
    #[bits(1)]
    pub shift: bool,
    #[bits(1)]
    pub alt: bool,
    #[bits(1)]
    pub gui: bool,
    #[bits(1)]
    pub right: bool,
    #[bits(3)]
    _reserved: u8,
}

impl BitOr for ModifierCombination {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl ModifierCombination {
    pub const LCTRL: Self = Self::new().with_ctrl(true);
    pub const LSHIFT: Self = Self::new().with_shift(true);
    pub const LALT: Self = Self::new().with_alt(true);
    pub const LGUI: Self = Self::new().with_gui(true);
    pub const RCTRL: Self = Self::new().with_ctrl(true).with_right(true);
    pub const RSHIFT: Self = Self::new().with_shift(true).with_right(true);
    pub const RALT: Self = Self::new().with_alt(true).with_right(true);
    pub const RGUI: Self = Self::new().with_gui(true).with_right(true);

    pub const fn new_from(right: bool, gui: bool, alt: bool, shift: bool, ctrl: bool) -> Self {
        ModifierCombination::new()
            .with_right(right)
            .with_gui(gui)
            .with_alt(alt)
            .with_shift(shift)
            .with_ctrl(ctrl)
    }

    /// Returns `true` if no modifier is set. The L/R bit alone doesn't count.
    pub fn is_empty(self) -> bool {
        !(self.ctrl() || self.shift() || self.alt() || self.gui())
    }

    /// Modifier keycodes in press order: ctrl, shift, alt, gui.
    ///
    /// Release them with `.rev()` so that the outermost modifier is released last.
    pub fn keycodes(self) -> impl DoubleEndedIterator<Item = KeyCode> {
        let right = self.right();
        let pick = move |set: bool, left: KeyCode, right_key: KeyCode| {
            if !set {
                None
            } else if right {
                Some(right_key)
            } else {
                Some(left)
            }
        };
        [
            pick(self.ctrl(), KeyCode::LCtrl, KeyCode::RCtrl),
            pick(self.shift(), KeyCode::LShift, KeyCode::RShift),
            pick(self.alt(), KeyCode::LAlt, KeyCode::RAlt),
            pick(self.gui(), KeyCode::LGui, KeyCode::RGui),
        ]
        .into_iter()
        .flatten()
    }
}
