//! Default layout of the ocreeb-12: 3x4 keys, two encoders, five layers.
//!
//! | Layer | Color | Use |
//! | --- | --- | --- |
//! | 0 | blue | video playback |
//! | 1 | cyan | numpad |
//! | 2 | green | function keys |
//! | 3 | red | media |
//! | 4 | off | media, encoder 2 as plain arrows |
//!
//! The upper left key always goes to the next layer. Encoder 1 controls the volume on every
//! layer, encoder 2 depends on the layer.

use heapless::Vec;
use ocreeb_types::action::{Action, KeyAction, LightAction};
use ocreeb_types::keycode::KeyCode;
use ocreeb_types::modifier::ModifierCombination;

use crate::config::{BehaviorConfig, KeyboardConfig, LightConfig, MacrosConfig, RapidFiresConfig};
use crate::encoder::EncoderBinding;
use crate::keyboard_macro::{Macro, MacroOperation};
use crate::rapid_fire::RapidFire;
use crate::{a, encoder, k, layer, lcy_p, light, mcr, rf, wm};

pub const ROW: usize = 3;
pub const COL: usize = 4;
pub const NUM_LAYER: usize = 5;
pub const NUM_ENCODER: usize = 2;

/// Open a terminal, then clear the line
pub const MACRO_TERMINAL: u8 = 0;
/// Open the force quit dialog
pub const MACRO_FORCE_QUIT: u8 = 1;
/// Lock the screen, wait, then escape
pub const MACRO_LOCK: u8 = 2;
/// Playback speed up by two steps
pub const MACRO_SPEED_UP: u8 = 3;
/// Playback speed down by two steps
pub const MACRO_SPEED_DOWN: u8 = 4;

/// Left arrow every 5s, toggled on and off by tapping
pub const RAPID_FIRE_REPEAT_LEFT: u8 = 0;

const TOGGLE_ENCODER_MODE: KeyAction = KeyAction::Single(Action::ToggleEncoderMode);

#[rustfmt::skip]
pub const fn get_default_keymap() -> [[[KeyAction; COL]; ROW]; NUM_LAYER] {
    [
        layer!([
            [lcy_p!(), a!(No), k!(MediaPlayPause), mcr!(2)],
            [k!(F2), mcr!(4), k!(AudioMute), mcr!(3)],
            [rf!(0), k!(Left), k!(Space), k!(Right)]
        ]),
        layer!([
            [lcy_p!(), k!(Kc1), k!(Kc2), k!(Kc3)],
            [k!(Home), k!(Kc4), k!(Kc5), k!(Kc6)],
            [k!(Kc0), k!(Kc7), k!(Kc8), k!(Kc9)]
        ]),
        layer!([
            [lcy_p!(), k!(F1), k!(F2), k!(F3)],
            [k!(F10), k!(F4), k!(F5), k!(F6)],
            [k!(F12), k!(F7), k!(F8), k!(F9)]
        ]),
        layer!([
            [lcy_p!(), k!(MediaPrevTrack), k!(MediaNextTrack), k!(MediaStop)],
            [k!(AudioVolDown), k!(AudioVolUp), k!(AudioMute), a!(No)],
            [k!(C), a!(No), a!(No), a!(No)]
        ]),
        layer!([
            [lcy_p!(), k!(MediaPrevTrack), k!(MediaNextTrack), k!(MediaStop)],
            [k!(AudioVolDown), k!(AudioVolUp), k!(AudioMute), a!(No)],
            [k!(C), a!(No), a!(No), a!(No)]
        ]),
    ]
}

#[rustfmt::skip]
pub const fn get_default_encoder_map() -> [[EncoderBinding; NUM_ENCODER]; NUM_LAYER] {
    let volume = EncoderBinding::Fixed(encoder!(k!(AudioVolDown), k!(AudioVolUp), k!(AudioMute)));
    let brightness = EncoderBinding::Fixed(encoder!(light!(ValueDown), light!(ValueUp), light!(Toggle)));
    let scroll = EncoderBinding::Switchable {
        normal: encoder!(k!(MouseWheelUp), k!(MouseWheelDown), TOGGLE_ENCODER_MODE),
        alternate: encoder!(k!(Up), k!(Down), TOGGLE_ENCODER_MODE),
    };
    let shift_up_down = EncoderBinding::Fixed(encoder!(
        wm!(Down, ModifierCombination::LSHIFT),
        wm!(Up, ModifierCombination::LSHIFT)
    ));
    let up_down = EncoderBinding::Fixed(encoder!(k!(Down), k!(Up)));
    [
        [volume, brightness],
        [volume, scroll],
        [volume, scroll],
        [volume, shift_up_down],
        [volume, up_down],
    ]
}

pub fn get_default_behavior_config() -> BehaviorConfig {
    let cmd_alt = ModifierCombination::LGUI | ModifierCombination::LALT;
    let macros = [
        Macro::new([
            MacroOperation::Tap(KeyCode::T, cmd_alt | ModifierCombination::LSHIFT),
            MacroOperation::Tap(KeyCode::U, ModifierCombination::LCTRL),
        ]),
        Macro::new([MacroOperation::Tap(KeyCode::Escape, cmd_alt)]),
        Macro::new([
            MacroOperation::Tap(KeyCode::Q, ModifierCombination::LCTRL | ModifierCombination::LGUI),
            MacroOperation::Delay(400),
            MacroOperation::tap(KeyCode::Escape),
        ]),
        Macro::new([
            MacroOperation::Tap(KeyCode::Dot, ModifierCombination::LSHIFT),
            MacroOperation::Tap(KeyCode::Dot, ModifierCombination::LSHIFT),
        ]),
        Macro::new([
            MacroOperation::Tap(KeyCode::Comma, ModifierCombination::LSHIFT),
            MacroOperation::Tap(KeyCode::Comma, ModifierCombination::LSHIFT),
        ]),
    ];
    let rapid_fires = [
        RapidFire::new(Action::Key(KeyCode::Left), 5000, 0, true),
        RapidFire::with_defaults(Action::Light(LightAction::SaturationUp)),
        RapidFire::with_defaults(Action::Light(LightAction::SaturationDown)),
        RapidFire::with_defaults(Action::Light(LightAction::ValueUp)),
        RapidFire::with_defaults(Action::Light(LightAction::ValueDown)),
        RapidFire::with_defaults(Action::Light(LightAction::HueUp)),
        RapidFire::with_defaults(Action::Light(LightAction::HueDown)),
    ];

    BehaviorConfig {
        rapid_fire: RapidFiresConfig {
            rapid_fires: Vec::from_array(rapid_fires),
        },
        keyboard_macros: MacrosConfig {
            macros: Vec::from_array(macros),
        },
        ..Default::default()
    }
}

/// The status light of the ocreeb-12: four pixels, layers 0 to 3 colored
pub fn get_default_light_config() -> LightConfig {
    LightConfig::default()
}

/// Complete config of the ocreeb-12 over the given keymap and encoder map
pub fn get_default_config<'a>(
    keymap: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    encoder_map: &'a [[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
) -> KeyboardConfig<'a, ROW, COL, NUM_LAYER, NUM_ENCODER> {
    KeyboardConfig {
        keymap,
        encoder_map,
        behavior: get_default_behavior_config(),
        light: get_default_light_config(),
    }
}
