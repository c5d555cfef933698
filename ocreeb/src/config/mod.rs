mod validation;

use embassy_time::Duration;
use heapless::Vec;
use ocreeb_types::action::KeyAction;
use ocreeb_types::color::{HUE_BLUE, HUE_CYAN, HUE_GREEN, HUE_RED};
pub use validation::ConfigError;
pub(crate) use validation::validate;

use crate::encoder::EncoderBinding;
use crate::keyboard_macro::{MACRO_MAX_NUM, Macro};
use crate::rapid_fire::{RAPID_FIRE_MAX_NUM, RapidFire};
use crate::tap_dance::{TAP_DANCE_MAX_NUM, TapDance};

/// Max number of layers which can have a status color
pub const LIGHT_MAX_LAYERS: usize = 8;

/// Everything needed to build a [`Keyboard`](crate::keyboard::Keyboard).
///
/// The keymap and the encoder map are borrowed, the rest is owned by the keyboard.
pub struct KeyboardConfig<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize> {
    pub keymap: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    pub encoder_map: &'a [[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
    pub behavior: BehaviorConfig,
    pub light: LightConfig,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>
    KeyboardConfig<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    pub fn new(
        keymap: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
        encoder_map: &'a [[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
    ) -> Self {
        Self {
            keymap,
            encoder_map,
            behavior: BehaviorConfig::default(),
            light: LightConfig::default(),
        }
    }

    /// Check that every binding references something that exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate(self.keymap, self.encoder_map, &self.behavior)
    }
}

/// Configurations for the key behaviors
#[derive(Clone, Debug, Default)]
pub struct BehaviorConfig {
    pub tap_dance: TapDancesConfig,
    pub rapid_fire: RapidFiresConfig,
    pub keyboard_macros: MacrosConfig,
}

/// Tap dance definitions, referenced by `KeyAction::TapDance(index)`
#[derive(Clone, Debug, Default)]
pub struct TapDancesConfig {
    pub tap_dances: Vec<TapDance, TAP_DANCE_MAX_NUM>,
}

/// Rapid fire definitions, referenced by `KeyAction::RapidFire(index)`
#[derive(Clone, Debug, Default)]
pub struct RapidFiresConfig {
    pub rapid_fires: Vec<RapidFire, RAPID_FIRE_MAX_NUM>,
}

/// Macros, referenced by `Action::TriggerMacro(index)`
#[derive(Clone, Debug, Default)]
pub struct MacrosConfig {
    pub macros: Vec<Macro, MACRO_MAX_NUM>,
}

/// Config for the layer status light
#[derive(Clone, Debug)]
pub struct LightConfig {
    /// Number of pixels of the strip, all of them show the layer color
    pub num_pixels: u8,
    /// Hue of each layer, `None` or a layer past the end turns the light off
    pub layer_hues: Vec<Option<u8>, LIGHT_MAX_LAYERS>,
    pub sat_default: u8,
    pub val_default: u8,
    pub val_limit: u8,
    pub hue_step: u8,
    pub sat_step: u8,
    pub val_step: u8,
}

impl Default for LightConfig {
    fn default() -> Self {
        let mut layer_hues = Vec::new();
        for hue in [HUE_BLUE, HUE_CYAN, HUE_GREEN, HUE_RED] {
            let _ = layer_hues.push(Some(hue));
        }
        Self {
            num_pixels: 4,
            layer_hues,
            sat_default: 255,
            val_default: 16,
            val_limit: 255,
            hue_step: 4,
            sat_step: 13,
            val_step: 13,
        }
    }
}

/// Default tap timeout, both the window between taps and the longest press counted as a tap
pub const DEFAULT_TAP_TIMEOUT: Duration = Duration::from_millis(300);
