use ocreeb_types::action::{Action, KeyAction};

use super::BehaviorConfig;
use crate::encoder::EncoderBinding;
use crate::rapid_fire::RAPID_FIRE_MAX_ACTIVE;
use crate::tap_dance::TAP_DANCE_MAX_PENDING;

/// Configuration mistakes found when the keyboard is built
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    NoLayers,
    TooManyLayers { num_layers: usize },
    LayerOutOfRange { layer: u8, num_layers: usize },
    MissingTapDance { index: u8 },
    EmptyTapDance { index: u8 },
    /// A tap dance slot is itself a tap dance
    NestedTapDance { index: u8 },
    MissingRapidFire { index: u8 },
    ZeroRapidFireInterval { index: u8 },
    MissingMacro { index: u8 },
    /// More positions can start a tap dance than can be resolved at the same time
    TooManyTapDanceKeys { keys: usize, max: usize },
    /// More positions can start a rapid fire than can fire at the same time
    TooManyRapidFireKeys { keys: usize, max: usize },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::NoLayers => write!(f, "the keymap has no layers"),
            ConfigError::TooManyLayers { num_layers } => {
                write!(f, "{} layers, at most {} are supported", num_layers, u8::MAX)
            }
            ConfigError::LayerOutOfRange { layer, num_layers } => {
                write!(f, "layer {} referenced, the keymap has {} layers", layer, num_layers)
            }
            ConfigError::MissingTapDance { index } => write!(f, "tap dance {} is not defined", index),
            ConfigError::EmptyTapDance { index } => write!(f, "tap dance {} has no actions", index),
            ConfigError::NestedTapDance { index } => write!(f, "tap dance {} contains a tap dance", index),
            ConfigError::MissingRapidFire { index } => write!(f, "rapid fire {} is not defined", index),
            ConfigError::ZeroRapidFireInterval { index } => {
                write!(f, "rapid fire {} has a zero interval", index)
            }
            ConfigError::MissingMacro { index } => write!(f, "macro {} is not defined", index),
            ConfigError::TooManyTapDanceKeys { keys, max } => {
                write!(f, "{} keys bind a tap dance, at most {} are supported", keys, max)
            }
            ConfigError::TooManyRapidFireKeys { keys, max } => {
                write!(f, "{} keys bind a rapid fire, at most {} are supported", keys, max)
            }
        }
    }
}

struct Validator<'a> {
    behavior: &'a BehaviorConfig,
    num_layers: usize,
}

impl Validator<'_> {
    fn check_action(&self, action: Action) -> Result<(), ConfigError> {
        if let Some(layer) = action.layer()
            && layer as usize >= self.num_layers
        {
            return Err(ConfigError::LayerOutOfRange {
                layer,
                num_layers: self.num_layers,
            });
        }
        if let Action::TriggerMacro(index) = action
            && self.behavior.keyboard_macros.macros.get(index as usize).is_none()
        {
            return Err(ConfigError::MissingMacro { index });
        }
        Ok(())
    }

    fn check_key_action(&self, key_action: KeyAction) -> Result<(), ConfigError> {
        match key_action {
            KeyAction::No | KeyAction::Transparent => Ok(()),
            KeyAction::Single(action) | KeyAction::Tap(action) => self.check_action(action),
            KeyAction::RapidFire(index) => {
                if self.behavior.rapid_fire.rapid_fires.get(index as usize).is_none() {
                    return Err(ConfigError::MissingRapidFire { index });
                }
                Ok(())
            }
            KeyAction::TapDance(index) => {
                if self.behavior.tap_dance.tap_dances.get(index as usize).is_none() {
                    return Err(ConfigError::MissingTapDance { index });
                }
                Ok(())
            }
        }
    }

    fn binds_tap_dance(&self, key_action: KeyAction) -> bool {
        matches!(key_action, KeyAction::TapDance(_))
    }

    /// A rapid fire bound directly or through one of the slots of a tap dance
    fn binds_rapid_fire(&self, key_action: KeyAction) -> bool {
        match key_action {
            KeyAction::RapidFire(_) => true,
            KeyAction::TapDance(index) => self
                .behavior
                .tap_dance
                .tap_dances
                .get(index as usize)
                .is_some_and(|td| td.actions.iter().any(|a| matches!(a, KeyAction::RapidFire(_)))),
            _ => false,
        }
    }

    fn check_definitions(&self) -> Result<(), ConfigError> {
        for (i, rapid_fire) in self.behavior.rapid_fire.rapid_fires.iter().enumerate() {
            let index = i as u8;
            if rapid_fire.interval.as_ticks() == 0 {
                return Err(ConfigError::ZeroRapidFireInterval { index });
            }
            self.check_action(rapid_fire.action)?;
        }
        for (i, tap_dance) in self.behavior.tap_dance.tap_dances.iter().enumerate() {
            let index = i as u8;
            if tap_dance.actions.is_empty() {
                return Err(ConfigError::EmptyTapDance { index });
            }
            for action in tap_dance.actions.iter() {
                if matches!(action, KeyAction::TapDance(_)) {
                    return Err(ConfigError::NestedTapDance { index });
                }
                self.check_key_action(*action)?;
            }
        }
        Ok(())
    }
}

/// Check the keymap, the encoder map and the behavior tables against each other
pub(crate) fn validate<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keymap: &[[[KeyAction; COL]; ROW]; NUM_LAYER],
    encoder_map: &[[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
    behavior: &BehaviorConfig,
) -> Result<(), ConfigError> {
    if NUM_LAYER == 0 {
        return Err(ConfigError::NoLayers);
    }
    if NUM_LAYER > u8::MAX as usize {
        return Err(ConfigError::TooManyLayers { num_layers: NUM_LAYER });
    }

    let validator = Validator {
        behavior,
        num_layers: NUM_LAYER,
    };
    validator.check_definitions()?;
    for action in keymap.iter().flatten().flatten() {
        validator.check_key_action(*action)?;
    }
    for binding in encoder_map.iter().flatten() {
        for action in binding.key_actions() {
            validator.check_key_action(action)?;
        }
    }

    // Every position keeps its own tap dance and rapid fire state
    let keys = count_positions(keymap, encoder_map, |a| validator.binds_tap_dance(a));
    if keys > TAP_DANCE_MAX_PENDING {
        return Err(ConfigError::TooManyTapDanceKeys {
            keys,
            max: TAP_DANCE_MAX_PENDING,
        });
    }
    let keys = count_positions(keymap, encoder_map, |a| validator.binds_rapid_fire(a));
    if keys > RAPID_FIRE_MAX_ACTIVE {
        return Err(ConfigError::TooManyRapidFireKeys {
            keys,
            max: RAPID_FIRE_MAX_ACTIVE,
        });
    }
    Ok(())
}

/// Number of key positions and encoder directions bound to a matching action on any layer
fn count_positions<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keymap: &[[[KeyAction; COL]; ROW]; NUM_LAYER],
    encoder_map: &[[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
    binds: impl Fn(KeyAction) -> bool,
) -> usize {
    let keys = (0..ROW)
        .flat_map(|row| (0..COL).map(move |col| (row, col)))
        .filter(|&(row, col)| keymap.iter().any(|layer| binds(layer[row][col])))
        .count();
    let encoder_directions = (0..NUM_ENCODER)
        .flat_map(|id| (0..3).map(move |direction| (id, direction)))
        .filter(|&(id, direction)| {
            encoder_map.iter().any(|layer| {
                [false, true]
                    .into_iter()
                    .any(|alternate| binds(layer[id].select(alternate).actions()[direction]))
            })
        })
        .count();
    keys + encoder_directions
}
