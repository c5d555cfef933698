//! Rotary encoder bindings.
//!
//! Every encoder has a binding per layer. A switchable binding carries a normal and an alternate
//! action tuple; toggling the encoder mode switches all of them at once.

use ocreeb_types::action::{EncoderAction, KeyAction};

use crate::event::Direction;
use crate::layer::LayerListener;

/// How an encoder behaves on one layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderBinding {
    /// The same actions in both modes
    Fixed(EncoderAction),
    /// Actions selected by the encoder mode
    Switchable {
        normal: EncoderAction,
        alternate: EncoderAction,
    },
}

impl Default for EncoderBinding {
    fn default() -> Self {
        EncoderBinding::Fixed(EncoderAction::default())
    }
}

impl EncoderBinding {
    pub fn select(&self, alternate_mode: bool) -> EncoderAction {
        match self {
            EncoderBinding::Fixed(action) => *action,
            EncoderBinding::Switchable { normal, alternate } => {
                if alternate_mode {
                    *alternate
                } else {
                    *normal
                }
            }
        }
    }

    /// All actions this binding can resolve to, in either mode
    pub(crate) fn key_actions(&self) -> impl Iterator<Item = KeyAction> {
        let (a, b) = match self {
            EncoderBinding::Fixed(action) => (*action, *action),
            EncoderBinding::Switchable { normal, alternate } => (*normal, *alternate),
        };
        a.actions().into_iter().chain(b.actions())
    }
}

/// Resolves encoder input on the current layer and mode
pub struct EncoderRouter<'a, const NUM_ENCODER: usize, const NUM_LAYER: usize> {
    bindings: &'a [[EncoderBinding; NUM_ENCODER]; NUM_LAYER],
    /// Resolved actions for the current mode, for all layers
    table: [[EncoderAction; NUM_ENCODER]; NUM_LAYER],
    alternate_mode: bool,
    current_layer: u8,
}

impl<'a, const NUM_ENCODER: usize, const NUM_LAYER: usize> EncoderRouter<'a, NUM_ENCODER, NUM_LAYER> {
    pub fn new(bindings: &'a [[EncoderBinding; NUM_ENCODER]; NUM_LAYER]) -> Self {
        let mut router = Self {
            bindings,
            table: [[EncoderAction::default(); NUM_ENCODER]; NUM_LAYER],
            alternate_mode: false,
            current_layer: 0,
        };
        router.rebuild();
        router
    }

    fn rebuild(&mut self) {
        let alternate_mode = self.alternate_mode;
        for (row, bindings) in self.table.iter_mut().zip(self.bindings.iter()) {
            for (action, binding) in row.iter_mut().zip(bindings.iter()) {
                *action = binding.select(alternate_mode);
            }
        }
    }

    pub fn alternate_mode(&self) -> bool {
        self.alternate_mode
    }

    /// Flip between normal and alternate bindings on every layer
    pub fn toggle_mode(&mut self) {
        self.alternate_mode = !self.alternate_mode;
        self.rebuild();
        info!(
            "Encoder mode: {}",
            if self.alternate_mode { "alternate" } else { "normal" }
        );
    }

    /// The action for encoder `id` turning or pushed in `direction` on the current layer
    pub fn resolve(&self, id: u8, direction: Direction) -> KeyAction {
        self.resolve_on(self.current_layer, id, direction)
    }

    /// The action for encoder `id` on `layer`
    pub fn resolve_on(&self, layer: u8, id: u8, direction: Direction) -> KeyAction {
        let Some(action) = self
            .table
            .get(layer as usize)
            .and_then(|row| row.get(id as usize))
        else {
            warn!("No binding for encoder {} on layer {}", id, layer);
            return KeyAction::No;
        };
        match direction {
            Direction::Clockwise => action.clockwise(),
            Direction::CounterClockwise => action.counter_clockwise(),
            Direction::Push => action.push(),
        }
    }
}

impl<const NUM_ENCODER: usize, const NUM_LAYER: usize> LayerListener for EncoderRouter<'_, NUM_ENCODER, NUM_LAYER> {
    fn on_layer_change(&mut self, top: u8) {
        self.current_layer = top;
    }
}
