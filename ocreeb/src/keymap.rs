use ocreeb_types::action::KeyAction;

use crate::event::KeyPos;
use crate::layer::LayerStack;

/// Key bindings of all layers, with the layer each pressed key was resolved on.
pub struct KeyMap<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Layers
    layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER],
    /// Layer cache, a key is released on the layer it was pressed on
    layer_cache: [[u8; COL]; ROW],
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> KeyMap<'a, ROW, COL, NUM_LAYER> {
    pub fn new(layers: &'a [[[KeyAction; COL]; ROW]; NUM_LAYER]) -> Self {
        Self {
            layers,
            layer_cache: [[0; COL]; ROW],
        }
    }

    /// Fetch the action in keymap, without the layer cache
    pub fn get_action_at(&self, pos: KeyPos, layer: u8) -> KeyAction {
        self.layers
            .get(layer as usize)
            .and_then(|l| l.get(pos.row as usize))
            .and_then(|r| r.get(pos.col as usize))
            .copied()
            .unwrap_or(KeyAction::No)
    }

    fn in_matrix(pos: KeyPos) -> bool {
        (pos.row as usize) < ROW && (pos.col as usize) < COL
    }

    /// Fetch the action of a key press, resolved from the top of the active stack.
    ///
    /// Transparent bindings fall through to the next active layer.
    pub(crate) fn get_action_on_press(&mut self, pos: KeyPos, stack: &LayerStack<NUM_LAYER>) -> KeyAction {
        if !Self::in_matrix(pos) {
            warn!("Key ({}, {}) is outside of the matrix", pos.row, pos.col);
            return KeyAction::No;
        }
        for layer in stack.iter() {
            let action = self.get_action_at(pos, layer);
            if action == KeyAction::Transparent {
                continue;
            }
            // Found a valid action in the layer, cache it
            self.layer_cache[pos.row as usize][pos.col as usize] = layer;
            return action;
        }
        KeyAction::No
    }

    /// Fetch the action of a key release, on the layer its press was resolved on
    pub(crate) fn get_action_on_release(&mut self, pos: KeyPos) -> KeyAction {
        if !Self::in_matrix(pos) {
            return KeyAction::No;
        }
        let cached = &mut self.layer_cache[pos.row as usize][pos.col as usize];
        let layer = *cached;
        *cached = 0;
        self.get_action_at(pos, layer)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{k, mo};

    const LAYERS: [[[KeyAction; 2]; 1]; 3] = [
        [[k!(A), mo!(1)]],
        [[KeyAction::Transparent, k!(B)]],
        [[k!(C), KeyAction::Transparent]],
    ];

    #[test]
    fn test_transparent_falls_through() {
        let mut keymap = KeyMap::new(&LAYERS);
        let mut stack = LayerStack::<3>::new();
        stack.activate(1).unwrap();
        assert_eq!(keymap.get_action_on_press(KeyPos { row: 0, col: 0 }, &stack), k!(A));
        stack.activate(2).unwrap();
        assert_eq!(keymap.get_action_on_press(KeyPos { row: 0, col: 1 }, &stack), k!(B));
    }

    #[test]
    fn test_release_uses_press_layer() {
        let mut keymap = KeyMap::new(&LAYERS);
        let mut stack = LayerStack::<3>::new();
        stack.goto(2).unwrap();
        let pos = KeyPos { row: 0, col: 0 };
        assert_eq!(keymap.get_action_on_press(pos, &stack), k!(C));
        stack.goto(0).unwrap();
        assert_eq!(keymap.get_action_on_release(pos), k!(C));
        // The cache is consumed by the release
        assert_eq!(keymap.get_action_on_release(pos), k!(A));
    }

    #[test]
    fn test_outside_matrix() {
        let mut keymap = KeyMap::new(&LAYERS);
        let stack = LayerStack::<3>::new();
        assert_eq!(keymap.get_action_on_press(KeyPos { row: 3, col: 0 }, &stack), KeyAction::No);
        assert_eq!(keymap.get_action_on_release(KeyPos { row: 0, col: 9 }), KeyAction::No);
    }
}
