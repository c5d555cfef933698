//! Active layer stack.
//!
//! The most recently activated layer is on top and wins key lookups. Layer 0 is the base and the
//! stack is never empty.

use heapless::Vec;

/// Max depth of the active layer stack
pub const MAX_LAYER_DEPTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerError {
    /// The layer index isn't in the keymap
    OutOfRange { layer: u8, num_layers: u8 },
    /// Too many layers are active
    StackFull,
}

impl core::fmt::Display for LayerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LayerError::OutOfRange { layer, num_layers } => {
                write!(f, "layer {} out of range, the keymap has {} layers", layer, num_layers)
            }
            LayerError::StackFull => write!(f, "more than {} layers active", MAX_LAYER_DEPTH),
        }
    }
}

/// Receives the new top layer each time the active layer stack changes
pub trait LayerListener {
    fn on_layer_change(&mut self, top: u8);
}

impl<T: LayerListener + ?Sized> LayerListener for &mut T {
    fn on_layer_change(&mut self, top: u8) {
        (**self).on_layer_change(top)
    }
}

impl LayerListener for () {
    fn on_layer_change(&mut self, _top: u8) {}
}

impl<A: LayerListener, B: LayerListener> LayerListener for (A, B) {
    fn on_layer_change(&mut self, top: u8) {
        self.0.on_layer_change(top);
        self.1.on_layer_change(top);
    }
}

/// Ordered stack of active layers over `NUM_LAYER` layers
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayerStack<const NUM_LAYER: usize> {
    stack: Vec<u8, MAX_LAYER_DEPTH>,
}

impl<const NUM_LAYER: usize> Default for LayerStack<NUM_LAYER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const NUM_LAYER: usize> LayerStack<NUM_LAYER> {
    pub fn new() -> Self {
        let mut stack = Vec::new();
        let _ = stack.push(0);
        Self { stack }
    }

    /// The layer on top of the stack
    pub fn top(&self) -> u8 {
        self.stack.last().copied().unwrap_or(0)
    }

    /// Active layers, from the most recently activated to the base
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.stack.iter().rev().copied()
    }

    pub fn is_active(&self, layer: u8) -> bool {
        self.stack.contains(&layer)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn check(layer: u8) -> Result<(), LayerError> {
        if (layer as usize) < NUM_LAYER {
            Ok(())
        } else {
            Err(LayerError::OutOfRange {
                layer,
                num_layers: NUM_LAYER as u8,
            })
        }
    }

    /// Push `layer` on top of the stack.
    ///
    /// Activating the layer which is already on top is a no-op. Returns whether the stack changed.
    pub fn activate(&mut self, layer: u8) -> Result<bool, LayerError> {
        Self::check(layer)?;
        if self.top() == layer {
            return Ok(false);
        }
        self.stack.push(layer).map_err(|_| LayerError::StackFull)?;
        Ok(true)
    }

    /// Remove the most recent activation of `layer`.
    ///
    /// The base layer can't be removed once it's the only layer left. Returns whether the stack
    /// changed.
    pub fn deactivate(&mut self, layer: u8) -> Result<bool, LayerError> {
        Self::check(layer)?;
        let Some(i) = self.stack.iter().rposition(|l| *l == layer) else {
            return Ok(false);
        };
        if self.stack.len() == 1 {
            if layer == 0 {
                return Ok(false);
            }
            self.stack[0] = 0;
            return Ok(true);
        }
        self.stack.remove(i);
        Ok(true)
    }

    /// Replace the whole stack with `layer`
    pub fn goto(&mut self, layer: u8) -> Result<bool, LayerError> {
        Self::check(layer)?;
        if self.stack.as_slice() == [layer] {
            return Ok(false);
        }
        self.stack.clear();
        let _ = self.stack.push(layer);
        Ok(true)
    }

    /// Go to the layer `delta` steps away from the top, wrapping around
    pub fn cycle(&mut self, delta: i8) -> Result<bool, LayerError> {
        if NUM_LAYER == 0 {
            return Err(LayerError::OutOfRange { layer: 0, num_layers: 0 });
        }
        let n = NUM_LAYER as i32;
        let next = (self.top() as i32 + delta as i32).rem_euclid(n);
        self.goto(next as u8)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_activate_deactivate() {
        let mut layers = LayerStack::<4>::new();
        assert_eq!(layers.top(), 0);
        assert_eq!(layers.activate(2), Ok(true));
        assert_eq!(layers.activate(2), Ok(false));
        assert_eq!(layers.activate(1), Ok(true));
        assert_eq!(layers.iter().collect::<std::vec::Vec<_>>(), [1, 2, 0]);
        assert_eq!(layers.deactivate(2), Ok(true));
        assert_eq!(layers.top(), 1);
        assert!(layers.is_active(1) && layers.is_active(0));
        assert!(!layers.is_active(2));
        assert_eq!(layers.deactivate(3), Ok(false));
        assert_eq!(layers.deactivate(1), Ok(true));
        assert_eq!(layers.top(), 0);
        assert_eq!(layers.deactivate(0), Ok(false));
        assert_eq!(layers.depth(), 1);
    }

    #[test]
    fn test_deactivate_last_falls_back_to_base() {
        let mut layers = LayerStack::<4>::new();
        layers.goto(3).unwrap();
        assert_eq!(layers.deactivate(3), Ok(true));
        assert_eq!(layers.top(), 0);
        assert_eq!(layers.depth(), 1);
    }

    #[test]
    fn test_out_of_range_leaves_stack() {
        let mut layers = LayerStack::<4>::new();
        layers.activate(1).unwrap();
        let before = layers.clone();
        assert_eq!(
            layers.activate(4),
            Err(LayerError::OutOfRange { layer: 4, num_layers: 4 })
        );
        assert_eq!(layers.goto(9).unwrap_err(), LayerError::OutOfRange { layer: 9, num_layers: 4 });
        assert_eq!(layers, before);
    }

    #[test]
    fn test_stack_full() {
        let mut layers = LayerStack::<2>::new();
        for _ in 0..(MAX_LAYER_DEPTH - 1) / 2 {
            layers.activate(1).unwrap();
            layers.activate(0).unwrap();
        }
        layers.activate(1).unwrap();
        assert_eq!(layers.depth(), MAX_LAYER_DEPTH);
        assert_eq!(layers.activate(0), Err(LayerError::StackFull));
        assert_eq!(layers.depth(), MAX_LAYER_DEPTH);
    }

    #[test]
    fn test_cycle_wraps() {
        let mut layers = LayerStack::<4>::new();
        let mut seen = std::vec::Vec::new();
        for _ in 0..4 {
            layers.cycle(1).unwrap();
            seen.push(layers.top());
        }
        assert_eq!(seen, [1, 2, 3, 0]);
        layers.cycle(-1).unwrap();
        assert_eq!(layers.top(), 3);
        assert_eq!(layers.depth(), 1);
    }

    #[test]
    fn test_listener_fan_out() {
        struct Last(u8);
        impl LayerListener for Last {
            fn on_layer_change(&mut self, top: u8) {
                self.0 = top;
            }
        }
        let mut a = Last(0);
        let mut b = Last(0);
        (&mut a, (&mut b, ())).on_layer_change(3);
        assert_eq!((a.0, b.0), (3, 3));
    }
}
