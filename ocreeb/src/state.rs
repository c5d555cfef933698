//! Shared keyboard state: the active layers and everything that follows them.

use crate::encoder::EncoderRouter;
use crate::layer::{LayerError, LayerListener, LayerStack};
use crate::light::{LedDriver, StatusLight};

/// The layer stack and its listeners.
///
/// Every change of the stack is published to the encoder router and the status light before
/// the layer operation returns, so the next event already sees the new layer everywhere.
pub struct KeyboardState<'a, D: LedDriver, const NUM_ENCODER: usize, const NUM_LAYER: usize> {
    pub(crate) layers: LayerStack<NUM_LAYER>,
    pub(crate) encoder: EncoderRouter<'a, NUM_ENCODER, NUM_LAYER>,
    pub(crate) light: StatusLight<D>,
}

impl<'a, D: LedDriver, const NUM_ENCODER: usize, const NUM_LAYER: usize> KeyboardState<'a, D, NUM_ENCODER, NUM_LAYER> {
    pub fn new(encoder: EncoderRouter<'a, NUM_ENCODER, NUM_LAYER>, light: StatusLight<D>) -> Self {
        Self {
            layers: LayerStack::new(),
            encoder,
            light,
        }
    }

    pub fn layers(&self) -> &LayerStack<NUM_LAYER> {
        &self.layers
    }

    pub fn encoder(&self) -> &EncoderRouter<'a, NUM_ENCODER, NUM_LAYER> {
        &self.encoder
    }

    pub fn light(&self) -> &StatusLight<D> {
        &self.light
    }

    /// Publish the current top layer to all listeners
    pub(crate) fn notify(&mut self) {
        let top = self.layers.top();
        debug!("Layer changed, top layer is {}", top);
        (&mut self.encoder, &mut self.light).on_layer_change(top);
    }

    fn apply(&mut self, changed: Result<bool, LayerError>) -> Result<(), LayerError> {
        if changed? {
            self.notify();
        }
        Ok(())
    }

    pub fn activate_layer(&mut self, layer: u8) -> Result<(), LayerError> {
        let changed = self.layers.activate(layer);
        self.apply(changed)
    }

    pub fn deactivate_layer(&mut self, layer: u8) -> Result<(), LayerError> {
        let changed = self.layers.deactivate(layer);
        self.apply(changed)
    }

    pub fn goto_layer(&mut self, layer: u8) -> Result<(), LayerError> {
        let changed = self.layers.goto(layer);
        self.apply(changed)
    }

    pub fn cycle_layer(&mut self, delta: i8) -> Result<(), LayerError> {
        let changed = self.layers.cycle(delta);
        self.apply(changed)
    }
}
