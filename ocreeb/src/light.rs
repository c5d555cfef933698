//! Layer status light.
//!
//! All pixels show the color of the top layer. Layers without a color turn the light off.

use core::ops::Range;

use ocreeb_types::action::LightAction;
use ocreeb_types::color::Hsv;

use crate::config::LightConfig;
use crate::layer::LayerListener;

/// Addressable LED strip
pub trait LedDriver {
    /// Set the color of the pixels in `pixels`, shown on the next [`LedDriver::refresh`]
    fn set_color(&mut self, pixels: Range<u8>, color: Hsv);

    /// Push the pending colors to the LEDs
    fn refresh(&mut self);
}

impl<T: LedDriver + ?Sized> LedDriver for &mut T {
    fn set_color(&mut self, pixels: Range<u8>, color: Hsv) {
        (**self).set_color(pixels, color)
    }

    fn refresh(&mut self) {
        (**self).refresh()
    }
}

/// Boards without a status light
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLight;

impl LedDriver for NoLight {
    fn set_color(&mut self, _pixels: Range<u8>, _color: Hsv) {}

    fn refresh(&mut self) {}
}

/// Shows the top layer's color on the LED strip
pub struct StatusLight<D: LedDriver> {
    driver: D,
    config: LightConfig,
    enabled: bool,
    hue_shift: u8,
    sat: u8,
    val: u8,
    layer: u8,
    color: Hsv,
}

impl<D: LedDriver> StatusLight<D> {
    pub fn new(driver: D, config: LightConfig) -> Self {
        Self {
            driver,
            enabled: true,
            hue_shift: 0,
            sat: config.sat_default,
            val: config.val_default.min(config.val_limit),
            layer: 0,
            color: Hsv::OFF,
            config,
        }
    }

    /// The color currently shown
    pub fn color(&self) -> Hsv {
        self.color
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The color of `layer` with the current saturation and brightness
    pub fn color_of(&self, layer: u8) -> Hsv {
        match self.config.layer_hues.get(layer as usize).copied().flatten() {
            Some(hue) if self.enabled => Hsv::new(hue.wrapping_add(self.hue_shift), self.sat, self.val),
            _ => Hsv::OFF,
        }
    }

    /// Write the color of the current layer to every pixel and refresh
    pub fn show(&mut self) {
        self.color = self.color_of(self.layer);
        debug!(
            "Status light of layer {}: hue {}, sat {}, val {}",
            self.layer,
            self.color.hue,
            self.color.sat,
            self.color.val
        );
        self.driver.set_color(0..self.config.num_pixels, self.color);
        self.driver.refresh();
    }

    /// Apply a light adjustment key
    pub fn process_action(&mut self, action: LightAction) {
        let config = &self.config;
        match action {
            LightAction::Toggle => self.enabled = !self.enabled,
            LightAction::HueUp => self.hue_shift = self.hue_shift.wrapping_add(config.hue_step),
            LightAction::HueDown => self.hue_shift = self.hue_shift.wrapping_sub(config.hue_step),
            LightAction::SaturationUp => self.sat = self.sat.saturating_add(config.sat_step),
            LightAction::SaturationDown => self.sat = self.sat.saturating_sub(config.sat_step),
            LightAction::ValueUp => self.val = self.val.saturating_add(config.val_step).min(config.val_limit),
            LightAction::ValueDown => self.val = self.val.saturating_sub(config.val_step),
        }
        self.show();
    }
}

impl<D: LedDriver> LayerListener for StatusLight<D> {
    fn on_layer_change(&mut self, top: u8) {
        self.layer = top;
        self.show();
    }
}
