//! HSV colors for the status light.
//!
//! Hue, saturation and value are all in `0..=255`: hue 0 is red, 85 is green, 170 is blue.

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

pub const HUE_RED: u8 = 0;
pub const HUE_GREEN: u8 = 85;
pub const HUE_CYAN: u8 = 125;
pub const HUE_BLUE: u8 = 170;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    pub hue: u8,
    pub sat: u8,
    pub val: u8,
}

impl Hsv {
    /// Zero brightness
    pub const OFF: Hsv = Hsv::new(0, 0, 0);

    pub const fn new(hue: u8, sat: u8, val: u8) -> Self {
        Self { hue, sat, val }
    }

    pub fn is_off(&self) -> bool {
        self.val == 0
    }
}
