//! # ocreeb
//!
//! Input core of a 12-key macropad with two rotary encoders and a layer status light.
//!
//! - [`keyboard::Keyboard`] - Resolves key and encoder events to actions and dispatches them
//! - [`layer`] - The active layer stack
//! - [`tap_dance`], [`rapid_fire`], [`keyboard_macro`] - Timed key behaviors
//! - [`encoder`] - Per-layer encoder bindings with a switchable mode
//! - [`light`] - Layer colored status light
//!
//! The core is driven by [`keyboard::Keyboard::process`] and [`keyboard::Keyboard::tick`], or by
//! the [`keyboard::Runnable::run`] task which reads [`channel::KEYBOARD_EVENT_CHANNEL`].

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod channel;
pub mod config;
pub mod default_keymap;
pub mod encoder;
pub mod event;
pub mod hid;
pub mod keyboard;
pub mod keyboard_macro;
pub mod keymap;
pub mod layer;
pub mod layout_macro;
pub mod light;
pub mod rapid_fire;
pub mod state;
pub mod tap_dance;
pub mod timer;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
pub use ocreeb_types as types;
pub use ocreeb_types::{action, color, keycode, modifier};

/// Mutex used by all channels of the core
pub type RawMutex = CriticalSectionRawMutex;

/// Capacity of the input event channel
pub const EVENT_CHANNEL_SIZE: usize = 16;
/// Capacity of the HID event channel
pub const HID_CHANNEL_SIZE: usize = 32;
