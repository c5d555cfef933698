//! # ocreeb types
//!
//! Plain data vocabulary shared by the ocreeb macropad core and its configuration.
//!
//! - [`action`] - What a key does: single actions, key bindings and encoder tuples
//! - [`keycode`] - HID keycodes, including media and mouse keys
//! - [`modifier`] - Modifier key combinations
//! - [`color`] - HSV colors used by the status light

#![no_std]

pub mod action;
pub mod color;
pub mod keycode;
pub mod modifier;
