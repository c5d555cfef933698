//! Exposed channels which can be used to share data across tasks

use embassy_sync::channel::Channel;
pub use embassy_sync::{blocking_mutex, channel};

use crate::event::KeyboardEvent;
use crate::hid::HidEvent;
use crate::{EVENT_CHANNEL_SIZE, HID_CHANNEL_SIZE, RawMutex};

/// Channel for key and encoder events, filled by the matrix scanner and the encoder decoder
pub static KEYBOARD_EVENT_CHANNEL: Channel<RawMutex, KeyboardEvent, EVENT_CHANNEL_SIZE> = Channel::new();
/// Channel for key transitions sent to the host
pub static HID_EVENT_CHANNEL: Channel<RawMutex, HidEvent, HID_CHANNEL_SIZE> = Channel::new();
