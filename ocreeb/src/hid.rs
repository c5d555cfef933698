//! Traits and types for HID output.
//!
//! The core emits key transitions only. Turning them into keyboard, consumer or mouse reports
//! is the job of the transport behind the [`HidReporter`].

use heapless::{Deque, Vec};
use ocreeb_types::keycode::KeyCode;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::channel::HID_EVENT_CHANNEL;

/// A key transition sent to the host
#[derive(Serialize, Deserialize, Clone, Copy, Debug, MaxSize, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HidEvent {
    pub keycode: KeyCode,
    pub pressed: bool,
}

impl HidEvent {
    pub const fn press(keycode: KeyCode) -> Self {
        Self { keycode, pressed: true }
    }

    pub const fn release(keycode: KeyCode) -> Self {
        Self {
            keycode,
            pressed: false,
        }
    }
}

/// HidReporter receives every key transition produced by the core, in order.
pub trait HidReporter {
    fn report(&mut self, event: HidEvent);

    fn press(&mut self, keycode: KeyCode) {
        self.report(HidEvent::press(keycode));
    }

    fn release(&mut self, keycode: KeyCode) {
        self.report(HidEvent::release(keycode));
    }

    /// Press and release immediately
    fn tap(&mut self, keycode: KeyCode) {
        self.press(keycode);
        self.release(keycode);
    }

    /// Whether some events are waiting to be sent again
    fn has_pending(&self) -> bool {
        false
    }

    /// Retry the waiting events
    fn flush(&mut self) {}
}

impl<T: HidReporter + ?Sized> HidReporter for &mut T {
    fn report(&mut self, event: HidEvent) {
        (**self).report(event)
    }

    fn has_pending(&self) -> bool {
        (**self).has_pending()
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

// Max number of key releases waiting for room in the HID channel
const HID_MAX_PENDING_RELEASES: usize = 16;
// Max number of keys whose press was dropped and whose release is swallowed
const HID_MAX_DROPPED_PRESSES: usize = 16;

/// Forwards events to [`HID_EVENT_CHANNEL`], where the transport task picks them up.
///
/// A full channel never leaves a key stuck on the host. Releases that don't fit are kept and sent
/// before anything else once there is room again. Presses that don't fit are dropped, together
/// with their release.
#[derive(Debug, Default)]
pub struct ChannelReporter {
    pending_releases: Deque<KeyCode, HID_MAX_PENDING_RELEASES>,
    dropped_presses: Vec<KeyCode, HID_MAX_DROPPED_PRESSES>,
}

impl ChannelReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn drop_press(&mut self, keycode: KeyCode) {
        warn!("HID event channel is full, dropping press of {:?}", keycode);
        if !self.dropped_presses.contains(&keycode) && self.dropped_presses.push(keycode).is_err() {
            error!("Too many dropped presses, the release of {:?} will be sent", keycode);
        }
    }

    fn queue_release(&mut self, keycode: KeyCode) {
        if self.pending_releases.push_back(keycode).is_err() {
            error!("HID event channel is full, dropping release of {:?}", keycode);
        }
    }
}

impl HidReporter for ChannelReporter {
    fn report(&mut self, event: HidEvent) {
        self.flush();
        if event.pressed {
            // A press can't overtake a waiting release
            if !self.pending_releases.is_empty() || HID_EVENT_CHANNEL.try_send(event).is_err() {
                self.drop_press(event.keycode);
            }
            return;
        }

        if let Some(i) = self.dropped_presses.iter().position(|k| *k == event.keycode) {
            debug!("Swallowing release of {:?}, its press was dropped", event.keycode);
            self.dropped_presses.swap_remove(i);
            return;
        }
        if !self.pending_releases.is_empty() || HID_EVENT_CHANNEL.try_send(event).is_err() {
            self.queue_release(event.keycode);
        }
    }

    fn has_pending(&self) -> bool {
        !self.pending_releases.is_empty()
    }

    fn flush(&mut self) {
        while let Some(keycode) = self.pending_releases.front().copied() {
            if HID_EVENT_CHANNEL.try_send(HidEvent::release(keycode)).is_err() {
                break;
            }
            self.pending_releases.pop_front();
        }
    }
}
