pub mod common;

use embassy_futures::select::{Either, select};
use embassy_futures::{block_on, yield_now};
use embassy_time::{Duration, MockDriver};
use ocreeb::channel::{HID_EVENT_CHANNEL, KEYBOARD_EVENT_CHANNEL};
use ocreeb::default_keymap;
use ocreeb::event::KeyboardEvent;
use ocreeb::hid::{ChannelReporter, HidEvent};
use ocreeb::keyboard::{Keyboard, Runnable};
use ocreeb::keycode::KeyCode;
use ocreeb::timer::EmbassyClock;

use crate::common::{DEFAULT_ENCODER_MAP, DEFAULT_KEYMAP, LedRecorder};

fn received() -> Vec<HidEvent> {
    core::iter::from_fn(|| HID_EVENT_CHANNEL.try_receive().ok()).collect()
}

// Let the keyboard task handle everything it can
async fn settle() {
    for _ in 0..8 {
        yield_now().await;
    }
}

// Both channels and the mock time driver are global, so this binary holds a single test
#[test]
fn test_run_wakes_for_pending_deadline() {
    KEYBOARD_EVENT_CHANNEL.clear();
    HID_EVENT_CHANNEL.clear();
    let config = default_keymap::get_default_config(&DEFAULT_KEYMAP, &DEFAULT_ENCODER_MAP);
    let mut keyboard = Keyboard::new(config, ChannelReporter::new(), LedRecorder::default(), EmbassyClock).unwrap();
    let driver = MockDriver::get();

    let main = async {
        // Lock macro: the shortcut now, Escape after 400ms
        KEYBOARD_EVENT_CHANNEL.send(KeyboardEvent::key(0, 3, true)).await;
        KEYBOARD_EVENT_CHANNEL.send(KeyboardEvent::key(0, 3, false)).await;
        settle().await;
        assert_eq!(
            received(),
            [
                HidEvent::press(KeyCode::LCtrl),
                HidEvent::press(KeyCode::LGui),
                HidEvent::press(KeyCode::Q),
                HidEvent::release(KeyCode::Q),
                HidEvent::release(KeyCode::LGui),
                HidEvent::release(KeyCode::LCtrl),
            ]
        );

        driver.advance(Duration::from_millis(399));
        settle().await;
        assert!(received().is_empty());

        // No input event, the deadline alone wakes the task
        driver.advance(Duration::from_millis(1));
        settle().await;
        assert_eq!(
            received(),
            [HidEvent::press(KeyCode::Escape), HidEvent::release(KeyCode::Escape)]
        );

        // Events keep flowing afterwards
        KEYBOARD_EVENT_CHANNEL.send(KeyboardEvent::key(1, 0, true)).await;
        KEYBOARD_EVENT_CHANNEL.send(KeyboardEvent::key(1, 0, false)).await;
        settle().await;
        assert_eq!(received(), [HidEvent::press(KeyCode::F2), HidEvent::release(KeyCode::F2)]);
    };

    match block_on(select(keyboard.run(), main)) {
        Either::First(_) => panic!("Keyboard task exited"),
        Either::Second(_) => (),
    }
    assert_eq!(keyboard.next_deadline(), None);
}
