pub mod common;

use embassy_time::Instant;
use ocreeb::action::KeyAction;
use ocreeb::config::BehaviorConfig;
use ocreeb::event::KeyboardEvent;
use ocreeb::keyboard_macro::{Macro, MacroOperation};
use ocreeb::keycode::KeyCode;
use ocreeb::timer::ManualClock;
use ocreeb::{k, layer, mcr};

use crate::common::{create_default_keyboard, create_test_keyboard, tap, wait};

#[test]
fn test_lock_macro_waits_before_escape() {
    let clock = ManualClock::new();
    let mut keyboard = create_default_keyboard(&clock);

    key_sequence_test! {
        keyboard: keyboard,
        clock: &clock,
        sequence: [
            [0, 3, true, 0],
            [0, 3, false, 50],
        ],
        expected_events: [
            [LCtrl, true],
            [LGui, true],
            [Q, true],
            [Q, false],
            [LGui, false],
            [LCtrl, false],
        ]
    };
    assert_eq!(keyboard.next_deadline(), Some(Instant::from_millis(400)));
    wait(&mut keyboard, &clock, 349);
    assert_eq!(keyboard.reporter().events.len(), 6);
    wait(&mut keyboard, &clock, 1);
    assert_eq!(
        keyboard.reporter().events[6..],
        hid_events![[Escape, true], [Escape, false]]
    );
    assert_eq!(keyboard.next_deadline(), None);
}

#[test]
fn test_speed_macros() {
    let clock = ManualClock::new();
    let mut keyboard = create_default_keyboard(&clock);
    tap(&mut keyboard, 1, 3);
    tap(&mut keyboard, 1, 1);
    let shifted = |kc: KeyCode| {
        [
            ocreeb::hid::HidEvent::press(KeyCode::LShift),
            ocreeb::hid::HidEvent::press(kc),
            ocreeb::hid::HidEvent::release(kc),
            ocreeb::hid::HidEvent::release(KeyCode::LShift),
        ]
    };
    let expected: Vec<_> = [
        shifted(KeyCode::Dot),
        shifted(KeyCode::Dot),
        shifted(KeyCode::Comma),
        shifted(KeyCode::Comma),
    ]
    .concat();
    assert_eq!(keyboard.reporter().events, expected);
}

#[test]
fn test_new_macro_aborts_suspended_one() {
    let clock = ManualClock::new();
    let mut keyboard = create_default_keyboard(&clock);
    tap(&mut keyboard, 0, 3);
    wait(&mut keyboard, &clock, 100);
    tap(&mut keyboard, 1, 3);
    wait(&mut keyboard, &clock, 1000);
    assert_eq!(keyboard.reporter().presses(KeyCode::Escape), 0);
    assert_eq!(keyboard.reporter().presses(KeyCode::Dot), 2);
    assert_eq!(keyboard.next_deadline(), None);
}

#[rustfmt::skip]
static KEYMAP: [[[KeyAction; 2]; 1]; 1] = [
    layer!([[mcr!(0), k!(B)]]),
];

#[test]
fn test_keys_held_by_macro_are_released() {
    let clock = ManualClock::new();
    let mut behavior = BehaviorConfig::default();
    behavior
        .keyboard_macros
        .macros
        .push(Macro::new([
            MacroOperation::Press(KeyCode::LShift),
            MacroOperation::Delay(100),
            MacroOperation::tap(KeyCode::A),
        ]))
        .unwrap();
    let mut keyboard = create_test_keyboard(&KEYMAP, behavior, &clock);

    keyboard.process(KeyboardEvent::key(0, 0, true));
    // Keys typed during the delay are shifted, the macro keeps running after the key release
    tap(&mut keyboard, 0, 1);
    keyboard.process(KeyboardEvent::key(0, 0, false));
    wait(&mut keyboard, &clock, 100);
    assert_eq!(
        keyboard.reporter().events,
        hid_events![
            [LShift, true],
            [B, true],
            [B, false],
            [A, true],
            [A, false],
            [LShift, false],
        ]
    );
}
