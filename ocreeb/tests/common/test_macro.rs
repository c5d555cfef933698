extern crate ocreeb;

/// Run a key sequence on a keyboard and check the emitted key transitions.
///
/// Each sequence entry is `[row, col, pressed, delay_ms]`, each expected entry is
/// `[KeyCode, pressed]`.
#[macro_export]
macro_rules! key_sequence_test {
    (keyboard: $keyboard:expr, clock: $clock:expr, sequence: [$([$row:expr, $col:expr, $pressed:expr, $delay:expr]),* $(,)?], expected_events: [$([$key:ident, $key_pressed:expr]),* $(,)?]) => {
        let keyboard = &mut $keyboard;
        let sequence = vec![
            $(
                $crate::common::TestKeyPress {
                    row: $row,
                    col: $col,
                    pressed: $pressed,
                    delay: $delay,
                },
            )*
        ];
        let expected_events: Vec<ocreeb::hid::HidEvent> = vec![
            $(
                ocreeb::hid::HidEvent {
                    keycode: ocreeb::keycode::KeyCode::$key,
                    pressed: $key_pressed,
                },
            )*
        ];

        $crate::common::run_key_sequence(keyboard, $clock, &sequence);
        assert_eq!(keyboard.reporter().events, expected_events);
    };
}

// a rust macro to create a list of expected key transitions
#[macro_export]
macro_rules! hid_events {
    ($([$key:ident, $pressed:expr]),* $(,)?) => {
        vec![
            $(
                ocreeb::hid::HidEvent {
                    keycode: ocreeb::keycode::KeyCode::$key,
                    pressed: $pressed,
                },
            )*
        ]
    };
}
