pub mod test_macro;

use std::ops::Range;

use embassy_time::Duration;
use ocreeb::color::Hsv;
use ocreeb::config::{BehaviorConfig, KeyboardConfig, LightConfig};
use ocreeb::default_keymap;
use ocreeb::encoder::EncoderBinding;
use ocreeb::event::{Direction, KeyboardEvent};
use ocreeb::hid::{HidEvent, HidReporter};
use ocreeb::keyboard::Keyboard;
use ocreeb::light::LedDriver;
use ocreeb::timer::ManualClock;
use ocreeb::types::action::KeyAction;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// Records every key transition
#[derive(Debug, Default, Clone)]
pub struct HidRecorder {
    pub events: Vec<HidEvent>,
}

impl HidReporter for HidRecorder {
    fn report(&mut self, event: HidEvent) {
        self.events.push(event);
    }
}

impl HidRecorder {
    /// Number of presses of `keycode`
    pub fn presses(&self, keycode: ocreeb::keycode::KeyCode) -> usize {
        self.events
            .iter()
            .filter(|e| e.keycode == keycode && e.pressed)
            .count()
    }
}

pub const NUM_PIXELS: usize = 4;

/// A 4 pixel strip which keeps what was shown by the last refresh
#[derive(Debug, Default)]
pub struct LedRecorder {
    pending: [Hsv; NUM_PIXELS],
    pub shown: [Hsv; NUM_PIXELS],
    pub refreshes: usize,
}

impl LedDriver for LedRecorder {
    fn set_color(&mut self, pixels: Range<u8>, color: Hsv) {
        for i in pixels {
            if let Some(pixel) = self.pending.get_mut(i as usize) {
                *pixel = color;
            }
        }
    }

    fn refresh(&mut self) {
        self.shown = self.pending;
        self.refreshes += 1;
    }
}

pub type TestKeyboard<'c, const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize> =
    Keyboard<'static, HidRecorder, LedRecorder, &'c ManualClock, ROW, COL, NUM_LAYER, NUM_ENCODER>;

pub type DefaultKeyboard<'c> = TestKeyboard<
    'c,
    { default_keymap::ROW },
    { default_keymap::COL },
    { default_keymap::NUM_LAYER },
    { default_keymap::NUM_ENCODER },
>;

pub static DEFAULT_KEYMAP: [[[KeyAction; default_keymap::COL]; default_keymap::ROW]; default_keymap::NUM_LAYER] =
    default_keymap::get_default_keymap();
pub static DEFAULT_ENCODER_MAP: [[EncoderBinding; default_keymap::NUM_ENCODER]; default_keymap::NUM_LAYER] =
    default_keymap::get_default_encoder_map();

/// The ocreeb-12 with its default layout
pub fn create_default_keyboard(clock: &ManualClock) -> DefaultKeyboard<'_> {
    let config = default_keymap::get_default_config(&DEFAULT_KEYMAP, &DEFAULT_ENCODER_MAP);
    Keyboard::new(config, HidRecorder::default(), LedRecorder::default(), clock).unwrap()
}

/// A keyboard over a test keymap without encoders
pub fn create_test_keyboard<'c, const ROW: usize, const COL: usize, const NUM_LAYER: usize>(
    keymap: &'static [[[KeyAction; COL]; ROW]; NUM_LAYER],
    behavior: BehaviorConfig,
    clock: &'c ManualClock,
) -> TestKeyboard<'c, ROW, COL, NUM_LAYER, 0> {
    // Leak the empty encoder map, tests build a handful of keyboards only
    let encoder_map: &'static [[EncoderBinding; 0]; NUM_LAYER] = Box::leak(Box::new([[]; NUM_LAYER]));
    let config = KeyboardConfig {
        keymap,
        encoder_map,
        behavior,
        light: LightConfig::default(),
    };
    Keyboard::new(config, HidRecorder::default(), LedRecorder::default(), clock).unwrap()
}

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// Let `ms` milliseconds pass, ticking the keyboard every millisecond like the run loop would
pub fn wait<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keyboard: &mut TestKeyboard<'_, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    clock: &ManualClock,
    ms: u64,
) {
    for _ in 0..ms {
        clock.advance(Duration::from_millis(1));
        keyboard.tick();
    }
}

// run a keyboard test, input is a seq of key events with delays
pub fn run_key_sequence<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keyboard: &mut TestKeyboard<'_, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    clock: &ManualClock,
    sequence: &[TestKeyPress],
) {
    for key in sequence {
        wait(keyboard, clock, key.delay);
        keyboard.process(KeyboardEvent::key(key.row, key.col, key.pressed));
    }
}

/// Turn or push an encoder
pub fn rotate<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keyboard: &mut TestKeyboard<'_, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    id: u8,
    direction: Direction,
) {
    keyboard.process(KeyboardEvent::rotary_encoder(id, direction));
}

/// Press and release a key without delay
pub fn tap<const ROW: usize, const COL: usize, const NUM_LAYER: usize, const NUM_ENCODER: usize>(
    keyboard: &mut TestKeyboard<'_, ROW, COL, NUM_LAYER, NUM_ENCODER>,
    row: u8,
    col: u8,
) {
    keyboard.process(KeyboardEvent::key(row, col, true));
    keyboard.process(KeyboardEvent::key(row, col, false));
}
