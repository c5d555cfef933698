pub mod common;

use ocreeb::action::KeyAction;
use ocreeb::color::{HUE_BLUE, HUE_GREEN, Hsv};
use ocreeb::config::BehaviorConfig;
use ocreeb::event::KeyboardEvent;
use ocreeb::timer::ManualClock;
use ocreeb::{a, layer, lcy_m, lcy_p, light, mo, to};
use proptest::prelude::*;

use crate::common::{create_test_keyboard, tap};

#[rustfmt::skip]
static KEYMAP: [[[KeyAction; 6]; 1]; 4] = [
    layer!([[mo!(1), to!(2), lcy_p!(), lcy_m!(), light!(HueUp), light!(Toggle)]]),
    layer!([[a!(Transparent), to!(3), lcy_p!(), lcy_m!(), light!(ValueUp), light!(Toggle)]]),
    layer!([[mo!(3), to!(1), lcy_p!(), lcy_m!(), light!(ValueDown), light!(Toggle)]]),
    layer!([[a!(Transparent), to!(0), lcy_p!(), lcy_m!(), light!(HueDown), light!(Toggle)]]),
];

#[test]
fn test_light_follows_momentary_layer() {
    let clock = ManualClock::new();
    let mut keyboard = create_test_keyboard(&KEYMAP, BehaviorConfig::default(), &clock);
    tap(&mut keyboard, 0, 1);
    assert_eq!(keyboard.state().light().color(), Hsv::new(HUE_GREEN, 255, 16));

    keyboard.process(KeyboardEvent::key(0, 0, true));
    assert_eq!(keyboard.current_layer(), 3);
    keyboard.process(KeyboardEvent::key(0, 0, false));
    assert_eq!(keyboard.current_layer(), 2);
    assert_eq!(keyboard.state().light().driver().shown, [Hsv::new(HUE_GREEN, 255, 16); 4]);
}

#[test]
fn test_hue_adjustment_applies_to_every_layer() {
    let clock = ManualClock::new();
    let mut keyboard = create_test_keyboard(&KEYMAP, BehaviorConfig::default(), &clock);
    tap(&mut keyboard, 0, 4);
    tap(&mut keyboard, 0, 4);
    assert_eq!(keyboard.state().light().color().hue, HUE_BLUE + 8);
    tap(&mut keyboard, 0, 1);
    assert_eq!(keyboard.state().light().color().hue, HUE_GREEN + 8);
}

#[test]
fn test_disabled_light_stays_off_across_layers() {
    let clock = ManualClock::new();
    let mut keyboard = create_test_keyboard(&KEYMAP, BehaviorConfig::default(), &clock);
    tap(&mut keyboard, 0, 5);
    for _ in 0..4 {
        tap(&mut keyboard, 0, 2);
        assert!(keyboard.state().light().color().is_off());
        assert_eq!(keyboard.state().light().driver().shown, [Hsv::OFF; 4]);
    }
    tap(&mut keyboard, 0, 5);
    assert_eq!(keyboard.state().light().color(), Hsv::new(HUE_BLUE, 255, 16));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_light_matches_top_layer(events in prop::collection::vec((0u8..6, any::<bool>()), 0..60)) {
        let clock = ManualClock::new();
        let mut keyboard = create_test_keyboard(&KEYMAP, BehaviorConfig::default(), &clock);
        for (col, pressed) in events {
            keyboard.process(KeyboardEvent::key(0, col, pressed));
            let light = keyboard.state().light();
            let expected = light.color_of(keyboard.current_layer());
            prop_assert_eq!(light.color(), expected);
            prop_assert_eq!(light.driver().shown, [expected; 4]);
            prop_assert!(keyboard.state().layers().depth() >= 1);
        }
    }
}
