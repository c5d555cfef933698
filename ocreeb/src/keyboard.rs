use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use ocreeb_types::action::{Action, KeyAction};
use ocreeb_types::keycode::KeyCode;

use crate::channel::KEYBOARD_EVENT_CHANNEL;
use crate::config::{BehaviorConfig, ConfigError, KeyboardConfig};
use crate::encoder::EncoderRouter;
use crate::event::{KeyboardEvent, KeyboardEventPos};
use crate::hid::HidReporter;
use crate::keyboard_macro::MacroRunner;
use crate::keymap::KeyMap;
use crate::layer::LayerError;
use crate::light::{LedDriver, StatusLight};
use crate::rapid_fire::{RapidFireEngine, RapidFireOutput, RapidFirePhase};
use crate::state::KeyboardState;
use crate::tap_dance::{TapDanceOutput, TapDanceResolver};
use crate::timer::Clock;

// Delay before retrying HID events which didn't fit in the output
const HID_RETRY_DELAY: Duration = Duration::from_millis(1);

/// A long running task
#[allow(async_fn_in_trait)]
pub trait Runnable {
    async fn run(&mut self);
}

/// The action dispatcher.
///
/// Each input event is resolved to a key action on the current layer, then routed to the
/// behavior engine which owns it. Pending timers are run before every event, and by
/// [`Keyboard::tick`] in between.
pub struct Keyboard<
    'a,
    R: HidReporter,
    D: LedDriver,
    C: Clock,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
> {
    /// Keymap
    keymap: KeyMap<'a, ROW, COL, NUM_LAYER>,
    /// Active layers, encoder router and status light
    state: KeyboardState<'a, D, NUM_ENCODER, NUM_LAYER>,
    /// Tap dance, rapid fire and macro definitions
    behavior: BehaviorConfig,
    tap_dance: TapDanceResolver,
    rapid_fire: RapidFireEngine,
    macros: MacroRunner,
    /// HID output
    reporter: R,
    clock: C,
}

impl<
    'a,
    R: HidReporter,
    D: LedDriver,
    C: Clock,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
> Keyboard<'a, R, D, C, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Build the keyboard, the status light shows layer 0 once this returns
    pub fn new(
        config: KeyboardConfig<'a, ROW, COL, NUM_LAYER, NUM_ENCODER>,
        reporter: R,
        led: D,
        clock: C,
    ) -> Result<Self, ConfigError> {
        if let Err(e) = config.validate() {
            error!("Invalid keyboard config: {:?}", e);
            return Err(e);
        }
        let KeyboardConfig {
            keymap,
            encoder_map,
            behavior,
            light,
        } = config;

        let mut keyboard = Self {
            keymap: KeyMap::new(keymap),
            state: KeyboardState::new(EncoderRouter::new(encoder_map), StatusLight::new(led, light)),
            behavior,
            tap_dance: TapDanceResolver::new(),
            rapid_fire: RapidFireEngine::new(),
            macros: MacroRunner::new(),
            reporter,
            clock,
        };
        keyboard.state.notify();
        Ok(keyboard)
    }

    pub fn state(&self) -> &KeyboardState<'a, D, NUM_ENCODER, NUM_LAYER> {
        &self.state
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    /// The top layer of the active layer stack
    pub fn current_layer(&self) -> u8 {
        self.state.layers.top()
    }

    /// Whether any rapid fire key is repeating
    pub fn is_rapid_firing(&self) -> bool {
        self.rapid_fire.is_firing()
    }

    /// The rapid fire phase of the key at `pos`, `None` when it's idle
    pub fn rapid_fire_phase(&self, pos: KeyboardEventPos) -> Option<RapidFirePhase> {
        self.rapid_fire.phase(pos)
    }

    /// The number of completed taps of a tap dance key still being resolved
    pub fn tap_count(&self, pos: KeyboardEventPos) -> Option<u8> {
        self.tap_dance.tap_count(pos)
    }

    /// The earliest instant at which [`Keyboard::tick`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.tap_dance.next_deadline(),
            self.rapid_fire.next_deadline(&self.behavior.rapid_fire.rapid_fires),
            self.macros.next_deadline(),
            self.reporter
                .has_pending()
                .then(|| self.clock.now() + HID_RETRY_DELAY),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Run everything which is due
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.run_timers(now);
    }

    /// Process one input event, stamped with the current time
    pub fn process(&mut self, event: KeyboardEvent) {
        let now = self.clock.now();
        // Timers due before the event fire first
        self.run_timers(now);
        self.process_event(event, now);
    }

    fn run_timers(&mut self, now: Instant) {
        self.reporter.flush();

        for (pos, output) in self.tap_dance.poll(now, &self.behavior.tap_dance.tap_dances) {
            self.process_tap_dance_output(pos, output, now);
        }

        for trigger in self.rapid_fire.poll(now, &self.behavior.rapid_fire.rapid_fires) {
            trace!("Rapid fire {:?}", trigger.action);
            if trigger.held {
                self.process_action(trigger.action, false, now);
                self.process_action(trigger.action, true, now);
            } else {
                self.process_action(trigger.action, true, now);
                self.process_action(trigger.action, false, now);
            }
        }

        self.macros
            .tick(&self.behavior.keyboard_macros.macros, now, &mut self.reporter);
    }

    fn process_event(&mut self, event: KeyboardEvent, now: Instant) {
        if event.pressed {
            // A press of another key ends the tap dances waiting for their next tap
            for (pos, output) in self
                .tap_dance
                .interrupt(event.pos, &self.behavior.tap_dance.tap_dances)
            {
                self.process_tap_dance_output(pos, output, now);
            }
        }

        match event.pos {
            KeyboardEventPos::Key(pos) => {
                let key_action = if event.pressed {
                    self.keymap.get_action_on_press(pos, &self.state.layers)
                } else {
                    self.keymap.get_action_on_release(pos)
                };
                debug!("Key ({}, {}) {}: {:?}", pos.row, pos.col, event.pressed, key_action);
                self.process_key_action(key_action, event, now);
            }
            KeyboardEventPos::RotaryEncoder(encoder) => {
                if !event.pressed {
                    trace!("Ignoring encoder release {:?}", encoder);
                    return;
                }
                let key_action = self.state.encoder.resolve(encoder.id, encoder.direction);
                debug!("Encoder {} {:?}: {:?}", encoder.id, encoder.direction, key_action);
                // Encoder steps are momentary, press and release at once
                self.process_key_action(key_action, event, now);
                self.process_key_action(key_action, event.with_pressed(false), now);
            }
        }
    }

    fn process_key_action(&mut self, key_action: KeyAction, event: KeyboardEvent, now: Instant) {
        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(action) => self.process_action(action, event.pressed, now),
            KeyAction::Tap(action) => {
                if event.pressed {
                    self.process_action(action, true, now);
                    self.process_action(action, false, now);
                }
            }
            KeyAction::RapidFire(index) => {
                let output = if event.pressed {
                    self.rapid_fire
                        .on_press(event.pos, index, &self.behavior.rapid_fire.rapid_fires, now)
                } else {
                    self.rapid_fire
                        .on_release(event.pos, &self.behavior.rapid_fire.rapid_fires)
                };
                match output {
                    Some(RapidFireOutput::Press(action)) => self.process_action(action, true, now),
                    Some(RapidFireOutput::Release(action)) => self.process_action(action, false, now),
                    None => (),
                }
            }
            KeyAction::TapDance(index) => {
                let output = if event.pressed {
                    self.tap_dance
                        .on_press(event.pos, index, &self.behavior.tap_dance.tap_dances, now)
                } else {
                    self.tap_dance
                        .on_release(event.pos, &self.behavior.tap_dance.tap_dances, now)
                };
                if let Some(output) = output {
                    self.process_tap_dance_output(event.pos, output, now);
                }
            }
        }
    }

    fn process_tap_dance_output(&mut self, pos: KeyboardEventPos, output: TapDanceOutput, now: Instant) {
        let (TapDanceOutput::Tap(key_action) | TapDanceOutput::HoldStart(key_action) | TapDanceOutput::HoldEnd(key_action)) =
            output;
        if let KeyAction::TapDance(index) = key_action {
            warn!("Nested tap dance {} is ignored", index);
            return;
        }
        let press = KeyboardEvent { pressed: true, pos };
        let release = press.with_pressed(false);
        match output {
            TapDanceOutput::Tap(_) => {
                self.process_key_action(key_action, press, now);
                self.process_key_action(key_action, release, now);
            }
            TapDanceOutput::HoldStart(_) => self.process_key_action(key_action, press, now),
            TapDanceOutput::HoldEnd(_) => self.process_key_action(key_action, release, now),
        }
    }

    fn process_action(&mut self, action: Action, pressed: bool, now: Instant) {
        match action {
            Action::Key(keycode) => self.process_keycode(keycode, pressed),
            Action::KeyWithModifier(keycode, modifiers) => {
                if pressed {
                    modifiers.keycodes().for_each(|m| self.reporter.press(m));
                    self.process_keycode(keycode, true);
                } else {
                    self.process_keycode(keycode, false);
                    modifiers.keycodes().rev().for_each(|m| self.reporter.release(m));
                }
            }
            Action::LayerOn(layer) => {
                let result = if pressed {
                    self.state.activate_layer(layer)
                } else {
                    self.state.deactivate_layer(layer)
                };
                self.log_layer_error(result);
            }
            Action::LayerOff(layer) if pressed => {
                let result = self.state.deactivate_layer(layer);
                self.log_layer_error(result);
            }
            Action::LayerTo(layer) if pressed => {
                let result = self.state.goto_layer(layer);
                self.log_layer_error(result);
            }
            Action::LayerNext if pressed => {
                let result = self.state.cycle_layer(1);
                self.log_layer_error(result);
            }
            Action::LayerPrev if pressed => {
                let result = self.state.cycle_layer(-1);
                self.log_layer_error(result);
            }
            Action::TriggerMacro(index) if pressed => {
                self.macros
                    .trigger(index, &self.behavior.keyboard_macros.macros, now, &mut self.reporter);
            }
            Action::ToggleEncoderMode if pressed => self.state.encoder.toggle_mode(),
            Action::Light(light_action) if pressed => self.state.light.process_action(light_action),
            _ => (),
        }
    }

    fn process_keycode(&mut self, keycode: KeyCode, pressed: bool) {
        if keycode == KeyCode::No {
            return;
        }
        if pressed {
            self.reporter.press(keycode);
        } else {
            self.reporter.release(keycode);
        }
    }

    fn log_layer_error(&self, result: Result<(), LayerError>) {
        if let Err(e) = result {
            error!("Layer operation failed: {:?}", e);
        }
    }
}

impl<
    R: HidReporter,
    D: LedDriver,
    C: Clock,
    const ROW: usize,
    const COL: usize,
    const NUM_LAYER: usize,
    const NUM_ENCODER: usize,
> Runnable for Keyboard<'_, R, D, C, ROW, COL, NUM_LAYER, NUM_ENCODER>
{
    /// Main keyboard processing task, it receives input events and wakes up for pending timers.
    async fn run(&mut self) {
        loop {
            let event = match self.next_deadline() {
                Some(deadline) => match select(Timer::at(deadline), KEYBOARD_EVENT_CHANNEL.receive()).await {
                    Either::First(_) => None,
                    Either::Second(event) => Some(event),
                },
                None => Some(KEYBOARD_EVENT_CHANNEL.receive().await),
            };
            match event {
                Some(event) => self.process(event),
                None => self.tick(),
            }
        }
    }
}
