use embassy_time::{Duration, Instant};
use heapless::Vec;
use ocreeb_types::keycode::KeyCode;
use ocreeb_types::modifier::ModifierCombination;

use crate::hid::HidReporter;

// Max number of macros in the behavior config
pub(crate) const MACRO_MAX_NUM: usize = 8;
// Max number of operations of a macro
pub(crate) const MACRO_MAX_STEPS: usize = 16;
// Max number of keys a macro can keep pressed
const MACRO_MAX_HELD: usize = 8;

/// One step of a macro
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroOperation {
    Press(KeyCode),
    Release(KeyCode),
    /// Tap a key while the modifiers are held
    Tap(KeyCode, ModifierCombination),
    /// Wait before executing the next operation, in ms
    Delay(u16),
}

impl MacroOperation {
    pub const fn tap(keycode: KeyCode) -> Self {
        Self::Tap(keycode, ModifierCombination::new())
    }
}

/// A sequence of key operations triggered by a single key press
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Macro {
    pub operations: Vec<MacroOperation, MACRO_MAX_STEPS>,
}

impl Macro {
    pub fn new<I: IntoIterator<Item = MacroOperation>>(operations: I) -> Self {
        let mut m = Self::default();
        for operation in operations {
            if m.operations.push(operation).is_err() {
                warn!("Macro supports at most {} operations, ignoring the rest", MACRO_MAX_STEPS);
                break;
            }
        }
        m
    }
}

#[derive(Clone, Copy, Debug)]
struct RunningMacro {
    index: u8,
    step: usize,
    resume_at: Instant,
}

/// Executes macros, suspending at delays.
///
/// Only one macro runs at a time. Keys pressed by a macro are released when it ends, even if
/// the macro itself doesn't release them.
#[derive(Default)]
pub(crate) struct MacroRunner {
    running: Option<RunningMacro>,
    held: Vec<KeyCode, MACRO_MAX_HELD>,
}

impl MacroRunner {
    pub(crate) fn new() -> Self {
        Self {
            running: None,
            held: Vec::new(),
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.running.map(|r| r.resume_at)
    }

    /// Start the macro at `index`, aborting the suspended one if any
    pub(crate) fn trigger<R: HidReporter>(&mut self, index: u8, macros: &[Macro], now: Instant, reporter: &mut R) {
        if macros.get(index as usize).is_none() {
            warn!("Macro {} is not configured", index);
            return;
        }
        if let Some(running) = self.running {
            debug!("Macro {} aborted by macro {}", running.index, index);
            self.finish(reporter);
        }
        self.running = Some(RunningMacro {
            index,
            step: 0,
            resume_at: now,
        });
        self.resume(macros, now, reporter);
    }

    /// Resume the suspended macro once its delay has elapsed
    pub(crate) fn tick<R: HidReporter>(&mut self, macros: &[Macro], now: Instant, reporter: &mut R) {
        match self.running {
            Some(r) if now >= r.resume_at => self.resume(macros, now, reporter),
            _ => (),
        }
    }

    fn resume<R: HidReporter>(&mut self, macros: &[Macro], now: Instant, reporter: &mut R) {
        let Some(mut running) = self.running else {
            return;
        };
        let Some(m) = macros.get(running.index as usize) else {
            self.finish(reporter);
            return;
        };

        while let Some(operation) = m.operations.get(running.step) {
            running.step += 1;
            match *operation {
                MacroOperation::Press(keycode) => {
                    reporter.press(keycode);
                    if !self.held.contains(&keycode) && self.held.push(keycode).is_err() {
                        warn!("Macro holds too many keys, {:?} won't be released automatically", keycode);
                    }
                }
                MacroOperation::Release(keycode) => {
                    reporter.release(keycode);
                    self.held.retain(|k| *k != keycode);
                }
                MacroOperation::Tap(keycode, modifiers) => {
                    modifiers.keycodes().for_each(|m| reporter.press(m));
                    reporter.tap(keycode);
                    modifiers.keycodes().rev().for_each(|m| reporter.release(m));
                }
                MacroOperation::Delay(ms) => {
                    running.resume_at = now + Duration::from_millis(ms as u64);
                    trace!("Macro {} suspended until {}", running.index, running.resume_at.as_millis());
                    self.running = Some(running);
                    return;
                }
            }
        }
        self.finish(reporter);
    }

    fn finish<R: HidReporter>(&mut self, reporter: &mut R) {
        for keycode in self.held.iter().rev() {
            reporter.release(*keycode);
        }
        self.held.clear();
        self.running = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hid::HidEvent;

    #[derive(Default)]
    struct Recorder(std::vec::Vec<HidEvent>);

    impl HidReporter for Recorder {
        fn report(&mut self, event: HidEvent) {
            self.0.push(event);
        }
    }

    fn ms(t: u64) -> Instant {
        Instant::from_millis(t)
    }

    #[test]
    fn test_tap_with_modifiers() {
        let macros = [Macro::new([
            MacroOperation::Tap(KeyCode::Escape, ModifierCombination::LGUI | ModifierCombination::LALT),
        ])];
        let mut runner = MacroRunner::new();
        let mut recorder = Recorder::default();
        runner.trigger(0, &macros, ms(0), &mut recorder);
        assert_eq!(runner.next_deadline(), None);
        assert_eq!(
            recorder.0,
            [
                HidEvent::press(KeyCode::LAlt),
                HidEvent::press(KeyCode::LGui),
                HidEvent::press(KeyCode::Escape),
                HidEvent::release(KeyCode::Escape),
                HidEvent::release(KeyCode::LGui),
                HidEvent::release(KeyCode::LAlt),
            ]
        );
    }

    #[test]
    fn test_delay_suspends() {
        let macros = [Macro::new([
            MacroOperation::tap(KeyCode::Q),
            MacroOperation::Delay(400),
            MacroOperation::tap(KeyCode::Escape),
        ])];
        let mut runner = MacroRunner::new();
        let mut recorder = Recorder::default();
        runner.trigger(0, &macros, ms(10), &mut recorder);
        assert_eq!(recorder.0.len(), 2);
        assert_eq!(runner.next_deadline(), Some(ms(410)));
        runner.tick(&macros, ms(409), &mut recorder);
        assert_eq!(recorder.0.len(), 2);
        runner.tick(&macros, ms(410), &mut recorder);
        assert_eq!(recorder.0.len(), 4);
        assert_eq!(recorder.0[2], HidEvent::press(KeyCode::Escape));
        assert_eq!(runner.next_deadline(), None);
    }

    #[test]
    fn test_held_keys_released_on_abort() {
        let macros = [
            Macro::new([MacroOperation::Press(KeyCode::LShift), MacroOperation::Delay(100)]),
            Macro::new([MacroOperation::tap(KeyCode::A)]),
        ];
        let mut runner = MacroRunner::new();
        let mut recorder = Recorder::default();
        runner.trigger(0, &macros, ms(0), &mut recorder);
        runner.trigger(1, &macros, ms(50), &mut recorder);
        assert_eq!(
            recorder.0,
            [
                HidEvent::press(KeyCode::LShift),
                HidEvent::release(KeyCode::LShift),
                HidEvent::press(KeyCode::A),
                HidEvent::release(KeyCode::A),
            ]
        );
    }
}
