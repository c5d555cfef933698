use embassy_time::{Duration, Instant};
use heapless::Vec;
use ocreeb_types::action::Action;

use crate::event::KeyboardEventPos;

// Max number of rapid fire definitions in the behavior config
pub(crate) const RAPID_FIRE_MAX_NUM: usize = 8;
// Max number of rapid fire keys firing at the same time, validated against the keymap
pub(crate) const RAPID_FIRE_MAX_ACTIVE: usize = 12;
// Firings emitted for one key in a single poll before the schedule is resynced
const RAPID_FIRE_MAX_CATCH_UP: usize = 4;

/// Repeat an action while the key is held.
///
/// The action is pressed once on key press. After `timeout` the key starts firing, one repeat
/// every `interval`. With `toggle` the firing survives the key release and stops on the next
/// press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RapidFire {
    pub action: Action,
    pub interval: Duration,
    pub timeout: Duration,
    pub toggle: bool,
}

impl RapidFire {
    pub const fn new(action: Action, interval_ms: u64, timeout_ms: u64, toggle: bool) -> Self {
        Self {
            action,
            interval: Duration::from_millis(interval_ms),
            timeout: Duration::from_millis(timeout_ms),
            toggle,
        }
    }

    /// Repeat every 100ms after a 200ms hold
    pub const fn with_defaults(action: Action) -> Self {
        Self::new(action, 100, 200, false)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RapidFirePhase {
    /// Pressed, waiting for the timeout before firing
    Armed,
    /// Repeating every interval
    Firing,
    /// A latched key was pressed again, swallowing everything until its release
    Stopped,
}

/// Press or release of the wrapped action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RapidFireOutput {
    Press(Action),
    Release(Action),
}

/// One due firing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RapidFireTrigger {
    pub action: Action,
    /// The physical key is still down, so the action is currently pressed.
    /// A held firing is release + press, a latched firing is a complete tap.
    pub held: bool,
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct RapidFireState {
    pos: KeyboardEventPos,
    index: u8,
    held: bool,
    toggled_on: bool,
    phase: RapidFirePhase,
    press_time: Instant,
    last_fire: Instant,
}

impl RapidFireState {
    fn active(&self) -> bool {
        self.phase != RapidFirePhase::Stopped && (self.held || self.toggled_on)
    }
}

/// Per-key auto repeat
#[derive(Default)]
pub(crate) struct RapidFireEngine {
    states: Vec<RapidFireState, RAPID_FIRE_MAX_ACTIVE>,
}

impl RapidFireEngine {
    pub(crate) fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn find_mut(&mut self, pos: KeyboardEventPos) -> Option<&mut RapidFireState> {
        self.states.iter_mut().find(|s| s.pos == pos)
    }

    fn remove(&mut self, pos: KeyboardEventPos) {
        self.states.retain(|s| s.pos != pos);
    }

    /// Current phase of the key at `pos`, `None` if it's idle
    pub(crate) fn phase(&self, pos: KeyboardEventPos) -> Option<RapidFirePhase> {
        self.states.iter().find(|s| s.pos == pos).map(|s| s.phase)
    }

    pub(crate) fn is_firing(&self) -> bool {
        self.states.iter().any(|s| s.active())
    }

    pub(crate) fn on_press(
        &mut self,
        pos: KeyboardEventPos,
        index: u8,
        rapid_fires: &[RapidFire],
        now: Instant,
    ) -> Option<RapidFireOutput> {
        if let Some(state) = self.find_mut(pos) {
            if state.toggled_on && !state.held {
                debug!("Rapid fire {:?} stopped", pos);
                state.toggled_on = false;
                state.held = true;
                state.phase = RapidFirePhase::Stopped;
            }
            return None;
        }

        let Some(rapid_fire) = rapid_fires.get(index as usize) else {
            warn!("Rapid fire {} is not configured, dropping", index);
            return None;
        };

        let phase = if rapid_fire.timeout.as_ticks() == 0 {
            RapidFirePhase::Firing
        } else {
            RapidFirePhase::Armed
        };
        let state = RapidFireState {
            pos,
            index,
            held: true,
            toggled_on: false,
            phase,
            press_time: now,
            last_fire: now,
        };
        if self.states.push(state).is_err() {
            error!("Too many rapid fire keys, dropping press of {:?}", pos);
            return None;
        }
        Some(RapidFireOutput::Press(rapid_fire.action))
    }

    pub(crate) fn on_release(
        &mut self,
        pos: KeyboardEventPos,
        rapid_fires: &[RapidFire],
    ) -> Option<RapidFireOutput> {
        let state = self.find_mut(pos)?;
        if state.phase == RapidFirePhase::Stopped || !state.held {
            self.remove(pos);
            return None;
        }
        let Some(rapid_fire) = rapid_fires.get(state.index as usize) else {
            self.remove(pos);
            return None;
        };

        if rapid_fire.toggle {
            debug!("Rapid fire {:?} latched", pos);
            state.held = false;
            state.toggled_on = true;
        } else {
            self.remove(pos);
        }
        Some(RapidFireOutput::Release(rapid_fire.action))
    }

    /// Collect every firing due at `now`
    pub(crate) fn poll(
        &mut self,
        now: Instant,
        rapid_fires: &[RapidFire],
    ) -> Vec<RapidFireTrigger, { RAPID_FIRE_MAX_ACTIVE * RAPID_FIRE_MAX_CATCH_UP }> {
        let mut triggers = Vec::new();
        for state in self.states.iter_mut() {
            // Released between scheduling and now: never fire again
            if !state.active() {
                continue;
            }
            let Some(rapid_fire) = rapid_fires.get(state.index as usize) else {
                continue;
            };

            if state.phase == RapidFirePhase::Armed {
                let start = state.press_time + rapid_fire.timeout;
                if now < start {
                    continue;
                }
                trace!("Rapid fire {:?} starts firing", state.pos);
                state.phase = RapidFirePhase::Firing;
                state.last_fire = start;
            }

            if rapid_fire.interval.as_ticks() == 0 {
                continue;
            }
            let mut fired = 0;
            while now >= state.last_fire + rapid_fire.interval && fired < RAPID_FIRE_MAX_CATCH_UP {
                state.last_fire += rapid_fire.interval;
                fired += 1;
                let _ = triggers.push(RapidFireTrigger {
                    action: rapid_fire.action,
                    held: state.held,
                });
            }
            if now >= state.last_fire + rapid_fire.interval {
                warn!("Rapid fire {:?} fell behind, resyncing", state.pos);
                state.last_fire = now;
            }
        }
        triggers
    }

    pub(crate) fn next_deadline(&self, rapid_fires: &[RapidFire]) -> Option<Instant> {
        self.states
            .iter()
            .filter(|s| s.active())
            .filter_map(|s| {
                let rapid_fire = rapid_fires.get(s.index as usize)?;
                match s.phase {
                    RapidFirePhase::Armed => Some(s.press_time + rapid_fire.timeout),
                    RapidFirePhase::Firing if rapid_fire.interval.as_ticks() > 0 => {
                        Some(s.last_fire + rapid_fire.interval)
                    }
                    _ => None,
                }
            })
            .min()
    }
}
