use embassy_time::{Duration, Instant};
use heapless::Vec;
use ocreeb_types::action::KeyAction;

use crate::config::DEFAULT_TAP_TIMEOUT;
use crate::event::KeyboardEventPos;

// Max number of tap dances in the behavior config
pub(crate) const TAP_DANCE_MAX_NUM: usize = 8;
// Max number of actions of one tap dance
pub(crate) const TAP_DANCE_MAX_TAP: usize = 8;
// Max number of tap dance keys being resolved at the same time, validated against the keymap
pub(crate) const TAP_DANCE_MAX_PENDING: usize = 12;

/// A key which resolves to `actions[n - 1]` when tapped `n` times.
///
/// Tapping more often than there are actions saturates at the last one: the last action fires
/// as soon as it's reached, and again on every further tap inside the window. The same
/// `tap_timeout` is both the window between two taps and the longest press still counted as a
/// tap; holding the key longer fires the action for the current count as held.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDance {
    pub actions: Vec<KeyAction, TAP_DANCE_MAX_TAP>,
    pub tap_timeout: Duration,
}

impl Default for TapDance {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
            tap_timeout: DEFAULT_TAP_TIMEOUT,
        }
    }
}

impl TapDance {
    pub fn new<I: IntoIterator<Item = KeyAction>>(actions: I, tap_timeout: Duration) -> Self {
        let mut tap_dance = Self {
            actions: Vec::new(),
            tap_timeout,
        };
        for action in actions {
            if tap_dance.actions.push(action).is_err() {
                warn!("Tap dance supports at most {} actions, ignoring the rest", TAP_DANCE_MAX_TAP);
                break;
            }
        }
        tap_dance
    }

    /// The action for `tap_count` taps, saturating at the last action
    pub fn action_for(&self, tap_count: u8) -> KeyAction {
        let idx = (tap_count.max(1) as usize).min(self.actions.len());
        match idx {
            0 => KeyAction::No,
            _ => self.actions[idx - 1],
        }
    }

    fn max_taps(&self) -> usize {
        self.actions.len()
    }
}

/// What the dispatcher has to do after a tap dance key changed state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapDanceOutput {
    /// Fire the resolved action as a complete tap
    Tap(KeyAction),
    /// The key is held past the window, press the resolved action
    HoldStart(KeyAction),
    /// A held tap dance key is released, release the action pressed by `HoldStart`
    HoldEnd(KeyAction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum TapDancePhase {
    /// The key is down, a release before the deadline counts as a tap
    Pressed,
    /// The key is up and waiting for the next tap until the deadline
    Released,
    /// Held past the deadline, the action is pressed until the key is released
    Holding(KeyAction),
    /// The last action has fired, further taps until the deadline fire it again
    Saturated,
}

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct TapDanceState {
    pos: KeyboardEventPos,
    index: u8,
    tap_count: u8,
    phase: TapDancePhase,
    window_deadline: Instant,
}

impl TapDanceState {
    fn awaiting_resolution(&self) -> bool {
        self.phase == TapDancePhase::Released
    }
}

/// Per-key multi-tap disambiguation
#[derive(Default)]
pub(crate) struct TapDanceResolver {
    states: Vec<TapDanceState, TAP_DANCE_MAX_PENDING>,
}

fn lookup(tap_dances: &[TapDance], index: u8) -> Option<&TapDance> {
    tap_dances.get(index as usize)
}

impl TapDanceResolver {
    pub(crate) fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn find_mut(&mut self, pos: KeyboardEventPos) -> Option<&mut TapDanceState> {
        self.states.iter_mut().find(|s| s.pos == pos)
    }

    fn remove(&mut self, pos: KeyboardEventPos) -> Option<TapDanceState> {
        let i = self.states.iter().position(|s| s.pos == pos)?;
        Some(self.states.remove(i))
    }

    /// Completed taps of the key at `pos`, `None` if the key is idle or already resolved
    pub(crate) fn tap_count(&self, pos: KeyboardEventPos) -> Option<u8> {
        self.states
            .iter()
            .find(|s| s.pos == pos && s.phase != TapDancePhase::Saturated)
            .map(|s| s.tap_count)
    }

    pub(crate) fn on_press(
        &mut self,
        pos: KeyboardEventPos,
        index: u8,
        tap_dances: &[TapDance],
        now: Instant,
    ) -> Option<TapDanceOutput> {
        let Some(tap_dance) = lookup(tap_dances, index) else {
            warn!("Tap dance {} is not configured, dropping", index);
            return None;
        };

        let mut stale = None;
        if let Some(state) = self.find_mut(pos) {
            match state.phase {
                TapDancePhase::Released | TapDancePhase::Saturated if now <= state.window_deadline => {
                    state.phase = TapDancePhase::Pressed;
                    state.window_deadline = now + tap_dance.tap_timeout;
                    return None;
                }
                TapDancePhase::Released => {
                    // The window has elapsed without a tick, resolve it before counting again
                    stale = Some(TapDanceOutput::Tap(tap_dance.action_for(state.tap_count)));
                }
                TapDancePhase::Saturated => (),
                _ => {
                    debug!("Duplicated press of tap dance key {:?}", pos);
                    return None;
                }
            }
            self.remove(pos);
        }

        let state = TapDanceState {
            pos,
            index,
            tap_count: 0,
            phase: TapDancePhase::Pressed,
            window_deadline: now + tap_dance.tap_timeout,
        };
        if self.states.push(state).is_err() {
            error!("Too many tap dance keys in progress, dropping press of {:?}", pos);
        }
        stale
    }

    pub(crate) fn on_release(
        &mut self,
        pos: KeyboardEventPos,
        tap_dances: &[TapDance],
        now: Instant,
    ) -> Option<TapDanceOutput> {
        let state = self.find_mut(pos)?;
        let Some(tap_dance) = lookup(tap_dances, state.index) else {
            self.remove(pos);
            return None;
        };

        match state.phase {
            TapDancePhase::Pressed => {
                state.tap_count = state.tap_count.saturating_add(1);
                state.window_deadline = now + tap_dance.tap_timeout;
                if state.tap_count as usize >= tap_dance.max_taps() {
                    // No longer pattern is possible, resolve without waiting for the window
                    let action = tap_dance.action_for(state.tap_count);
                    debug!("Tap dance {:?} reached {} taps, resolving {:?}", pos, state.tap_count, action);
                    state.phase = TapDancePhase::Saturated;
                    Some(TapDanceOutput::Tap(action))
                } else {
                    state.phase = TapDancePhase::Released;
                    None
                }
            }
            TapDancePhase::Holding(action) => {
                self.remove(pos);
                Some(TapDanceOutput::HoldEnd(action))
            }
            TapDancePhase::Released | TapDancePhase::Saturated => None,
        }
    }

    /// Resolve every key whose deadline has passed
    pub(crate) fn poll(
        &mut self,
        now: Instant,
        tap_dances: &[TapDance],
    ) -> Vec<(KeyboardEventPos, TapDanceOutput), TAP_DANCE_MAX_PENDING> {
        let mut outputs = Vec::new();
        let mut i = 0;
        while i < self.states.len() {
            let state = &mut self.states[i];
            if now <= state.window_deadline {
                i += 1;
                continue;
            }
            let tap_dance = lookup(tap_dances, state.index);
            match state.phase {
                TapDancePhase::Pressed => {
                    // Held past the window, the held press counts as one more tap
                    let action = tap_dance
                        .map(|td| td.action_for(state.tap_count.saturating_add(1)))
                        .unwrap_or(KeyAction::No);
                    debug!("Tap dance {:?} held after {} taps: {:?}", state.pos, state.tap_count, action);
                    state.phase = TapDancePhase::Holding(action);
                    let _ = outputs.push((state.pos, TapDanceOutput::HoldStart(action)));
                    i += 1;
                }
                TapDancePhase::Released => {
                    let action = tap_dance
                        .map(|td| td.action_for(state.tap_count))
                        .unwrap_or(KeyAction::No);
                    debug!("Tap dance {:?} window elapsed after {} taps: {:?}", state.pos, state.tap_count, action);
                    let pos = state.pos;
                    self.states.remove(i);
                    let _ = outputs.push((pos, TapDanceOutput::Tap(action)));
                }
                TapDancePhase::Saturated => {
                    self.states.remove(i);
                }
                TapDancePhase::Holding(_) => i += 1,
            }
        }
        outputs
    }

    /// Resolve every key waiting for its next tap, except the key at `except`.
    ///
    /// Called when another key is pressed: the dance is over.
    pub(crate) fn interrupt(
        &mut self,
        except: KeyboardEventPos,
        tap_dances: &[TapDance],
    ) -> Vec<(KeyboardEventPos, TapDanceOutput), TAP_DANCE_MAX_PENDING> {
        self.states
            .retain(|s| s.pos == except || s.phase != TapDancePhase::Saturated);
        let mut outputs = Vec::new();
        while let Some(i) = self
            .states
            .iter()
            .position(|s| s.pos != except && s.awaiting_resolution())
        {
            let state = self.states.remove(i);
            let action = lookup(tap_dances, state.index)
                .map(|td| td.action_for(state.tap_count))
                .unwrap_or(KeyAction::No);
            debug!("Tap dance {:?} interrupted after {} taps: {:?}", state.pos, state.tap_count, action);
            let _ = outputs.push((state.pos, TapDanceOutput::Tap(action)));
        }
        outputs
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.states
            .iter()
            .filter(|s| matches!(s.phase, TapDancePhase::Pressed | TapDancePhase::Released))
            .map(|s| s.window_deadline)
            .min()
    }
}
