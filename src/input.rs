//! Host-agnostic input: the frame loop never names a windowing crate's
//! key type directly, so a different window backend can be swapped in
//! without touching [`crate::engine::Engine`].

use std::collections::HashMap;

/// Lifecycle of one logical key across ticks.
///
/// `Pressed`/`Released` are edge states observed for exactly one tick:
/// `Pressed` demotes to `Held` on the following tick, `Released` is
/// removed from the map entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyState {
    Pressed,
    Held,
    Released,
}

/// One raw input observation for a tick, reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Mouse motion since the previous tick, in pixels. Reported only
    /// while the host is actually tracking the pointer (e.g. while
    /// cursor-lock is engaged); a host that never queries the mouse
    /// simply never emits this variant.
    MouseMoved { dx: f32, dy: f32 },
}

/// Keys the engine itself reacts to. A host maps its own keycodes onto
/// this small set before calling [`KeyMap::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
    Quit,
}

/// Tracks [`KeyState`] per [`Key`] across ticks.
#[derive(Default)]
pub struct KeyMap {
    states: HashMap<Key, KeyState>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: Key) -> Option<KeyState> {
        self.states.get(&key).copied()
    }

    pub fn is_down(&self, key: Key) -> bool {
        matches!(
            self.states.get(&key),
            Some(KeyState::Pressed) | Some(KeyState::Held)
        )
    }

    /// Apply this tick's raw events on top of last tick's state.
    pub fn apply(&mut self, events: &[InputEvent]) {
        // Advance edge states left over from the previous tick before
        // folding in new events, so a key held across ticks reads `Held`
        // and a key released last tick is gone before this tick starts.
        self.states.retain(|_, s| *s != KeyState::Released);
        for s in self.states.values_mut() {
            if *s == KeyState::Pressed {
                *s = KeyState::Held;
            }
        }
        for ev in events {
            match *ev {
                InputEvent::KeyDown(k) => {
                    self.states.entry(k).or_insert(KeyState::Pressed);
                }
                InputEvent::KeyUp(k) => {
                    self.states.insert(k, KeyState::Released);
                }
                InputEvent::MouseMoved { .. } => {}
            }
        }
    }
}
