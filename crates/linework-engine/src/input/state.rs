use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current input state for the window.
///
/// With sticky keys enabled, a press is latched until it is observed through
/// [`InputState::poll_key`], so a key tapped and released between two polls
/// still reads as pressed once.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,

    sticky_keys: bool,
    latched: HashSet<Key>,

    close_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables sticky-key latching. Disabling drops pending latches.
    pub fn set_sticky_keys(&mut self, enabled: bool) {
        self.sticky_keys = enabled;
        if !enabled {
            self.latched.clear();
        }
    }

    /// Applies a platform-agnostic input event.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(*key);
                    if self.sticky_keys {
                        self.latched.insert(*key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },

            // Release events are not delivered while unfocused.
            // Latched presses survive; they already happened.
            InputEvent::Focused(false) => self.keys_down.clear(),
            InputEvent::Focused(true) => {}

            InputEvent::CloseRequested => {
                self.close_requested = true;
            }
        }
    }

    /// Returns true while `key` is physically held.
    #[cfg(test)]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Reads the state of `key`, consuming a sticky latch if one is pending.
    pub fn poll_key(&mut self, key: Key) -> KeyState {
        let latched = self.latched.remove(&key);
        if latched || self.keys_down.contains(&key) {
            KeyState::Pressed
        } else {
            KeyState::Released
        }
    }

    /// Window-should-close flag. Once set it stays set.
    pub fn should_close(&self) -> bool {
        self.close_requested
    }
}
