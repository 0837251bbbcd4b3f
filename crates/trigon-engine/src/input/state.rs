use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current input state for the window.
///
/// Holds "is down" information, which is what the frame loop polls.
#[derive(Debug, Default)]
pub struct InputState {
    /// Whether the window is focused.
    pub focused: bool,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // Keys released while unfocused never reach us.
                    self.keys_down.clear();
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(key);
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            repeat: false,
        }
    }

    #[test]
    fn press_then_release() {
        let mut s = InputState::default();
        s.apply_event(key(Key::Escape, KeyState::Pressed));
        assert!(s.key_down(Key::Escape));
        s.apply_event(key(Key::Escape, KeyState::Released));
        assert!(!s.key_down(Key::Escape));
    }

    #[test]
    fn repeat_keeps_key_down() {
        let mut s = InputState::default();
        s.apply_event(key(Key::Space, KeyState::Pressed));
        s.apply_event(InputEvent::Key {
            key: Key::Space,
            state: KeyState::Pressed,
            repeat: true,
        });
        assert_eq!(s.keys_down.len(), 1);
    }

    #[test]
    fn focus_loss_clears_held_keys() {
        let mut s = InputState::default();
        s.apply_event(InputEvent::Focused(true));
        s.apply_event(key(Key::Q, KeyState::Pressed));
        s.apply_event(InputEvent::Focused(false));
        assert!(!s.focused);
        assert!(s.keys_down.is_empty());
    }
}
