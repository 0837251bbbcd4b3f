use crate::gfx::FrameStatus;
use crate::input::{InputState, Key};

/// Frame loop state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Closing,
}

/// Close-signal bookkeeping for the frame loop.
///
/// Closing is terminal: once entered, nothing moves the loop back to Running.
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: LoopState,
    exit_key: Key,
    frames: u64,
}

impl FrameLoop {
    pub fn new(exit_key: Key) -> Self {
        Self {
            state: LoopState::Running,
            exit_key,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn should_close(&self) -> bool {
        self.state == LoopState::Closing
    }

    pub fn request_close(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("close requested after {} frames", self.frames);
        }
        self.state = LoopState::Closing;
    }

    /// Checks the input controls; the exit key held requests close.
    pub fn poll_input(&mut self, input: &InputState) {
        if input.key_down(self.exit_key) {
            self.request_close();
        }
    }

    /// Records the result of one rendered frame.
    pub fn frame_finished(&mut self, status: FrameStatus) {
        match status {
            FrameStatus::Presented => self.frames += 1,
            FrameStatus::Skipped => {}
            FrameStatus::Fatal => {
                log::error!("surface lost unrecoverably; closing");
                self.request_close();
            }
        }
    }

    /// Frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(Key::Escape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{InputEvent, KeyState};

    fn pressed(key: Key) -> InputState {
        let mut input = InputState::default();
        input.apply_event(InputEvent::Key {
            key,
            state: KeyState::Pressed,
            repeat: false,
        });
        input
    }

    #[test]
    fn starts_running() {
        let l = FrameLoop::default();
        assert_eq!(l.state(), LoopState::Running);
        assert!(!l.should_close());
    }

    #[test]
    fn exit_key_closes() {
        let mut l = FrameLoop::default();
        l.poll_input(&pressed(Key::Escape));
        assert!(l.should_close());
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut l = FrameLoop::default();
        l.poll_input(&pressed(Key::Space));
        assert_eq!(l.state(), LoopState::Running);
    }

    #[test]
    fn custom_exit_key() {
        let mut l = FrameLoop::new(Key::Q);
        l.poll_input(&pressed(Key::Escape));
        assert!(!l.should_close());
        l.poll_input(&pressed(Key::Q));
        assert!(l.should_close());
    }

    #[test]
    fn closing_is_terminal() {
        let mut l = FrameLoop::default();
        l.request_close();
        l.poll_input(&InputState::default());
        l.frame_finished(FrameStatus::Presented);
        assert!(l.should_close());
    }

    #[test]
    fn fatal_frame_closes_and_skipped_is_not_counted() {
        let mut l = FrameLoop::default();
        l.frame_finished(FrameStatus::Presented);
        l.frame_finished(FrameStatus::Skipped);
        assert_eq!(l.frames_presented(), 1);
        l.frame_finished(FrameStatus::Fatal);
        assert!(l.should_close());
    }
}
