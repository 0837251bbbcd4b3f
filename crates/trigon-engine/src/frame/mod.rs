//! Frame loop state machine (Running → Closing).

mod loop_state;

pub use loop_state::{FrameLoop, LoopState};
