//! Session: the objects of one run and the per-frame step that drives them.
//!
//! The runtime (platform loop) owns a session and calls `step` once per
//! redraw; tests drive the same type over a headless backend.

mod session;

pub use session::{Session, TeardownReport};
