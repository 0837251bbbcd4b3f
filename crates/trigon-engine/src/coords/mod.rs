//! Screen-space types shared by the runtime and the graphics backends.
//!
//! Everything here is in physical pixels with a top-left origin.

mod viewport;

pub use viewport::Viewport;
