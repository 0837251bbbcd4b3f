//! Trigon engine crate.
//!
//! Opens a window, builds shader programs, uploads triangle geometry and
//! draws it every frame until the window closes. The graphics API sits
//! behind `gfx::Backend` so the same session runs headless in tests.

pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod frame;
pub mod geometry;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod paint;
pub mod shader;
pub mod window;
