//! Color values used for clearing and for solid fragment output.

mod color;

pub use color::Color;
