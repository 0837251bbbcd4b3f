//! Shader program builder.
//!
//! Sources are plain configuration values; nothing here holds global state.

mod builder;
pub mod sources;

pub use builder::{BuiltPrograms, ShaderBuilder};
