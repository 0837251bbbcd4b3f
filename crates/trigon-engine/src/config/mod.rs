//! Application configuration.
//!
//! All values are built in code; `Default` reproduces the stock two-triangle
//! window.

mod scene;

pub use scene::{SceneConfig, TriangleConfig};

use crate::device::GpuInit;
use crate::window::RuntimeConfig;

/// Top-level configuration handed to [`crate::window::Runtime::run`].
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub scene: SceneConfig,
}
