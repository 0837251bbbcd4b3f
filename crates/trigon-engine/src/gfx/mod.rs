//! Graphics backend seam.
//!
//! The session talks to the GPU only through [`Backend`]. Handles returned by
//! a backend are owning values: dropping one releases the GPU object, so
//! every resource is released exactly once on every exit path.
//!
//! Two implementations live here:
//! - [`WgpuBackend`]: the real renderer bound to a window surface
//! - [`RecordingBackend`]: headless, records frames and keeps a resource ledger

use std::fmt;
use std::ops::Range;

use crate::coords::Viewport;
use crate::geometry::VertexLayout;
use crate::paint::Color;

mod recording;
mod wgpu_backend;
mod wgsl;

pub use recording::{
    DrawRecord, FrameRecord, Ledger, RecordedGeometry, RecordedProgram, RecordedShader,
    RecordingBackend, ResourceKind,
};
pub use wgpu_backend::{WgpuBackend, WgpuGeometry, WgpuProgram, WgpuShader};

/// Pipeline stage a shader is compiled for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShaderError {
    /// The compiler rejected the source; `log` is its diagnostic text.
    #[error("{stage} shader compilation failed\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program link failed\n{log}")]
    Link { log: String },
}

/// Primitive assembly mode for a draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    TriangleList,
}

impl Topology {
    fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// One draw: bound program + bound geometry + vertex range.
pub struct DrawCall<'a, B: Backend + ?Sized> {
    pub program: &'a B::Program,
    pub geometry: &'a B::Geometry,
    pub topology: Topology,
    pub vertices: Range<u32>,
}

/// Outcome of a single `render_frame`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// Frame was cleared, drawn and presented.
    Presented,
    /// Nothing presented this iteration (zero-sized or transient surface error).
    Skipped,
    /// The surface cannot be recovered; the loop should close.
    Fatal,
}

/// Operations the session needs from a graphics API.
pub trait Backend {
    type Shader;
    type Program;
    type Geometry;

    /// Compiles one stage.
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderError>;

    /// Links a vertex and a fragment stage. The stages stay owned by the
    /// caller and may be dropped as soon as this returns.
    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, ShaderError>;

    /// Uploads packed vertex data; the layout has already been validated.
    fn create_geometry(&mut self, vertices: &[f32], layout: VertexLayout) -> Self::Geometry;

    /// Resizes the drawable surface; the viewport follows exactly.
    fn resize(&mut self, width: u32, height: u32);

    fn viewport(&self) -> Viewport;

    /// Clears to `clear`, issues `draws` in order and presents.
    fn render_frame(&mut self, clear: Color, draws: &[DrawCall<'_, Self>]) -> FrameStatus;
}

/// Checks that a link pairs a vertex stage with a fragment stage.
pub(crate) fn check_link_roles(
    vertex: ShaderStage,
    fragment: ShaderStage,
) -> Result<(), ShaderError> {
    if vertex != ShaderStage::Vertex {
        return Err(ShaderError::Link {
            log: format!("expected a vertex stage in the vertex slot, got {vertex}"),
        });
    }
    if fragment != ShaderStage::Fragment {
        return Err(ShaderError::Link {
            log: format!("expected a fragment stage in the fragment slot, got {fragment}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_roles_accept_vertex_then_fragment() {
        assert!(check_link_roles(ShaderStage::Vertex, ShaderStage::Fragment).is_ok());
    }

    #[test]
    fn link_roles_reject_swapped_stages() {
        let err = check_link_roles(ShaderStage::Fragment, ShaderStage::Vertex).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn compile_error_message_carries_log() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Vertex,
            log: "expected ';'".into(),
        };
        assert_eq!(err.to_string(), "vertex shader compilation failed\nexpected ';'");
    }
}
