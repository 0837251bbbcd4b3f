//! Triangle vertex data and the one-shot upload path.
//!
//! Positions are normalized device coordinates, packed as xyz `f32`.

mod layout;
mod upload;

pub use layout::{VertexLayout, FLOATS_PER_VERTEX};
pub use upload::{upload, Uploaded};

/// Three xyz vertices.
pub type TriangleVertices = [f32; 9];

/// Left triangle: bottom-left, bottom-center, top.
pub const LEFT_TRIANGLE: TriangleVertices = [
    -0.9, -0.5, 0.0, //
    0.0, -0.5, 0.0, //
    -0.45, 0.5, 0.0,
];

/// Right triangle, sharing the bottom-center vertex with the left one.
pub const RIGHT_TRIANGLE: TriangleVertices = [
    0.0, -0.5, 0.0, //
    0.9, -0.5, 0.0, //
    0.45, 0.5, 0.0,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error("position attribute must have 2 or 3 components, got {0}")]
    UnsupportedComponents(u32),

    #[error("vertex data is empty")]
    Empty,

    #[error("{len} floats do not form whole vertices of {per_vertex} floats")]
    Misaligned { len: usize, per_vertex: usize },
}
