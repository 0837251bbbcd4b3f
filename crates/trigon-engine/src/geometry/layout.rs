use super::GeometryError;

/// Number of floats stored per vertex in every uploaded buffer (x, y, z).
pub const FLOATS_PER_VERTEX: usize = 3;

/// Describes how buffer bytes are read as the position attribute.
///
/// The stride always spans `FLOATS_PER_VERTEX` floats. `components` is how
/// many of those leading floats the shader sees; declaring 2 over a 3-float
/// stride reads x/y and skips z.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexLayout {
    /// Shader input location of the position attribute.
    pub location: u32,
    /// Position components read per vertex (2 or 3).
    pub components: u32,
    /// Distance between consecutive vertices, in bytes.
    pub stride: u64,
    /// Offset of the first component inside a vertex, in bytes.
    pub offset: u64,
}

impl VertexLayout {
    /// Position attribute at location 0 over tightly packed xyz vertices.
    pub fn positions(components: u32) -> Result<Self, GeometryError> {
        if !(2..=FLOATS_PER_VERTEX as u32).contains(&components) {
            return Err(GeometryError::UnsupportedComponents(components));
        }

        Ok(Self {
            location: 0,
            components,
            stride: (FLOATS_PER_VERTEX * size_of::<f32>()) as u64,
            offset: 0,
        })
    }

    /// Floats consumed per vertex according to the stride.
    #[inline]
    pub fn floats_per_vertex(&self) -> usize {
        self.stride as usize / size_of::<f32>()
    }

    pub(crate) fn wgpu_format(&self) -> wgpu::VertexFormat {
        match self.components {
            2 => wgpu::VertexFormat::Float32x2,
            _ => wgpu::VertexFormat::Float32x3,
        }
    }
}
