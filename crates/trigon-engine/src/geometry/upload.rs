use crate::gfx::Backend;

use super::{GeometryError, VertexLayout};

/// A vertex buffer together with the layout it was uploaded with.
///
/// Contents are written once at upload; there is no update path.
pub struct Uploaded<B: Backend> {
    handle: B::Geometry,
    layout: VertexLayout,
    vertex_count: u32,
}

impl<B: Backend> Uploaded<B> {
    pub fn handle(&self) -> &B::Geometry {
        &self.handle
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

/// Uploads `vertices` (packed xyz) and describes them with a position
/// attribute of `position_components` components.
pub fn upload<B: Backend>(
    backend: &mut B,
    vertices: &[f32],
    position_components: u32,
) -> Result<Uploaded<B>, GeometryError> {
    let layout = VertexLayout::positions(position_components)?;
    let per_vertex = layout.floats_per_vertex();

    if vertices.is_empty() {
        return Err(GeometryError::Empty);
    }
    if vertices.len() % per_vertex != 0 {
        return Err(GeometryError::Misaligned {
            len: vertices.len(),
            per_vertex,
        });
    }

    let vertex_count = (vertices.len() / per_vertex) as u32;
    let handle = backend.create_geometry(vertices, layout);

    log::debug!(
        "uploaded {} vertices ({} bytes, {} components)",
        vertex_count,
        size_of_val(vertices),
        layout.components
    );

    Ok(Uploaded {
        handle,
        layout,
        vertex_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LEFT_TRIANGLE;
    use crate::gfx::RecordingBackend;

    #[test]
    fn triangle_upload_has_three_vertices() {
        let mut backend = RecordingBackend::new();
        let g = upload(&mut backend, &LEFT_TRIANGLE, 3).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.handle().floats(), LEFT_TRIANGLE.to_vec());
    }

    #[test]
    fn empty_upload_is_rejected() {
        let mut backend = RecordingBackend::new();
        assert!(matches!(upload(&mut backend, &[], 3), Err(GeometryError::Empty)));
    }

    #[test]
    fn partial_vertex_is_rejected() {
        let mut backend = RecordingBackend::new();
        let err = upload(&mut backend, &[0.0; 8], 3).err();
        assert_eq!(
            err,
            Some(GeometryError::Misaligned {
                len: 8,
                per_vertex: 3
            })
        );
    }

    #[test]
    fn rejected_upload_allocates_nothing() {
        let mut backend = RecordingBackend::new();
        let _ = upload(&mut backend, &[0.0; 4], 3);
        assert_eq!(backend.ledger().borrow().live_geometry(), 0);
    }
}
