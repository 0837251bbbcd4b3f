use crate::geometry::{TriangleVertices, LEFT_TRIANGLE, RIGHT_TRIANGLE};
use crate::paint::Color;
use crate::shader::sources;

/// One triangle: its vertices, how they are declared to the shader, and the
/// fragment stage that colors it.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleConfig {
    pub vertices: TriangleVertices,
    /// Position components declared in the vertex layout (2 or 3).
    pub position_components: u32,
    pub fragment_shader: String,
}

impl TriangleConfig {
    /// Triangle drawn with a constant color and an xyz position attribute.
    pub fn solid(vertices: TriangleVertices, color: Color) -> Self {
        Self {
            vertices,
            position_components: 3,
            fragment_shader: sources::solid_fragment(color),
        }
    }
}

/// Everything the session draws.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub clear_color: Color,
    /// Vertex stage shared by every triangle's program.
    pub vertex_shader: String,
    pub triangles: Vec<TriangleConfig>,
    /// Log compile/link diagnostics at error level instead of debug.
    pub report_compile_errors: bool,
}

impl SceneConfig {
    pub const DEFAULT_CLEAR: Color = Color::rgba(0.5, 0.0, 1.0, 1.0);
    pub const GOLD: Color = Color::rgb(0.8, 0.5, 0.0);

    /// Scene with no triangles; only the clear color is drawn.
    pub fn empty() -> Self {
        Self {
            clear_color: Self::DEFAULT_CLEAR,
            vertex_shader: sources::DEFAULT_VERTEX.to_string(),
            triangles: Vec::new(),
            report_compile_errors: true,
        }
    }

    pub fn with_triangle(mut self, triangle: TriangleConfig) -> Self {
        self.triangles.push(triangle);
        self
    }
}

impl Default for SceneConfig {
    /// Two side-by-side triangles: gold on the left, black on the right.
    fn default() -> Self {
        Self::empty()
            .with_triangle(TriangleConfig::solid(LEFT_TRIANGLE, Self::GOLD))
            .with_triangle(TriangleConfig::solid(RIGHT_TRIANGLE, Color::BLACK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_has_two_xyz_triangles() {
        let scene = SceneConfig::default();
        assert_eq!(scene.triangles.len(), 2);
        // The right triangle is declared with three components like the left
        // one; a 2-component declaration over the xyz stride is not the default.
        assert!(scene.triangles.iter().all(|t| t.position_components == 3));
        assert!(scene.report_compile_errors);
    }

    #[test]
    fn default_triangles_use_distinct_programs() {
        let scene = SceneConfig::default();
        assert_ne!(
            scene.triangles[0].fragment_shader,
            scene.triangles[1].fragment_shader
        );
    }

    #[test]
    fn empty_scene_keeps_clear_color() {
        let scene = SceneConfig::empty();
        assert!(scene.triangles.is_empty());
        assert_eq!(scene.clear_color, SceneConfig::DEFAULT_CLEAR);
    }
}
