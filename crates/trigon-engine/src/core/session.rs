use anyhow::{Context, Result};

use crate::config::SceneConfig;
use crate::coords::Viewport;
use crate::frame::{FrameLoop, LoopState};
use crate::geometry::{upload, Uploaded};
use crate::gfx::{Backend, DrawCall, ShaderError, Topology};
use crate::input::{InputState, Key};
use crate::paint::Color;
use crate::shader::{BuiltPrograms, ShaderBuilder};

/// Counts of handles released by [`Session::teardown`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TeardownReport {
    pub geometry: usize,
    pub programs: usize,
}

/// Owns every GPU object of a run plus the backend that created them.
///
/// Field order is drop order: geometry and programs are released before the
/// backend (and with it the GPU context).
pub struct Session<B: Backend> {
    geometry: Vec<Uploaded<B>>,
    programs: Vec<Option<B::Program>>,
    shader_failures: Vec<ShaderError>,
    clear_color: Color,
    frame_loop: FrameLoop,
    warned_unusable: bool,
    backend: B,
}

impl<B: Backend> Session<B> {
    /// Builds the programs and uploads the triangles of `scene`.
    ///
    /// Shader failures are reported and leave that triangle undrawable;
    /// invalid vertex data is an error.
    pub fn new(mut backend: B, scene: &SceneConfig, exit_key: Key) -> Result<Self> {
        let fragments: Vec<&str> = scene
            .triangles
            .iter()
            .map(|t| t.fragment_shader.as_str())
            .collect();

        let BuiltPrograms { programs, failures } = ShaderBuilder::new(scene.report_compile_errors)
            .build(&mut backend, &scene.vertex_shader, &fragments);

        let geometry = scene
            .triangles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                upload(&mut backend, &t.vertices, t.position_components)
                    .with_context(|| format!("failed to upload triangle {i}"))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "scene ready: {} triangles, {} usable programs",
            geometry.len(),
            programs.iter().filter(|p| p.is_some()).count()
        );

        Ok(Self {
            geometry,
            programs,
            shader_failures: failures,
            clear_color: scene.clear_color,
            frame_loop: FrameLoop::new(exit_key),
            warned_unusable: false,
            backend,
        })
    }

    /// Runs one loop iteration: poll input, clear, draw every usable
    /// triangle, present. Does nothing once closing.
    pub fn step(&mut self, input: &InputState) -> LoopState {
        if self.frame_loop.should_close() {
            return LoopState::Closing;
        }

        self.frame_loop.poll_input(input);

        let mut draws: Vec<DrawCall<'_, B>> = Vec::with_capacity(self.geometry.len());
        for (geometry, program) in self.geometry.iter().zip(&self.programs) {
            match program {
                Some(program) => draws.push(DrawCall {
                    program,
                    geometry: geometry.handle(),
                    topology: Topology::TriangleList,
                    vertices: 0..geometry.vertex_count(),
                }),
                None if !self.warned_unusable => {
                    log::warn!("skipping triangle without a usable shader program");
                    self.warned_unusable = true;
                }
                None => {}
            }
        }

        let status = self.backend.render_frame(self.clear_color, &draws);
        self.frame_loop.frame_finished(status);
        self.frame_loop.state()
    }

    /// Resize callback: the viewport tracks the new pixel size exactly.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("resize to {width}x{height}");
        self.backend.resize(width, height);
    }

    pub fn viewport(&self) -> Viewport {
        self.backend.viewport()
    }

    pub fn request_close(&mut self) {
        self.frame_loop.request_close();
    }

    pub fn should_close(&self) -> bool {
        self.frame_loop.should_close()
    }

    pub fn geometry(&self) -> &[Uploaded<B>] {
        &self.geometry
    }

    pub fn programs(&self) -> &[Option<B::Program>] {
        &self.programs
    }

    /// Shader failures reported while building the programs.
    pub fn shader_failures(&self) -> &[ShaderError] {
        &self.shader_failures
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Releases geometry, then programs, and closes the loop. The backend is
    /// released when the session is dropped. Calling this twice releases
    /// nothing the second time.
    pub fn teardown(&mut self) -> TeardownReport {
        self.frame_loop.request_close();

        let report = TeardownReport {
            geometry: self.geometry.len(),
            programs: self.programs.iter().filter(|p| p.is_some()).count(),
        };

        self.geometry.clear();
        self.programs.clear();

        log::info!(
            "released {} vertex buffers and {} programs",
            report.geometry,
            report.programs
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TriangleConfig;
    use crate::geometry::LEFT_TRIANGLE;
    use crate::gfx::{FrameStatus, RecordingBackend, ResourceKind};

    fn session(scene: &SceneConfig) -> Session<RecordingBackend> {
        Session::new(RecordingBackend::new(), scene, Key::Escape).unwrap()
    }

    #[test]
    fn default_scene_draws_two_triangles() {
        let mut s = session(&SceneConfig::default());
        assert_eq!(s.step(&InputState::default()), LoopState::Running);

        let frame = &s.backend().frames()[0];
        assert_eq!(frame.clear, SceneConfig::DEFAULT_CLEAR);
        assert_eq!(frame.draws.len(), 2);
        assert!(frame.draws.iter().all(|d| d.vertices == (0..3)));
    }

    #[test]
    fn invalid_triangle_data_fails_setup_without_leaks() {
        let mut scene = SceneConfig::default();
        scene.triangles[1].position_components = 4;

        let backend = RecordingBackend::new();
        let ledger = backend.ledger();
        let err = Session::new(backend, &scene, Key::Escape).err();

        assert!(err.is_some_and(|e| e.to_string().contains("triangle 1")));
        assert_eq!(ledger.borrow().live(), 0);
        assert_eq!(ledger.borrow().double_releases(), 0);
    }

    #[test]
    fn unusable_program_skips_only_its_triangle() {
        let scene = SceneConfig::empty()
            .with_triangle(TriangleConfig::solid(LEFT_TRIANGLE, Color::BLACK))
            .with_triangle(TriangleConfig {
                fragment_shader: "@fragment fn fs_main() -> {".into(),
                ..TriangleConfig::solid(LEFT_TRIANGLE, Color::BLACK)
            });

        let mut s = session(&scene);
        s.step(&InputState::default());
        s.step(&InputState::default());

        assert!(s.programs()[1].is_none());
        assert!(s.backend().frames().iter().all(|f| f.draws.len() == 1));
    }

    #[test]
    fn fatal_surface_error_closes() {
        let mut s = session(&SceneConfig::default());
        s.backend_mut().script_status(FrameStatus::Fatal);
        assert_eq!(s.step(&InputState::default()), LoopState::Closing);
        assert!(s.backend().frames().is_empty());
    }

    #[test]
    fn teardown_is_idempotent() {
        let mut s = session(&SceneConfig::default());
        let ledger = s.backend().ledger();

        assert_eq!(
            s.teardown(),
            TeardownReport {
                geometry: 2,
                programs: 2
            }
        );
        assert_eq!(s.teardown(), TeardownReport::default());
        assert_eq!(ledger.borrow().released(ResourceKind::Geometry), 2);
        assert_eq!(ledger.borrow().released(ResourceKind::Program), 2);
        assert!(s.should_close());
    }
}
