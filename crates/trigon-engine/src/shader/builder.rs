use crate::gfx::{Backend, ShaderError, ShaderStage};

/// Compiles and links shader programs, reporting failures without aborting.
///
/// A failed compile or link leaves `None` in place of the program. With
/// `report_errors` set the diagnostic is logged at error level; otherwise it
/// only shows up at debug level.
#[derive(Debug, Copy, Clone)]
pub struct ShaderBuilder {
    report_errors: bool,
}

/// Result of [`ShaderBuilder::build`].
#[derive(Debug)]
pub struct BuiltPrograms<P> {
    /// One slot per fragment source, `None` where building failed.
    pub programs: Vec<Option<P>>,
    /// Every failure that was reported, in the order it happened.
    pub failures: Vec<ShaderError>,
}

impl ShaderBuilder {
    pub fn new(report_errors: bool) -> Self {
        Self { report_errors }
    }

    /// Level failures are logged at.
    pub fn report_level(&self) -> log::Level {
        if self.report_errors {
            log::Level::Error
        } else {
            log::Level::Debug
        }
    }

    pub fn compile<B: Backend>(
        &self,
        backend: &mut B,
        stage: ShaderStage,
        source: &str,
    ) -> Result<B::Shader, ShaderError> {
        backend
            .compile_shader(stage, source)
            .inspect_err(|e| self.report(e))
    }

    pub fn link<B: Backend>(
        &self,
        backend: &mut B,
        vertex: &B::Shader,
        fragment: &B::Shader,
    ) -> Result<B::Program, ShaderError> {
        backend
            .link_program(vertex, fragment)
            .inspect_err(|e| self.report(e))
    }

    /// Builds one program per fragment source, all sharing a single compiled
    /// vertex stage. Every per-stage handle is released before returning.
    pub fn build<B: Backend, S: AsRef<str>>(
        &self,
        backend: &mut B,
        vertex_source: &str,
        fragment_sources: &[S],
    ) -> BuiltPrograms<B::Program> {
        let mut failures = Vec::new();

        let vertex = self
            .compile(backend, ShaderStage::Vertex, vertex_source)
            .map_err(|e| failures.push(e))
            .ok();

        // Compile every fragment stage even when the vertex stage failed so
        // all diagnostics are reported in one run.
        let fragments: Vec<Option<B::Shader>> = fragment_sources
            .iter()
            .map(|src| {
                self.compile(backend, ShaderStage::Fragment, src.as_ref())
                    .map_err(|e| failures.push(e))
                    .ok()
            })
            .collect();

        let programs = fragments
            .iter()
            .map(|fragment| match (&vertex, fragment) {
                (Some(v), Some(f)) => self
                    .link(backend, v, f)
                    .map_err(|e| failures.push(e))
                    .ok(),
                _ => None,
            })
            .collect::<Vec<_>>();

        let usable = programs.iter().filter(|p| p.is_some()).count();
        log::debug!("built {usable}/{} shader programs", programs.len());

        drop(fragments);
        drop(vertex);

        BuiltPrograms { programs, failures }
    }

    fn report(&self, err: &ShaderError) {
        log::log!(self.report_level(), "{err}");
    }
}
