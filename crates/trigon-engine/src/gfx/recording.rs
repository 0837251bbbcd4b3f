use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::rc::Rc;

use crate::coords::Viewport;
use crate::geometry::VertexLayout;
use crate::paint::Color;

use super::{
    check_link_roles, wgsl, Backend, DrawCall, FrameStatus, ShaderError, ShaderStage, Topology,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ResourceKind {
    Context,
    Shader,
    Program,
    Geometry,
}

/// Resource accounting shared between a [`RecordingBackend`] and the
/// handles it hands out.
///
/// Every creation and every release is appended in order, so tests can
/// check both counts and teardown ordering.
#[derive(Debug, Default)]
pub struct Ledger {
    next_id: u64,
    live: HashMap<u64, ResourceKind>,
    created: Vec<(ResourceKind, u64)>,
    released: Vec<(ResourceKind, u64)>,
    double_releases: usize,
}

impl Ledger {
    fn create(&mut self, kind: ResourceKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, kind);
        self.created.push((kind, id));
        id
    }

    fn release(&mut self, kind: ResourceKind, id: u64) {
        if self.live.remove(&id).is_none() {
            self.double_releases += 1;
        }
        self.released.push((kind, id));
    }

    pub fn created(&self, kind: ResourceKind) -> usize {
        self.created.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn released(&self, kind: ResourceKind) -> usize {
        self.released.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }

    pub fn live_geometry(&self) -> usize {
        self.live.values().filter(|k| **k == ResourceKind::Geometry).count()
    }

    pub fn double_releases(&self) -> usize {
        self.double_releases
    }

    /// Releases in the order they happened.
    pub fn release_order(&self) -> &[(ResourceKind, u64)] {
        &self.released
    }
}

type SharedLedger = Rc<RefCell<Ledger>>;

#[derive(Debug)]
pub struct RecordedShader {
    id: u64,
    stage: ShaderStage,
    entry_point: String,
    ledger: SharedLedger,
}

impl RecordedShader {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl Drop for RecordedShader {
    fn drop(&mut self) {
        self.ledger.borrow_mut().release(ResourceKind::Shader, self.id);
    }
}

#[derive(Debug)]
pub struct RecordedProgram {
    id: u64,
    ledger: SharedLedger,
}

impl Drop for RecordedProgram {
    fn drop(&mut self) {
        self.ledger.borrow_mut().release(ResourceKind::Program, self.id);
    }
}

/// Uploaded buffer; keeps a copy of the bytes as the GPU would see them.
#[derive(Debug)]
pub struct RecordedGeometry {
    id: u64,
    bytes: Vec<u8>,
    layout: VertexLayout,
    ledger: SharedLedger,
}

impl RecordedGeometry {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn floats(&self) -> Vec<f32> {
        self.bytes
            .chunks_exact(size_of::<f32>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    pub fn layout(&self) -> VertexLayout {
        self.layout
    }
}

impl Drop for RecordedGeometry {
    fn drop(&mut self) {
        self.ledger.borrow_mut().release(ResourceKind::Geometry, self.id);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: u64,
    pub geometry: u64,
    pub topology: Topology,
    pub vertices: Range<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    pub clear: Color,
    pub viewport: Viewport,
    pub draws: Vec<DrawRecord>,
}

/// Headless backend.
///
/// Compiles WGSL with the same front-end as the wgpu backend, so compile
/// diagnostics match; records every presented frame instead of drawing.
pub struct RecordingBackend {
    ledger: SharedLedger,
    context_id: u64,
    viewport: Viewport,
    frames: Vec<FrameRecord>,
    scripted: VecDeque<FrameStatus>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_viewport(Viewport::new(800, 600))
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        let ledger = SharedLedger::default();
        let context_id = ledger.borrow_mut().create(ResourceKind::Context);
        Self {
            ledger,
            context_id,
            viewport,
            frames: Vec::new(),
            scripted: VecDeque::new(),
        }
    }

    /// Shared handle to the resource ledger; stays readable after the
    /// backend itself has been dropped.
    pub fn ledger(&self) -> Rc<RefCell<Ledger>> {
        Rc::clone(&self.ledger)
    }

    /// Frames presented so far.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Makes upcoming `render_frame` calls report `status` instead of
    /// presenting, one entry per call.
    pub fn script_status(&mut self, status: FrameStatus) {
        self.scripted.push_back(status);
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecordingBackend {
    fn drop(&mut self) {
        self.ledger
            .borrow_mut()
            .release(ResourceKind::Context, self.context_id);
    }
}

impl Backend for RecordingBackend {
    type Shader = RecordedShader;
    type Program = RecordedProgram;
    type Geometry = RecordedGeometry;

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderError> {
        let entry_point = wgsl::check_stage(stage, source)?;
        let id = self.ledger.borrow_mut().create(ResourceKind::Shader);
        Ok(RecordedShader {
            id,
            stage,
            entry_point,
            ledger: Rc::clone(&self.ledger),
        })
    }

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, ShaderError> {
        check_link_roles(vertex.stage, fragment.stage)?;
        let id = self.ledger.borrow_mut().create(ResourceKind::Program);
        Ok(RecordedProgram {
            id,
            ledger: Rc::clone(&self.ledger),
        })
    }

    fn create_geometry(&mut self, vertices: &[f32], layout: VertexLayout) -> Self::Geometry {
        let id = self.ledger.borrow_mut().create(ResourceKind::Geometry);
        RecordedGeometry {
            id,
            bytes: bytemuck::cast_slice(vertices).to_vec(),
            layout,
            ledger: Rc::clone(&self.ledger),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render_frame(&mut self, clear: Color, draws: &[DrawCall<'_, Self>]) -> FrameStatus {
        if let Some(status) = self.scripted.pop_front() {
            return status;
        }
        if !self.viewport.is_drawable() {
            return FrameStatus::Skipped;
        }

        self.frames.push(FrameRecord {
            clear,
            viewport: self.viewport,
            draws: draws
                .iter()
                .map(|d| DrawRecord {
                    program: d.program.id,
                    geometry: d.geometry.id,
                    topology: d.topology,
                    vertices: d.vertices.clone(),
                })
                .collect(),
        });

        FrameStatus::Presented
    }
}
