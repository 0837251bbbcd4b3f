use std::cell::RefCell;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::geometry::VertexLayout;
use crate::paint::Color;

use super::{
    check_link_roles, wgsl, Backend, DrawCall, FrameStatus, ShaderError, ShaderStage, Topology,
};

/// A compiled WGSL stage.
pub struct WgpuShader {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
    entry_point: String,
}

/// A linked vertex + fragment pair.
///
/// wgpu bakes the vertex layout and topology into the pipeline object, so
/// pipelines are built on first use per combination and cached on the program.
pub struct WgpuProgram {
    vertex: wgpu::ShaderModule,
    vertex_entry: String,
    fragment: wgpu::ShaderModule,
    fragment_entry: String,
    layout: wgpu::PipelineLayout,
    pipelines: RefCell<Vec<((VertexLayout, Topology), wgpu::RenderPipeline)>>,
}

pub struct WgpuGeometry {
    buffer: wgpu::Buffer,
    layout: VertexLayout,
}

/// Renders through wgpu into the window surface.
pub struct WgpuBackend<'w> {
    window: &'w Window,
    gpu: Gpu<'w>,
    viewport: Viewport,
}

impl<'w> WgpuBackend<'w> {
    pub fn new(window: &'w Window, gpu: Gpu<'w>) -> Self {
        let size = gpu.size();
        let info = gpu.adapter_info();
        log::info!(
            "using {} ({:?}), surface format {:?}",
            info.name,
            info.backend,
            gpu.surface_format()
        );

        Self {
            window,
            gpu,
            viewport: Viewport::new(size.width, size.height),
        }
    }

    fn pipeline_for(
        &self,
        program: &WgpuProgram,
        layout: VertexLayout,
        topology: Topology,
    ) -> wgpu::RenderPipeline {
        let key = (layout, topology);
        if let Some((_, p)) = program.pipelines.borrow().iter().find(|(k, _)| *k == key) {
            return p.clone();
        }

        let attributes = [wgpu::VertexAttribute {
            format: layout.wgpu_format(),
            offset: layout.offset,
            shader_location: layout.location,
        }];

        let pipeline = self
            .gpu
            .device()
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("trigon triangle pipeline"),
                layout: Some(&program.layout),

                vertex: wgpu::VertexState {
                    module: &program.vertex,
                    entry_point: Some(program.vertex_entry.as_str()),
                    compilation_options: Default::default(),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                },

                fragment: Some(wgpu::FragmentState {
                    module: &program.fragment,
                    entry_point: Some(program.fragment_entry.as_str()),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.gpu.surface_format(),
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),

                primitive: wgpu::PrimitiveState {
                    topology: topology.to_wgpu(),
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },

                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

        program.pipelines.borrow_mut().push((key, pipeline.clone()));
        pipeline
    }
}

impl<'w> Backend for WgpuBackend<'w> {
    type Shader = WgpuShader;
    type Program = WgpuProgram;
    type Geometry = WgpuGeometry;

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, ShaderError> {
        // wgpu treats invalid WGSL as a device error; catch it up front so
        // the caller gets the diagnostic instead of an uncaptured error.
        let entry_point = wgsl::check_stage(stage, source)?;

        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "trigon vertex stage",
                    ShaderStage::Fragment => "trigon fragment stage",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });

        Ok(WgpuShader {
            module,
            stage,
            entry_point,
        })
    }

    fn link_program(
        &mut self,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
    ) -> Result<Self::Program, ShaderError> {
        check_link_roles(vertex.stage, fragment.stage)?;

        let layout = self
            .gpu
            .device()
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("trigon program layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        Ok(WgpuProgram {
            vertex: vertex.module.clone(),
            vertex_entry: vertex.entry_point.clone(),
            fragment: fragment.module.clone(),
            fragment_entry: fragment.entry_point.clone(),
            layout,
            pipelines: RefCell::new(Vec::new()),
        })
    }

    fn create_geometry(&mut self, vertices: &[f32], layout: VertexLayout) -> Self::Geometry {
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("trigon vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        WgpuGeometry { buffer, layout }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
        self.viewport = Viewport::new(width, height);
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render_frame(&mut self, clear: Color, draws: &[DrawCall<'_, Self>]) -> FrameStatus {
        if !self.viewport.is_drawable() {
            return FrameStatus::Skipped;
        }

        // Pipelines must exist before the pass borrows the encoder.
        let pipelines: Vec<_> = draws
            .iter()
            .map(|d| self.pipeline_for(d.program, d.geometry.layout, d.topology))
            .collect();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => FrameStatus::Fatal,
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        FrameStatus::Skipped
                    }
                };
            }
        };

        {
            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("trigon frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let v = self.viewport;
            rpass.set_viewport(
                v.x as f32,
                v.y as f32,
                v.width as f32,
                v.height as f32,
                0.0,
                1.0,
            );

            for (draw, pipeline) in draws.iter().zip(&pipelines) {
                rpass.set_pipeline(pipeline);
                rpass.set_vertex_buffer(0, draw.geometry.buffer.slice(..));
                rpass.draw(draw.vertices.clone(), 0..1);
            }
        }

        self.window.pre_present_notify();
        self.gpu.submit(frame);

        FrameStatus::Presented
    }
}
