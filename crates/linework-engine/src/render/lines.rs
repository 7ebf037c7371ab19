use std::collections::HashMap;

use anyhow::{Context, Result};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::device::{
    BufferId, Gpu, LineDevice, PresentOutcome, ProgramId, ProgramSource, VertexArrayId,
};
use crate::scene::{AttributeLayout, FrameCommands};

use super::plan::{plan_frame, PassPlan};

struct VertexArray {
    layout: AttributeLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

struct Program {
    layout: AttributeLayout,
    pipeline: wgpu::RenderPipeline,
}

/// Multisampled color target resolved into the surface texture each frame.
struct MsaaTarget {
    size: (u32, u32),
    format: wgpu::TextureFormat,
    sample_count: u32,
    view: wgpu::TextureView,
}

/// wgpu objects created through [`WgpuLineDevice`], keyed by handle.
///
/// Lives next to the `Gpu` for the whole run. Every handle is released
/// explicitly by the harness; `shutdown` reports anything left over.
#[derive(Default)]
pub struct LineResources {
    next_id: u32,
    vertex_arrays: HashMap<VertexArrayId, VertexArray>,
    programs: HashMap<ProgramId, Program>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    msaa: Option<MsaaTarget>,
}

impl LineResources {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_raw(&mut self) -> u32 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    /// Number of live vertex arrays, programs and buffers.
    pub fn live_counts(&self) -> (usize, usize, usize) {
        (self.vertex_arrays.len(), self.programs.len(), self.buffers.len())
    }

    /// Recreates the multisampled target when the surface size, format or
    /// sample count changed.
    fn ensure_msaa(&mut self, gpu: &Gpu<'_>) {
        let sample_count = gpu.sample_count();
        if sample_count <= 1 {
            self.msaa = None;
            return;
        }

        let size = (gpu.size().width, gpu.size().height);
        let format = gpu.surface_format();
        let stale = self.msaa.as_ref().is_none_or(|m| {
            m.size != size || m.format != format || m.sample_count != sample_count
        });

        if stale {
            let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
                label: Some("linework msaa color"),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            log::debug!("msaa target {}x{} {sample_count}x", size.0, size.1);
            self.msaa = Some(MsaaTarget {
                size,
                format,
                sample_count,
                view,
            });
        }
    }
}

/// [`LineDevice`] backed by wgpu.
///
/// Short-lived: the runtime builds one around its `Gpu` and `LineResources`
/// for each call into the harness.
pub struct WgpuLineDevice<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    window: &'a Window,
    resources: &'a mut LineResources,
}

impl<'a, 'w> WgpuLineDevice<'a, 'w> {
    pub fn new(gpu: &'a mut Gpu<'w>, window: &'a Window, resources: &'a mut LineResources) -> Self {
        Self {
            gpu,
            window,
            resources,
        }
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        pass: &PassPlan,
    ) {
        let resources = &*self.resources;

        let (view, resolve_target) = match resources.msaa.as_ref() {
            Some(msaa) => (&msaa.view, Some(target)),
            None => (target, None),
        };

        let load = match pass.clear {
            Some(color) => wgpu::LoadOp::Clear(color.to_wgpu()),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("linework line pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut current: Option<ProgramId> = None;
        for draw in &pass.draws {
            let Some(program) = resources.programs.get(&draw.program) else {
                log::warn!("draw skipped: unknown program {:?}", draw.program);
                continue;
            };
            let Some(buffer) = resources.buffers.get(&draw.buffer) else {
                log::warn!("draw skipped: unknown buffer {:?}", draw.buffer);
                continue;
            };
            // The attribute layout is baked into the pipeline.
            if program.layout != draw.layout {
                log::warn!("draw skipped: attribute layout does not match {:?}", draw.program);
                continue;
            }

            if current != Some(draw.program) {
                rpass.set_pipeline(&program.pipeline);
                current = Some(draw.program);
            }
            rpass.set_vertex_buffer(0, buffer.slice(..));
            rpass.draw(draw.vertices.clone(), 0..1);
        }
    }
}

impl LineDevice for WgpuLineDevice<'_, '_> {
    fn create_vertex_array(&mut self, layout: AttributeLayout) -> Result<VertexArrayId> {
        anyhow::ensure!(
            layout.vertex_format().is_some(),
            "unsupported attribute layout {layout:?}"
        );

        let pipeline_layout =
            self.gpu
                .device()
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("linework vertex array"),
                    bind_group_layouts: &[],
                    immediate_size: 0,
                });

        let id = VertexArrayId::from_raw(self.resources.next_raw());
        self.resources.vertex_arrays.insert(
            id,
            VertexArray {
                layout,
                pipeline_layout,
            },
        );
        log::debug!("created vertex array {id:?}");
        Ok(id)
    }

    fn create_program(
        &mut self,
        vertex_array: VertexArrayId,
        source: &ProgramSource,
    ) -> Result<ProgramId> {
        let va = self
            .resources
            .vertex_arrays
            .get(&vertex_array)
            .with_context(|| format!("unknown vertex array {vertex_array:?}"))?;
        let layout = va.layout;
        let format = layout
            .vertex_format()
            .with_context(|| format!("unsupported attribute layout {layout:?}"))?;

        let vs_code = ProgramSource::load_stage(&source.vertex)?;
        let fs_code = ProgramSource::load_stage(&source.fragment)?;

        let device = self.gpu.device();
        let vs_label = source.vertex.display().to_string();
        let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&vs_label),
            source: wgpu::ShaderSource::Wgsl(vs_code.into()),
        });
        let fs_label = source.fragment.display().to_string();
        let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&fs_label),
            source: wgpu::ShaderSource::Wgsl(fs_code.into()),
        });

        let attributes = [wgpu::VertexAttribute {
            format,
            offset: layout.offset,
            shader_location: layout.location,
        }];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("linework line pipeline"),
            layout: Some(&va.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(ProgramSource::VERTEX_ENTRY),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: layout.effective_stride(),
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(ProgramSource::FRAGMENT_ENTRY),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.gpu.surface_format(),
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: self.gpu.sample_count(),
                mask: !0,
                alpha_to_coverage_enabled: false,
            },

            multiview_mask: None,
            cache: None,
        });

        let id = ProgramId::from_raw(self.resources.next_raw());
        self.resources
            .programs
            .insert(id, Program { layout, pipeline });
        log::debug!("created program {id:?} ({vs_label} + {fs_label})");
        Ok(id)
    }

    fn create_buffer(&mut self, label: &str, contents: &[u8]) -> Result<BufferId> {
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            });

        let id = BufferId::from_raw(self.resources.next_raw());
        self.resources.buffers.insert(id, buffer);
        log::debug!("created buffer {id:?} '{label}' ({} bytes)", contents.len());
        Ok(id)
    }

    fn submit(&mut self, frame: &FrameCommands) -> PresentOutcome {
        if !self.gpu.is_drawable() {
            return PresentOutcome::Skipped;
        }

        let passes = plan_frame(frame.commands());

        let mut gpu_frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => return self.gpu.handle_surface_error(err),
        };

        self.resources.ensure_msaa(&*self.gpu);
        for pass in &passes {
            self.encode_pass(&mut gpu_frame.encoder, &gpu_frame.view, pass);
        }

        self.window.pre_present_notify();
        self.gpu.submit(gpu_frame);
        PresentOutcome::Presented
    }

    fn delete_buffer(&mut self, id: BufferId) {
        match self.resources.buffers.remove(&id) {
            Some(buffer) => {
                buffer.destroy();
                log::debug!("deleted buffer {id:?}");
            }
            None => log::warn!("delete of unknown buffer {id:?}"),
        }
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        if self.resources.vertex_arrays.remove(&id).is_none() {
            log::warn!("delete of unknown vertex array {id:?}");
        } else {
            log::debug!("deleted vertex array {id:?}");
        }
    }

    fn delete_program(&mut self, id: ProgramId) {
        if self.resources.programs.remove(&id).is_none() {
            log::warn!("delete of unknown program {id:?}");
        } else {
            log::debug!("deleted program {id:?}");
        }
    }

    fn shutdown(&mut self) {
        self.resources.msaa = None;

        let (vertex_arrays, programs, buffers) = self.resources.live_counts();
        if vertex_arrays + programs + buffers > 0 {
            log::warn!(
                "shutdown with live resources: {vertex_arrays} vertex arrays, {programs} programs, {buffers} buffers"
            );
        }
        log::debug!("line device shut down");
    }
}
