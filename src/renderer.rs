//! Executes a frame's [`DrawQueue`] on the GPU.
//!
//! The renderer owns the depth buffer and a uniform buffer holding every
//! draw's world-view-projection matrix. Each matrix sits in its own slot,
//! aligned to the device's uniform offset alignment, and group 0 is bound with
//! a dynamic offset per draw. Meshes, textures and pipelines come from
//! [`GpuResources`].
//!
//! # Depth Buffer
//!
//! The depth buffer follows the surface size. [`Renderer::render`] calls
//! [`ensure_depth_size`](Renderer::ensure_depth_size) itself, so a resized
//! window needs nothing more than [`GpuContext::resize`].

use std::num::NonZeroU64;

use tracing::warn;

use crate::draw_queue::{DrawCall, DrawQueue};
use crate::effect::{DEPTH_FORMAT, MATRIX_SIZE};
use crate::gpu::GpuContext;
use crate::resources::GpuResources;

/// Draw slots allocated up front.
const INITIAL_SLOTS: u64 = 64;

pub struct Renderer {
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    slot_stride: u64,
    slot_capacity: u64,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, resources: &GpuResources) -> Self {
        let slot_stride = slot_stride(
            gpu.device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (uniform_buffer, uniform_bind_group) =
            Self::create_uniforms(gpu, resources, slot_stride, INITIAL_SLOTS);
        let (depth_texture, depth_view) = Self::create_depth_texture(gpu);

        Self {
            depth_texture,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            uniform_buffer,
            uniform_bind_group,
            slot_stride,
            slot_capacity: INITIAL_SLOTS,
        }
    }

    fn create_depth_texture(gpu: &GpuContext) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_uniforms(
        gpu: &GpuContext,
        resources: &GpuResources,
        stride: u64,
        slots: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("World View Projection Uniforms"),
            size: stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("World View Projection Bind Group"),
            layout: &resources.layouts().frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(MATRIX_SIZE),
                }),
            }],
        });

        (buffer, bind_group)
    }

    /// Recreate the depth buffer if the surface size changed.
    pub fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            let (texture, view) = Self::create_depth_texture(gpu);
            self.depth_texture = texture;
            self.depth_view = view;
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Grow the uniform buffer to hold at least `calls` slots.
    fn ensure_slots(&mut self, gpu: &GpuContext, resources: &GpuResources, calls: usize) {
        let needed = calls as u64;
        if needed <= self.slot_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_uniforms(gpu, resources, self.slot_stride, capacity);
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.slot_capacity = capacity;
    }

    /// Clear the surface and execute every queued draw, then present.
    ///
    /// Calls whose handles are unknown to `resources` are skipped with a
    /// warning.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        resources: &GpuResources,
        queue: &DrawQueue,
        clear_color: wgpu::Color,
    ) -> Result<(), wgpu::SurfaceError> {
        self.ensure_depth_size(gpu);
        self.ensure_slots(gpu, resources, queue.len());

        if !queue.is_empty() {
            let bytes = pack_matrices(queue.calls(), self.slot_stride);
            gpu.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
        }

        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for (slot, call) in queue.calls().iter().enumerate() {
                let (Some(pipeline), Some(mesh), Some(texture)) = (
                    resources.pipeline(call.effect),
                    resources.mesh(call.mesh),
                    resources.texture_bind_group(call.texture),
                ) else {
                    warn!(?call, "skipping draw with unknown resource handle");
                    continue;
                };

                let offset = (slot as u64 * self.slot_stride) as u32;
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Bytes between consecutive matrix slots for a given offset alignment.
fn slot_stride(alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    MATRIX_SIZE.div_ceil(alignment) * alignment
}

/// Lay out each call's matrix at `index * stride`, column-major.
fn pack_matrices(calls: &[DrawCall], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let mut bytes = vec![0u8; calls.len() * stride];
    for (slot, call) in calls.iter().enumerate() {
        let matrix = call.world_view_projection.to_cols_array();
        let start = slot * stride;
        bytes[start..start + MATRIX_SIZE as usize].copy_from_slice(bytemuck::cast_slice(&matrix));
    }
    bytes
}
