//! Resource loading services for scene objects.
//!
//! Scene objects never talk to the GPU directly. During initialization they ask
//! a [`ResourceLoader`] for an effect, a mesh and a texture, and keep only the
//! returned handles. [`GpuResources`] is the wgpu-backed loader used by the
//! game; tests supply their own in-memory implementation.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::effect::{Effect, EffectLayouts};
use crate::error::{ResourceError, ShaderError};
use crate::geometry::MeshData;
use crate::gpu::GpuContext;
use crate::texture::{Texture, TextureData};

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw storage index.
            pub fn from_index(index: usize) -> Self {
                Self(index)
            }

            /// The raw storage index.
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

resource_handle!(
    /// Uploaded vertex and index buffers.
    MeshHandle
);
resource_handle!(
    /// An uploaded texture bound with its sampler.
    TextureHandle
);
resource_handle!(
    /// A compiled effect pipeline.
    EffectHandle
);

/// Services a scene object needs while initializing.
pub trait ResourceLoader {
    /// Load, validate and compile an effect.
    fn load_effect(&mut self, path: &str) -> Result<EffectHandle, ShaderError>;

    /// Read mesh data without uploading it.
    fn load_mesh(&mut self, path: &str) -> Result<MeshData, ResourceError> {
        let mesh = MeshData::load(path)?;
        mesh.validate(path)?;
        Ok(mesh)
    }

    /// Upload validated mesh data.
    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle;

    /// Load and upload a texture.
    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, ResourceError>;
}

/// GPU-resident mesh geometry with vertex and index buffers.
#[derive(Debug)]
pub struct GpuMesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, mesh: &MeshData) -> Self {
        use wgpu::util::DeviceExt;

        let vertices = mesh.vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

struct GpuTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

/// The wgpu-backed [`ResourceLoader`].
///
/// Effects and textures are cached by path, so objects sharing a texture share
/// one upload. Meshes are uploaded once per call.
pub struct GpuResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    layouts: EffectLayouts,
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    pipelines: Vec<wgpu::RenderPipeline>,
    texture_cache: HashMap<String, TextureHandle>,
    effect_cache: HashMap<String, EffectHandle>,
}

impl GpuResources {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            device: gpu.device.clone(),
            queue: gpu.queue.clone(),
            color_format: gpu.config.format,
            layouts: EffectLayouts::new(&gpu.device),
            meshes: Vec::new(),
            textures: Vec::new(),
            pipelines: Vec::new(),
            texture_cache: HashMap::new(),
            effect_cache: HashMap::new(),
        }
    }

    pub fn layouts(&self) -> &EffectLayouts {
        &self.layouts
    }

    pub(crate) fn mesh(&self, handle: MeshHandle) -> Option<&GpuMesh> {
        self.meshes.get(handle.index())
    }

    pub(crate) fn texture_bind_group(&self, handle: TextureHandle) -> Option<&wgpu::BindGroup> {
        self.textures.get(handle.index()).map(|t| &t.bind_group)
    }

    pub(crate) fn pipeline(&self, handle: EffectHandle) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(handle.index())
    }

    /// Upload decoded texture data and bind it for the effect layouts.
    pub fn upload_texture(
        &mut self,
        data: &TextureData,
        label: &str,
    ) -> Result<TextureHandle, ResourceError> {
        data.check_size(label, self.device.limits().max_texture_dimension_2d)?;
        let texture = Texture::from_data(&self.device, &self.queue, data, label);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.layouts.material,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        let handle = TextureHandle::from_index(self.textures.len());
        self.textures.push(GpuTexture {
            texture,
            bind_group,
        });
        Ok(handle)
    }
}

impl ResourceLoader for GpuResources {
    fn load_effect(&mut self, path: &str) -> Result<EffectHandle, ShaderError> {
        if let Some(&handle) = self.effect_cache.get(path) {
            debug!(effect = path, "effect cache hit");
            return Ok(handle);
        }

        let effect = Effect::load(path)?;
        let pipeline = effect.create_pipeline(&self.device, &self.layouts, self.color_format)?;

        let handle = EffectHandle::from_index(self.pipelines.len());
        self.pipelines.push(pipeline);
        self.effect_cache.insert(path.to_string(), handle);
        info!(effect = path, "effect loaded");
        Ok(handle)
    }

    fn upload_mesh(&mut self, mesh: &MeshData) -> MeshHandle {
        let handle = MeshHandle::from_index(self.meshes.len());
        self.meshes.push(GpuMesh::new(&self.device, mesh));
        debug!(
            vertices = mesh.vertex_count(),
            indices = mesh.index_count(),
            "mesh uploaded"
        );
        handle
    }

    fn load_texture(&mut self, path: &str) -> Result<TextureHandle, ResourceError> {
        if let Some(&handle) = self.texture_cache.get(path) {
            debug!(texture = path, "texture cache hit");
            return Ok(handle);
        }

        let data = TextureData::load(path)?;
        let handle = self.upload_texture(&data, path)?;
        self.texture_cache.insert(path.to_string(), handle);
        info!(texture = path, width = data.width, height = data.height, "texture loaded");
        Ok(handle)
    }
}
