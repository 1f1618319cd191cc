//! Effects: WGSL shaders checked against the interface scene objects draw with.
//!
//! Every effect must provide:
//!
//! - a `vs_main` vertex entry point taking a `vec4<f32>` position at
//!   `@location(0)` and, optionally, a `vec2<f32>` texture coordinate at
//!   `@location(1)` (see [`TexturedVertex`])
//! - a `fs_main` fragment entry point
//! - `world_view_projection` at `@group(0) @binding(0)`
//! - `color_texture` at `@group(1) @binding(0)` and `color_sampler` at
//!   `@group(1) @binding(1)`
//!
//! The checks run on the CPU with naga, so a broken effect is reported with a
//! readable diagnostic before any pipeline is created.

use std::num::NonZeroU64;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{Binding, Module, ResourceBinding, ScalarKind, ShaderStage, TypeInner, VectorSize};
use tracing::debug;

use crate::error::ShaderError;
use crate::geometry::TexturedVertex;

/// Key of the built-in texture mapping effect.
pub const BUILTIN_TEXTURE_MAPPING: &str = "builtin:texture_mapping";

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// `(name, group, binding)` of every global an effect must declare.
pub const REQUIRED_VARIABLES: [(&str, u32, u32); 3] = [
    ("world_view_projection", 0, 0),
    ("color_texture", 1, 0),
    ("color_sampler", 1, 1),
];

const TEXTURE_MAPPING_WGSL: &str = include_str!("shaders/texture_mapping.wgsl");

/// A parsed and validated effect.
#[derive(Debug, Clone)]
pub struct Effect {
    path: String,
    source: String,
}

impl Effect {
    /// Load an effect by resource key: the built-in key or a `.wgsl` file path.
    pub fn load(path: &str) -> Result<Self, ShaderError> {
        if path == BUILTIN_TEXTURE_MAPPING {
            return Self::from_wgsl(path, TEXTURE_MAPPING_WGSL);
        }

        let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_wgsl(path, &source)
    }

    /// Parse, validate and check WGSL source. `path` is only used in errors.
    pub fn from_wgsl(path: &str, source: &str) -> Result<Self, ShaderError> {
        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compile {
            path: path.to_string(),
            message: e.emit_to_string(source),
        })?;

        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .map_err(|e| ShaderError::Validation {
                path: path.to_string(),
                message: e.into_inner().to_string(),
            })?;

        check_entry_points(path, &module)?;
        check_variables(path, &module)?;
        check_vertex_inputs(path, &module)?;

        debug!(effect = path, "effect validated");

        Ok(Self {
            path: path.to_string(),
            source: source.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Build the render pipeline for this effect.
    ///
    /// Device validation errors are captured with an error scope and returned
    /// as [`ShaderError::Pipeline`].
    pub fn create_pipeline(
        &self,
        device: &wgpu::Device,
        layouts: &EffectLayouts,
        color_format: wgpu::TextureFormat,
    ) -> Result<wgpu::RenderPipeline, ShaderError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&self.path),
            source: wgpu::ShaderSource::Wgsl(self.source.as_str().into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&self.path),
            layout: Some(&layouts.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[TexturedVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Loaded models do not agree on a winding order.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => Err(ShaderError::Pipeline {
                path: self.path.clone(),
                message: error.to_string(),
            }),
            None => Ok(pipeline),
        }
    }
}

/// Depth buffer format every effect pipeline is built against.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Size of one world-view-projection matrix in the uniform buffer.
pub const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

/// Bind group layouts shared by every effect pipeline.
///
/// - **Group 0**: the world-view-projection matrix, bound with a dynamic offset
///   so every draw gets its own slot
/// - **Group 1**: color texture and sampler
pub struct EffectLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub material: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

impl EffectLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("World View Projection Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Color Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Effect Pipeline Layout"),
            bind_group_layouts: &[&frame, &material],
            push_constant_ranges: &[],
        });

        Self {
            frame,
            material,
            pipeline_layout,
        }
    }
}

fn check_entry_points(path: &str, module: &Module) -> Result<(), ShaderError> {
    for (name, stage, stage_name) in [
        (VERTEX_ENTRY, ShaderStage::Vertex, "vertex"),
        (FRAGMENT_ENTRY, ShaderStage::Fragment, "fragment"),
    ] {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.name == name && ep.stage == stage);
        if !found {
            return Err(ShaderError::MissingEntryPoint {
                path: path.to_string(),
                name,
                stage: stage_name,
            });
        }
    }
    Ok(())
}

fn check_variables(path: &str, module: &Module) -> Result<(), ShaderError> {
    for (name, group, binding) in REQUIRED_VARIABLES {
        let found = module.global_variables.iter().any(|(_, var)| {
            var.name.as_deref() == Some(name)
                && var.binding == Some(ResourceBinding { group, binding })
        });
        if !found {
            return Err(ShaderError::MissingVariable {
                path: path.to_string(),
                name,
                group,
                binding,
            });
        }
    }
    Ok(())
}

/// Match the vertex stage inputs against [`TexturedVertex::LAYOUT`].
fn check_vertex_inputs(path: &str, module: &Module) -> Result<(), ShaderError> {
    let layout_error = |message: String| ShaderError::InputLayout {
        path: path.to_string(),
        message,
    };

    // Presence was checked with the entry points.
    let Some(entry) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == VERTEX_ENTRY && ep.stage == ShaderStage::Vertex)
    else {
        return Ok(());
    };

    // Flatten struct arguments into their members.
    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(binding), inner) => inputs.push((binding.clone(), inner.clone())),
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let Some(binding) = &member.binding {
                        inputs.push((binding.clone(), module.types[member.ty].inner.clone()));
                    }
                }
            }
            (None, _) => {}
        }
    }

    let mut has_position = false;
    for (binding, inner) in inputs {
        let Binding::Location { location, .. } = binding else {
            continue;
        };
        let expected = match location {
            0 => VectorSize::Quad,
            1 => VectorSize::Bi,
            other => {
                return Err(layout_error(format!(
                    "unexpected vertex input at @location({other})"
                )));
            }
        };
        match inner {
            TypeInner::Vector { size, scalar }
                if size == expected && scalar.kind == ScalarKind::Float && scalar.width == 4 => {}
            _ => {
                let wanted = if location == 0 { "vec4<f32>" } else { "vec2<f32>" };
                return Err(layout_error(format!(
                    "@location({location}) must be {wanted}"
                )));
            }
        }
        has_position |= location == 0;
    }

    if !has_position {
        return Err(layout_error("no position input at @location(0)".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_with(from: &str, to: &str) -> String {
        assert!(TEXTURE_MAPPING_WGSL.contains(from), "pattern {from:?} not found");
        TEXTURE_MAPPING_WGSL.replace(from, to)
    }

    #[test]
    fn builtin_effect_is_valid() {
        let effect = Effect::load(BUILTIN_TEXTURE_MAPPING).unwrap();
        assert_eq!(effect.path(), BUILTIN_TEXTURE_MAPPING);
    }

    #[test]
    fn syntax_error_is_compile_error() {
        let err = Effect::from_wgsl("broken.wgsl", "fn vs_main( {").unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
    }

    #[test]
    fn type_error_is_validation_error() {
        let source = builtin_with(
            "return textureSample(color_texture, color_sampler, in.uv);",
            "return textureSample(color_texture, color_sampler, in.uv).xyz;",
        );
        let err = Effect::from_wgsl("bad_return.wgsl", &source).unwrap_err();
        assert!(
            matches!(err, ShaderError::Validation { .. } | ShaderError::Compile { .. }),
            "{err}"
        );
    }

    #[test]
    fn renamed_vertex_entry_is_rejected() {
        let source = builtin_with("fn vs_main(", "fn vertex_main(");
        let err = Effect::from_wgsl("renamed.wgsl", &source).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint {
                name: "vs_main",
                ..
            }
        ));
    }

    #[test]
    fn missing_fragment_entry_is_rejected() {
        let source = builtin_with("fn fs_main(", "fn pixel_main(");
        let err = Effect::from_wgsl("renamed.wgsl", &source).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingEntryPoint {
                stage: "fragment",
                ..
            }
        ));
    }

    #[test]
    fn misplaced_variable_is_rejected() {
        let source = builtin_with(
            "@group(1) @binding(0)\nvar color_texture",
            "@group(2) @binding(0)\nvar color_texture",
        );
        let err = Effect::from_wgsl("moved.wgsl", &source).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingVariable {
                name: "color_texture",
                group: 1,
                binding: 0,
                ..
            }
        ));
    }

    #[test]
    fn wrong_position_type_is_rejected() {
        let source = builtin_with(
            "@location(0) position: vec4<f32>",
            "@location(0) position: vec3<f32>",
        )
        .replace("* in.position", "* vec4<f32>(in.position, 1.0)");
        let err = Effect::from_wgsl("vec3.wgsl", &source).unwrap_err();
        assert!(matches!(err, ShaderError::InputLayout { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Effect::load("Content/Effects/nope.wgsl").unwrap_err();
        assert!(matches!(err, ShaderError::Io { .. }));
    }
}
