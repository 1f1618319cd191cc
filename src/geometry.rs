//! Mesh loading for scene objects.
//!
//! Meshes come from files on disk or from a small set of built-in shapes
//! addressed by key:
//!
//! | Source | Keys / Extensions | Notes |
//! |--------|-------------------|-------|
//! | Wavefront OBJ | `.obj` | Triangulated, all models merged, materials ignored |
//! | STL | `.stl` | Binary and ASCII, no texture coordinates |
//! | Built-in | `builtin:cube`, `builtin:plane` | Spans -1 to 1 on each used axis |
//!
//! Anything else is reported as [`ResourceError::UnknownFormat`].
//!
//! # Example
//!
//! ```
//! use telliverse::MeshData;
//!
//! let cube = MeshData::load("builtin:cube").unwrap();
//! let bounds = cube.bounds().unwrap();
//! assert_eq!(bounds.extents, telliverse::Vec3::ONE);
//! ```

use std::io::{BufReader, Cursor};
use std::path::Path;

use glam::{Vec2, Vec3};

use crate::bounds::BoundingBox;
use crate::error::ResourceError;

/// Key of the built-in unit cube.
pub const BUILTIN_CUBE: &str = "builtin:cube";
/// Key of the built-in quad in the XY plane.
pub const BUILTIN_PLANE: &str = "builtin:plane";

/// The vertex format every effect consumes.
///
/// # Memory Layout
///
/// | Attribute | Format    | Offset | Shader Location |
/// |-----------|-----------|--------|-----------------|
/// | position  | Float32x4 | 0      | 0               |
/// | uv        | Float32x2 | 16     | 1               |
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    /// Homogeneous model-space position, `w` is always 1.
    pub position: [f32; 4],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TexturedVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x4,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            uv: uv.to_array(),
        }
    }
}

/// Mesh data in model space, before upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Local-space vertex positions.
    pub positions: Vec<Vec3>,
    /// One per position, or empty when the source has none.
    pub tex_coords: Vec<Vec2>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(positions: Vec<Vec3>, tex_coords: Vec<Vec2>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            tex_coords,
            indices,
        }
    }

    /// Load a mesh by resource key.
    ///
    /// Built-in keys are resolved first; anything else is treated as a file path
    /// and dispatched on its extension.
    pub fn load(path: &str) -> Result<Self, ResourceError> {
        match path {
            BUILTIN_CUBE => return Ok(Self::cube()),
            BUILTIN_PLANE => return Ok(Self::plane()),
            _ => {}
        }

        let extension = extension_of(path);
        if !matches!(extension.as_str(), "obj" | "stl") {
            return Err(ResourceError::UnknownFormat {
                path: path.to_string(),
                extension,
            });
        }

        let bytes = std::fs::read(path).map_err(|source| ResourceError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_bytes(path, &bytes)
    }

    /// Parse mesh bytes, picking the format from the extension of `path`.
    pub fn from_bytes(path: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let extension = extension_of(path);
        let mesh = match extension.as_str() {
            "obj" => Self::parse_obj(path, bytes)?,
            "stl" => Self::parse_stl(path, bytes)?,
            _ => {
                return Err(ResourceError::UnknownFormat {
                    path: path.to_string(),
                    extension,
                });
            }
        };
        mesh.validate(path)?;
        Ok(mesh)
    }

    /// Check that the mesh can be used by a scene object.
    pub fn validate(&self, path: &str) -> Result<(), ResourceError> {
        if self.positions.is_empty() {
            return Err(ResourceError::EmptyMesh(path.to_string()));
        }
        if !self.tex_coords.is_empty() && self.tex_coords.len() != self.positions.len() {
            return Err(ResourceError::MismatchedTexCoords {
                path: path.to_string(),
                positions: self.positions.len(),
                tex_coords: self.tex_coords.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(ResourceError::Parse {
                path: path.to_string(),
                message: format!(
                    "index {index} out of range for {} vertices",
                    self.positions.len()
                ),
            });
        }
        Ok(())
    }

    /// Bounding box of the local-space positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().copied())
    }

    /// Interleave positions and texture coordinates for upload.
    ///
    /// Missing texture coordinates become `(0, 0)`.
    pub fn vertices(&self) -> Vec<TexturedVertex> {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let uv = self.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO);
                TexturedVertex::new(p, uv)
            })
            .collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// A cube spanning -1 to 1 on every axis, each face mapping the full texture.
    pub fn cube() -> Self {
        // (normal axis, u axis, v axis) per face
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut tex_coords = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push(normal + u * su + v * sv);
                tex_coords.push(Vec2::new((su + 1.0) * 0.5, (1.0 - sv) * 0.5));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(positions, tex_coords, indices)
    }

    /// A quad spanning -1 to 1 in the XY plane, facing +Z.
    pub fn plane() -> Self {
        #[rustfmt::skip]
        let positions = vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new( 1.0, -1.0, 0.0),
            Vec3::new( 1.0,  1.0, 0.0),
            Vec3::new(-1.0,  1.0, 0.0),
        ];
        let tex_coords = vec![
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        Self::new(positions, tex_coords, vec![0, 1, 2, 2, 3, 0])
    }

    fn parse_obj(path: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let mut reader = BufReader::new(Cursor::new(bytes));
        // Materials are not used; texture paths are set per object.
        let (models, _materials) =
            tobj::load_obj_buf(&mut reader, &tobj::GPU_LOAD_OPTIONS, |_| {
                Err(tobj::LoadError::OpenFileFailed)
            })
            .map_err(|e| ResourceError::Parse {
                path: path.to_string(),
                message: format!("OBJ parse error: {e}"),
            })?;

        let mut mesh = Self::default();
        let mut all_have_uvs = true;

        for model in &models {
            let m = &model.mesh;
            let base = mesh.positions.len() as u32;
            let count = m.positions.len() / 3;

            mesh.positions.extend(
                m.positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            );

            if m.texcoords.len() / 2 == count {
                // OBJ puts v = 0 at the bottom; textures are sampled top-down.
                mesh.tex_coords.extend(
                    m.texcoords
                        .chunks_exact(2)
                        .map(|t| Vec2::new(t[0], 1.0 - t[1])),
                );
            } else {
                all_have_uvs = false;
                mesh.tex_coords
                    .extend(std::iter::repeat_n(Vec2::ZERO, count));
            }

            mesh.indices.extend(m.indices.iter().map(|&i| base + i));
        }

        if !all_have_uvs && mesh.tex_coords.iter().all(|&t| t == Vec2::ZERO) {
            mesh.tex_coords.clear();
        }

        Ok(mesh)
    }

    fn parse_stl(path: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let mut cursor = Cursor::new(bytes);
        let stl = stl_io::read_stl(&mut cursor).map_err(|e| ResourceError::Parse {
            path: path.to_string(),
            message: format!("STL parse error: {e}"),
        })?;

        let positions = stl
            .vertices
            .iter()
            .map(|&v| {
                let p: [f32; 3] = v.into();
                Vec3::from(p)
            })
            .collect();

        let indices = stl
            .faces
            .iter()
            .flat_map(|face| face.vertices.iter().map(|&i| i as u32))
            .collect();

        // STL has no texture coordinates.
        Ok(Self::new(positions, Vec::new(), indices))
    }
}

fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}
