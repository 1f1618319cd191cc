//! Texture decoding and upload.
//!
//! [`TextureData`] is the decoded RGBA image and needs no GPU. [`Texture`] is the
//! uploaded version with a view and sampler ready to bind.

use crate::error::ResourceError;

/// Magenta and black checkerboard shown when an object has no texture.
pub const BUILTIN_MISSING: &str = "builtin:missing";
/// A single white texel.
pub const BUILTIN_WHITE: &str = "builtin:white";
/// Procedural grey floor tiles.
pub const BUILTIN_TILES: &str = "builtin:tiles";

/// Decoded 8-bit RGBA pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    /// Row-major, four bytes per texel.
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Load a texture by resource key: a built-in key or an image file path.
    pub fn load(path: &str) -> Result<Self, ResourceError> {
        match path {
            BUILTIN_MISSING => return Ok(Self::missing()),
            BUILTIN_WHITE => return Ok(Self::white()),
            BUILTIN_TILES => return Ok(Self::tiles(64, 7)),
            _ => {}
        }

        let img = image::open(path)
            .map_err(|source| ResourceError::Image {
                path: path.to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    /// Check that both sides fit in `1..=max_dimension` so the upload can't
    /// trip device validation.
    pub fn check_size(&self, path: &str, max_dimension: u32) -> Result<(), ResourceError> {
        let fits = |side: u32| (1..=max_dimension).contains(&side);
        if fits(self.width) && fits(self.height) {
            Ok(())
        } else {
            Err(ResourceError::TextureSize {
                path: path.to_string(),
                width: self.width,
                height: self.height,
                max: max_dimension,
            })
        }
    }

    /// Decode an image from memory. The format is guessed from the content.
    pub fn from_bytes(label: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let img = image::load_from_memory(bytes)
            .map_err(|source| ResourceError::Image {
                path: label.to_string(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            width,
            height,
            rgba: img.into_raw(),
        })
    }

    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255, 255, 255, 255],
        }
    }

    /// 64x64 checkerboard of 8x8 magenta and black cells.
    pub fn missing() -> Self {
        const SIZE: u32 = 64;
        const CELL: u32 = 8;

        let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
        for y in 0..SIZE {
            for x in 0..SIZE {
                let magenta = ((x / CELL) + (y / CELL)) % 2 == 0;
                if magenta {
                    rgba.extend_from_slice(&[255, 0, 255, 255]);
                } else {
                    rgba.extend_from_slice(&[0, 0, 0, 255]);
                }
            }
        }

        Self {
            width: SIZE,
            height: SIZE,
            rgba,
        }
    }

    /// Grey stone tiles with dark grout lines.
    pub fn tiles(size: u32, seed: u32) -> Self {
        const TILE: u32 = 16;
        let grays: &[u8] = &[150, 140, 128, 120, 135, 110];

        let mut rgba = vec![0u8; (size * size * 4) as usize];
        for y in 0..size {
            for x in 0..size {
                let idx = ((y * size + x) * 4) as usize;

                let tile_hash = hash(x / TILE, y / TILE, seed);
                let base = grays[(tile_hash % grays.len() as u32) as usize] as i32;
                let variation = (hash(x, y, seed + 12345) % 12) as i32 - 6;
                let grout = x % TILE == 0 || y % TILE == 0;
                let value = if grout { 60 } else { base + variation };

                let v = value.clamp(0, 255) as u8;
                rgba[idx..idx + 4].copy_from_slice(&[v, v, v, 255]);
            }
        }

        Self {
            width: size,
            height: size,
            rgba,
        }
    }
}

/// Simple hash function for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

/// A GPU texture that can be bound to shaders.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Upload decoded RGBA data.
    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        label: &str,
    ) -> Self {
        use wgpu::util::DeviceExt;

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width: data.width,
            height: data.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_is_a_checkerboard() {
        let data = TextureData::load(BUILTIN_MISSING).unwrap();
        assert_eq!((data.width, data.height), (64, 64));
        assert_eq!(data.rgba.len(), 64 * 64 * 4);
        assert_eq!(&data.rgba[0..4], &[255, 0, 255, 255]);

        // First texel of the second cell on the top row.
        let idx = 8 * 4;
        assert_eq!(&data.rgba[idx..idx + 4], &[0, 0, 0, 255]);
    }

    #[test]
    fn tiles_are_deterministic_and_opaque() {
        let a = TextureData::tiles(32, 3);
        let b = TextureData::tiles(32, 3);
        assert_eq!(a, b);
        assert!(a.rgba.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn decodes_png_from_memory() {
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([10, 20, 30, 255]));
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let data = TextureData::from_bytes("mem.png", &png).unwrap();
        assert_eq!((data.width, data.height), (2, 3));
        assert_eq!(&data.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn size_check_follows_the_device_limit() {
        let data = TextureData {
            width: 4096,
            height: 16,
            rgba: Vec::new(),
        };
        assert!(data.check_size("big.png", 4096).is_ok());

        let err = data.check_size("big.png", 2048).unwrap_err();
        assert!(matches!(
            err,
            ResourceError::TextureSize {
                width: 4096,
                max: 2048,
                ..
            }
        ));

        let empty = TextureData {
            width: 0,
            height: 1,
            rgba: Vec::new(),
        };
        assert!(empty.check_size("empty.png", 2048).is_err());
    }

    #[test]
    fn missing_file_is_image_error() {
        let err = TextureData::load("Content/Textures/nope.jpg").unwrap_err();
        assert!(matches!(err, ResourceError::Image { .. }));
    }
}
