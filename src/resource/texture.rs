//! Decoded texture images and their GPU counterparts.

use crate::color::Color;
use crate::context::Context;
use crate::error::AssetError;
use image::GenericImageView;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Wrapping parameters for a texture.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Default)]
pub enum TextureWrapping {
    /// Repeats the texture when a texture coordinate is out of bounds.
    Repeat,
    /// Repeats the mirrored texture when a texture coordinate is out of bounds.
    MirroredRepeat,
    /// Repeats the nearest edge point texture color when a texture coordinate is out of bounds.
    #[default]
    ClampToEdge,
}

impl From<TextureWrapping> for wgpu::AddressMode {
    #[inline]
    fn from(val: TextureWrapping) -> Self {
        match val {
            TextureWrapping::Repeat => wgpu::AddressMode::Repeat,
            TextureWrapping::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
            TextureWrapping::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Sampling filter of a texture.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureFilter {
    /// Bilinear filtering, with trilinear filtering between mipmaps.
    #[default]
    Linear,
    /// Nearest-texel sampling, without mipmaps.
    Nearest,
}

/// How the texels of an image are interpreted by the shader.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ColorSpace {
    /// Color data, decoded from sRGB when sampled.
    Srgb,
    /// Non-color data (normals, roughness, occlusion…), sampled as is.
    Linear,
}

/// A decoded RGBA8 image kept on the CPU.
///
/// Each image gets a process-unique id at creation. The renderer keys its GPU uploads on
/// this id, so sharing an `Arc<TextureImage>` between materials shares the GPU texture too.
#[derive(PartialEq, Eq)]
pub struct TextureImage {
    id: u64,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureImage {
    /// Creates an image from raw RGBA8 pixels.
    ///
    /// Returns an error if `pixels` does not hold exactly `width * height` texels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Arc<Self>, AssetError> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize * 4 {
            return Err(AssetError::Parse(format!(
                "{} bytes cannot hold a {}x{} RGBA image",
                pixels.len(),
                width,
                height
            )));
        }

        Ok(Arc::new(TextureImage {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width,
            height,
            pixels,
        }))
    }

    /// Decodes an encoded image (JPEG, PNG…) fetched from `url`.
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Arc<Self>, AssetError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AssetError::Parse(format!("{}: {}", url, e)))?;
        let (width, height) = image.dimensions();
        Self::from_rgba(width, height, image.to_rgba8().into_raw())
    }

    /// A 1x1 image of a single color.
    pub fn solid(color: Color) -> Arc<Self> {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Arc::new(TextureImage {
            id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
            width: 1,
            height: 1,
            pixels: vec![to_byte(color.r), to_byte(color.g), to_byte(color.b), to_byte(color.a)],
        })
    }

    /// The process-unique id of this image.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Image dimensions (width, height).
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The RGBA8 texels, row by row.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The mean color of all texels.
    pub fn average_color(&self) -> Color {
        let mut sum = [0u64; 4];
        for texel in self.pixels.chunks_exact(4) {
            for (s, v) in sum.iter_mut().zip(texel) {
                *s += *v as u64;
            }
        }

        let n = (self.pixels.len() / 4).max(1) as f32 * 255.0;
        Color::new(
            sum[0] as f32 / n,
            sum[1] as f32 / n,
            sum[2] as f32 / n,
            sum[3] as f32 / n,
        )
    }
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// A GPU texture with its view and sampler.
pub struct Texture {
    /// The underlying wgpu texture.
    pub texture: wgpu::Texture,
    /// The texture view for binding.
    pub view: wgpu::TextureView,
    /// The sampler for the texture.
    pub sampler: wgpu::Sampler,
    /// Texture dimensions (width, height).
    pub size: (u32, u32),
}

impl Texture {
    /// Uploads an image to the GPU.
    pub fn new(
        image: &TextureImage,
        color_space: ColorSpace,
        wrapping: TextureWrapping,
        filter: TextureFilter,
        generate_mipmaps: bool,
    ) -> Arc<Texture> {
        let ctxt = Context::get();
        let (width, height) = image.size();
        let generate_mipmaps = generate_mipmaps && filter == TextureFilter::Linear;

        let mip_level_count = if generate_mipmaps {
            (width.max(height) as f32).log2().floor() as u32 + 1
        } else {
            1
        };

        let format = match color_space {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        };

        let texture = ctxt.create_texture(&wgpu::TextureDescriptor {
            label: Some("texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let mut level_data = image.pixels().to_vec();
        let (mut level_width, mut level_height) = (width, height);

        for mip_level in 0..mip_level_count {
            if mip_level > 0 {
                level_data = downsample_rgba(&level_data, level_width, level_height);
                level_width = (level_width / 2).max(1);
                level_height = (level_height / 2).max(1);
            }

            ctxt.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level_data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level_width * 4),
                    rows_per_image: Some(level_height),
                },
                wgpu::Extent3d {
                    width: level_width,
                    height: level_height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let address_mode = wrapping.into();
        let filter_mode = match filter {
            TextureFilter::Linear => wgpu::FilterMode::Linear,
            TextureFilter::Nearest => wgpu::FilterMode::Nearest,
        };

        let sampler = ctxt.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter_mode,
            min_filter: filter_mode,
            mipmap_filter: if generate_mipmaps {
                wgpu::FilterMode::Linear
            } else {
                wgpu::FilterMode::Nearest
            },
            ..Default::default()
        });

        Arc::new(Texture {
            texture,
            view,
            sampler,
            size: (width, height),
        })
    }
}

/// Downsamples an RGBA image by half using box filtering.
pub(crate) fn downsample_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let new_width = (width / 2).max(1);
    let new_height = (height / 2).max(1);
    let mut new_data = vec![0u8; (new_width * new_height * 4) as usize];

    for y in 0..new_height {
        for x in 0..new_width {
            let mut sum = [0u32; 4];
            let mut count = 0u32;

            // Sample the 2x2 block, or fewer texels at the edges.
            for sy in (y * 2)..(y * 2 + 2).min(height) {
                for sx in (x * 2)..(x * 2 + 2).min(width) {
                    let idx = ((sy * width + sx) * 4) as usize;
                    for (s, v) in sum.iter_mut().zip(&data[idx..idx + 4]) {
                        *s += *v as u32;
                    }
                    count += 1;
                }
            }

            let dst_idx = ((y * new_width + x) * 4) as usize;
            for (d, s) in new_data[dst_idx..dst_idx + 4].iter_mut().zip(sum) {
                *d = (s / count) as u8;
            }
        }
    }

    new_data
}

#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
struct UploadKey {
    image: u64,
    color_space: ColorSpace,
    wrapping: TextureWrapping,
    filter: TextureFilter,
    mipmaps: bool,
}

/// GPU uploads of [`TextureImage`]s, keyed by image id and sampling parameters.
///
/// Uploads not used during a frame are released by [`GpuTextureCache::end_frame`], so
/// textures of a replaced appearance set do not outlive the swap.
#[derive(Default)]
pub struct GpuTextureCache {
    uploads: HashMap<UploadKey, Arc<Texture>>,
    used: HashSet<UploadKey>,
}

impl GpuTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the GPU texture of `image`, uploading it on first use.
    pub fn get_or_upload(
        &mut self,
        image: &TextureImage,
        color_space: ColorSpace,
        wrapping: TextureWrapping,
        filter: TextureFilter,
        mipmaps: bool,
    ) -> Arc<Texture> {
        let key = UploadKey {
            image: image.id(),
            color_space,
            wrapping,
            filter,
            mipmaps,
        };

        let _ = self.used.insert(key);
        self.uploads
            .entry(key)
            .or_insert_with(|| Texture::new(image, color_space, wrapping, filter, mipmaps))
            .clone()
    }

    /// Drops the uploads that were not requested since the previous call.
    pub fn end_frame(&mut self) {
        let used = std::mem::take(&mut self.used);
        self.uploads.retain(|key, _| used.contains(key));
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_png() {
        let image = TextureImage::decode("a.png", &png_bytes(4, 2)).unwrap();
        assert_eq!(image.size(), (4, 2));
        assert_eq!(&image.pixels()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decode_garbage_is_a_parse_error() {
        let result = TextureImage::decode("a.jpg", b"definitely not an image");
        assert!(matches!(result, Err(AssetError::Parse(msg)) if msg.starts_with("a.jpg")));
    }

    #[test]
    fn images_get_distinct_ids() {
        let a = TextureImage::solid(crate::color::WHITE);
        let b = TextureImage::solid(crate::color::WHITE);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.pixels(), &[255, 255, 255, 255]);
    }

    #[test]
    fn average_of_two_texels() {
        let image = TextureImage::from_rgba(2, 1, vec![0, 0, 255, 255, 255, 0, 255, 255]).unwrap();
        let avg = image.average_color();
        assert!((avg.r - 0.5).abs() < 1.0e-2);
        assert_eq!((avg.g, avg.b, avg.a), (0.0, 1.0, 1.0));
    }

    #[test]
    fn rgba_size_mismatch_is_rejected() {
        assert!(TextureImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(TextureImage::from_rgba(0, 2, vec![]).is_err());
    }

    #[test]
    fn downsample_averages_blocks() {
        #[rustfmt::skip]
        let data = [
            0, 0, 0, 0,      100, 100, 100, 100,
            200, 200, 200, 200, 100, 100, 100, 100,
        ];
        assert_eq!(downsample_rgba(&data, 2, 2), vec![100, 100, 100, 100]);
    }

    #[test]
    fn downsample_odd_edges() {
        let data = [30u8; 3 * 4];
        assert_eq!(downsample_rgba(&data, 3, 1), vec![30; 4]);
    }
}
