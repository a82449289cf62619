//! GPU textures for model materials.
//!
//! Every [`Texture`] is an RGBA8 image with a repeating linear sampler,
//! whether it was decoded from a file or filled with a solid colour.
//! [`MaterialTextures`] groups the diffuse and normal map of one material.

use anyhow::*;
use image::{GenericImageView, ImageFormat};

/// A GPU texture with a view and optional sampler.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Create a `width` x `height` texture filled with one RGBA colour.
    pub fn create_solid_color(
        rgba: [u8; 4],
        width: u32,
        height: u32,
        label: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Texture {
        let texels: Vec<u8> = rgba
            .iter()
            .cycle()
            .take(width as usize * height as usize * 4)
            .copied()
            .collect();
        Self::from_rgba8(
            device,
            queue,
            &texels,
            (width, height),
            wgpu::TextureFormat::Rgba8Unorm,
            Some(label),
        )
    }

    /// Plain white, standing in for a missing diffuse texture.
    pub fn create_default_diffuse(device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        Self::create_solid_color([255, 255, 255, 255], 1, 1, "default diffuse", device, queue)
    }

    /// Neutral blue, representing no deformation.
    pub fn create_default_normal_map(
        width: u32,
        height: u32,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Texture {
        Self::create_solid_color([127, 127, 255, 255], width, height, "default normal map", device, queue)
    }

    /// Decode an image file and upload it.
    ///
    /// `format` is a file extension hint such as `"png"`; without it the
    /// format is guessed from the bytes. Normal maps are stored linear,
    /// everything else as sRGB.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        format: Option<&str>,
        is_normal_map: bool,
    ) -> Result<Self> {
        let format = format
            .map(|extension| {
                ImageFormat::from_extension(extension)
                    .with_context(|| format!("Unknown image format {extension} for {label}"))
            })
            .transpose()?;
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format),
            None => image::load_from_memory(bytes),
        }
        .with_context(|| format!("Failed to decode texture {label}"))?;
        Self::from_image(device, queue, &decoded, Some(label), is_normal_map)
    }

    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        img: &image::DynamicImage,
        label: Option<&str>,
        is_normal_map: bool,
    ) -> Result<Self> {
        let (width, height) = img.dimensions();
        ensure!(
            width > 0 && height > 0,
            "Texture {} has no texels",
            label.unwrap_or("<unnamed>")
        );
        let format = if is_normal_map {
            wgpu::TextureFormat::Rgba8Unorm
        } else {
            wgpu::TextureFormat::Rgba8UnormSrgb
        };
        Ok(Self::from_rgba8(device, queue, &img.to_rgba8(), (width, height), format, label))
    }

    /// Upload tightly packed RGBA8 texels as a single-mip 2D texture.
    fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[u8],
        (width, height): (u32, u32),
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            texture.as_image_copy(),
            texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            sampler: Some(create_default_sampler(device)),
            texture,
        }
    }
}

/// Diffuse and normal textures of one material.
#[derive(Clone, Debug)]
pub struct MaterialTextures {
    pub diffuse: Texture,
    pub normal: Texture,
}

impl MaterialTextures {
    /// Free the GPU memory of both textures right away instead of waiting
    /// for the last handle to drop.
    pub fn destroy(self) {
        self.diffuse.texture.destroy();
        self.normal.texture.destroy();
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("material sampler"),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
