use anyhow::Context as _;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{model::Material, texture::MaterialTextures},
    gpu::{BufferUsage, GpuBackend},
    resources,
};

/// The wgpu device and queue that model buffers and textures are created on.
///
/// A context doesn't need a window: [`Context::new_headless`] requests an
/// adapter without a surface, and [`Context::from_parts`] wraps a device
/// owned by a renderer.
#[derive(Debug, Clone)]
pub struct Context {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl Context {
    pub fn from_parts(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    pub async fn new_headless() -> anyhow::Result<Self> {
        let mut descriptor = wgpu::InstanceDescriptor::new_without_display_handle();
        // PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        descriptor.backends = if cfg!(target_arch = "wasm32") {
            wgpu::Backends::GL
        } else {
            wgpu::Backends::PRIMARY
        };
        let instance = wgpu::Instance::new(descriptor);

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable GPU adapter found")?;
        log::debug!("using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("mesh-ngin device"),
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Failed to create a GPU device")?;

        Ok(Self { device, queue })
    }
}

impl GpuBackend for Context {
    type Buffer = wgpu::Buffer;
    type Texture = MaterialTextures;

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<wgpu::Buffer> {
        let size = element_count as u64 * element_stride as u64;
        let limit = self.device.limits().max_buffer_size;
        anyhow::ensure!(
            size <= limit,
            "{label} of {size} bytes exceeds the device limit of {limit} bytes"
        );
        let usage = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        };
        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: &contents[..size as usize],
            usage,
        }))
    }

    fn destroy_buffer(&self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn load_texture(&self, material: &Material) -> anyhow::Result<MaterialTextures> {
        resources::load_material_textures(material, &self.device, &self.queue)
    }

    fn release_texture(&self, texture: MaterialTextures) {
        texture.destroy();
    }
}
