//! The seam between CPU-side models and a GPU device.
//!
//! [`GpuBackend`] is everything a [`Model`](crate::data_structures::model::Model)
//! needs from the outside world: creating and destroying buffers from staged
//! bytes, and loading and releasing the textures of its materials. The wgpu
//! implementation lives on [`Context`](crate::context::Context).

use std::sync::Arc;

use crate::data_structures::model::Material;

/// What a GPU buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index,
}

pub trait GpuBackend {
    type Buffer;
    type Texture;

    /// Create a buffer holding the first `element_count * element_stride`
    /// bytes of `contents`. The staging bytes are consumed.
    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<Self::Buffer>;

    fn destroy_buffer(&self, buffer: Self::Buffer);

    fn load_texture(&self, material: &Material) -> anyhow::Result<Self::Texture>;

    fn release_texture(&self, texture: Self::Texture);
}

impl<T: GpuBackend + ?Sized> GpuBackend for &T {
    type Buffer = T::Buffer;
    type Texture = T::Texture;

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<Self::Buffer> {
        (**self).create_buffer(label, usage, element_count, element_stride, contents)
    }

    fn destroy_buffer(&self, buffer: Self::Buffer) {
        (**self).destroy_buffer(buffer)
    }

    fn load_texture(&self, material: &Material) -> anyhow::Result<Self::Texture> {
        (**self).load_texture(material)
    }

    fn release_texture(&self, texture: Self::Texture) {
        (**self).release_texture(texture)
    }
}

impl<T: GpuBackend + ?Sized> GpuBackend for Arc<T> {
    type Buffer = T::Buffer;
    type Texture = T::Texture;

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<Self::Buffer> {
        (**self).create_buffer(label, usage, element_count, element_stride, contents)
    }

    fn destroy_buffer(&self, buffer: Self::Buffer) {
        (**self).destroy_buffer(buffer)
    }

    fn load_texture(&self, material: &Material) -> anyhow::Result<Self::Texture> {
        (**self).load_texture(material)
    }

    fn release_texture(&self, texture: Self::Texture) {
        (**self).release_texture(texture)
    }
}

/// An owned, possibly empty, GPU buffer handle with its element layout.
#[derive(Debug)]
pub struct GpuBuffer<H> {
    handle: Option<H>,
    element_count: u32,
    element_stride: u32,
}

impl<H> GpuBuffer<H> {
    pub fn empty() -> Self {
        Self {
            handle: None,
            element_count: 0,
            element_stride: 0,
        }
    }

    /// Upload `contents` through `backend`, taking ownership of the bytes.
    pub fn create<B: GpuBackend<Buffer = H>>(
        backend: &B,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<Self> {
        let byte_size = element_count as usize * element_stride as usize;
        anyhow::ensure!(
            contents.len() >= byte_size,
            "{label}: {} staged bytes cannot hold {element_count} elements of {element_stride} bytes",
            contents.len()
        );
        let handle = backend.create_buffer(label, usage, element_count, element_stride, contents)?;
        log::debug!("created {label} with {element_count} elements of {element_stride} bytes");
        Ok(Self {
            handle: Some(handle),
            element_count,
            element_stride,
        })
    }

    /// Hand the handle back to `backend`. Destroying an empty buffer does
    /// nothing.
    pub fn destroy<B: GpuBackend<Buffer = H>>(&mut self, backend: &B) {
        if let Some(handle) = self.handle.take() {
            backend.destroy_buffer(handle);
        }
        self.element_count = 0;
        self.element_stride = 0;
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn element_stride(&self) -> u32 {
        self.element_stride
    }

    pub fn byte_size(&self) -> u64 {
        self.element_count as u64 * self.element_stride as u64
    }
}

impl<H> Default for GpuBuffer<H> {
    fn default() -> Self {
        Self::empty()
    }
}
