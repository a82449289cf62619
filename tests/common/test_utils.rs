use std::cell::{Cell, RefCell};

use mesh_ngin::{
    data_structures::model::{AttributeKind, Material, Mesh, ModelData},
    gpu::{BufferUsage, GpuBackend},
    resources::PlaneVertex,
};

/// A buffer creation call as seen by the backend.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Upload {
    pub(crate) id: u32,
    pub(crate) label: String,
    pub(crate) usage: BufferUsage,
    pub(crate) element_count: u32,
    pub(crate) element_stride: u32,
    pub(crate) contents: Vec<u8>,
}

/// Backend that hands out numbered buffers and remembers every call.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    next_id: Cell<u32>,
    uploads: RefCell<Vec<Upload>>,
    destroyed: RefCell<Vec<u32>>,
    loaded_textures: RefCell<Vec<String>>,
    released_textures: RefCell<Vec<String>>,
    fail_on: Option<String>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail every creation of a buffer with the given label.
    pub(crate) fn failing_on(label: &str) -> Self {
        Self {
            fail_on: Some(label.to_string()),
            ..Default::default()
        }
    }

    pub(crate) fn uploads(&self) -> Vec<Upload> {
        self.uploads.borrow().clone()
    }

    pub(crate) fn upload(&self, label: &str) -> Option<Upload> {
        self.uploads
            .borrow()
            .iter()
            .rev()
            .find(|upload| upload.label == label)
            .cloned()
    }

    pub(crate) fn destroyed(&self) -> Vec<u32> {
        self.destroyed.borrow().clone()
    }

    pub(crate) fn live_buffers(&self) -> Vec<u32> {
        let destroyed = self.destroyed.borrow();
        self.uploads
            .borrow()
            .iter()
            .map(|upload| upload.id)
            .filter(|id| !destroyed.contains(id))
            .collect()
    }

    pub(crate) fn loaded_textures(&self) -> Vec<String> {
        self.loaded_textures.borrow().clone()
    }

    pub(crate) fn released_textures(&self) -> Vec<String> {
        self.released_textures.borrow().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.uploads.borrow().len()
            + self.destroyed.borrow().len()
            + self.loaded_textures.borrow().len()
            + self.released_textures.borrow().len()
    }
}

impl GpuBackend for RecordingBackend {
    type Buffer = u32;
    type Texture = String;

    fn create_buffer(
        &self,
        label: &str,
        usage: BufferUsage,
        element_count: u32,
        element_stride: u32,
        contents: Vec<u8>,
    ) -> anyhow::Result<u32> {
        if self.fail_on.as_deref() == Some(label) {
            anyhow::bail!("{label}: out of device memory");
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.uploads.borrow_mut().push(Upload {
            id,
            label: label.to_string(),
            usage,
            element_count,
            element_stride,
            contents,
        });
        Ok(id)
    }

    fn destroy_buffer(&self, buffer: u32) {
        self.destroyed.borrow_mut().push(buffer);
    }

    fn load_texture(&self, material: &Material) -> anyhow::Result<String> {
        self.loaded_textures.borrow_mut().push(material.name.clone());
        Ok(material.name.clone())
    }

    fn release_texture(&self, texture: String) {
        self.released_textures.borrow_mut().push(texture);
    }
}

pub(crate) fn position_bytes(positions: &[[f32; 3]]) -> Vec<u8> {
    bytemuck::cast_slice(positions).to_vec()
}

pub(crate) fn read_indices(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

pub(crate) fn read_plane_vertices(bytes: &[u8], stride: usize) -> Vec<PlaneVertex> {
    bytes
        .chunks_exact(stride)
        .map(|record| bytemuck::pod_read_unaligned(&record[..PlaneVertex::STRIDE]))
        .collect()
}

/// Position-only mesh over `vertex_count` records starting at record
/// `first_vertex` of a 12 byte stride stream.
pub(crate) fn position_mesh(first_vertex: u32, vertex_count: u32) -> Mesh {
    Mesh {
        vertex_count,
        vertex_stride: 12,
        vertex_data_byte_offset: first_vertex * 12,
        ..Default::default()
    }
    .with_attribute(AttributeKind::Position, 0)
}

/// Two meshes whose boxes are `{(-1,0,-1),(1,2,1)}` and `{(0,-5,0),(3,3,3)}`.
pub(crate) fn two_mesh_data() -> ModelData {
    let positions = [
        [-1.0, 0.0, -1.0],
        [1.0, 2.0, 1.0],
        [0.5, 1.0, 0.0],
        [0.0, -5.0, 0.0],
        [3.0, 3.0, 3.0],
    ];
    ModelData {
        meshes: vec![position_mesh(0, 3), position_mesh(3, 2)],
        materials: vec![Material::new("rock")],
        vertex_stride: 12,
        vertex_data: position_bytes(&positions),
        index_data: Vec::new(),
        depth: None,
    }
}
