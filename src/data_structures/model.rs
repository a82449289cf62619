//! Model geometry: mesh and material descriptors, CPU staging buffers and
//! the GPU buffers created from them.
//!
//! A [`Model`] goes through the same cycle whether its data comes from an
//! asset loader ([`Model::load`]) or from the grid generator
//! ([`Model::generate_water`]):
//!
//! 1. stage descriptors and raw vertex/index bytes on the CPU
//! 2. compute per-mesh and global bounding boxes from the staged vertices
//! 3. move the staged bytes into GPU buffers, leaving the CPU side empty
//! 4. load one set of textures per material
//!
//! [`Model::clear`] undoes all of it and is safe to call at any point.

use anyhow::Context;
use cgmath::Point3;

use crate::{
    data_structures::{
        bounding_box::BoundingBox,
        vertex_view::{AttributeView, Position},
    },
    error::GeometryError,
    gpu::{BufferUsage, GpuBackend, GpuBuffer},
    resources::grid::{GridConfig, INDEX_STRIDE, PlaneVertex, make_plane},
};

/// Semantic of a per-vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    TexCoord0,
    Normal,
    Tangent,
    Bitangent,
}

impl AttributeKind {
    pub const COUNT: usize = 5;
}

/// One drawable range of the model's vertex and index streams.
///
/// Offsets and strides are in bytes. `attrib` maps every [`AttributeKind`]
/// to its offset inside a vertex record, if the mesh has it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub material_index: u32,
    pub vertex_count: u32,
    pub vertex_stride: u32,
    pub vertex_data_byte_offset: u32,
    pub index_count: u32,
    pub index_data_byte_offset: u32,
    pub attrib: [Option<u32>; AttributeKind::COUNT],
    pub bounding_box: BoundingBox,
}

impl Mesh {
    pub fn attribute(&self, kind: AttributeKind) -> Option<u32> {
        self.attrib[kind as usize]
    }

    pub fn with_attribute(mut self, kind: AttributeKind, offset: u32) -> Self {
        self.attrib[kind as usize] = Some(offset);
        self
    }

    /// End of the mesh's vertex bytes, `usize::MAX` if not addressable.
    fn vertex_data_end(&self) -> usize {
        (self.vertex_count as usize)
            .checked_mul(self.vertex_stride as usize)
            .and_then(|size| size.checked_add(self.vertex_data_byte_offset as usize))
            .unwrap_or(usize::MAX)
    }

    /// End of the mesh's index bytes, `usize::MAX` if not addressable.
    fn index_data_end(&self) -> usize {
        (self.index_count as usize)
            .checked_mul(INDEX_STRIDE)
            .and_then(|size| size.checked_add(self.index_data_byte_offset as usize))
            .unwrap_or(usize::MAX)
    }
}

/// Surface description of a mesh. Texture names are resolved by the
/// backend when the model loads its textures.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Material {
    pub name: String,
    pub diffuse_texture: Option<String>,
    pub normal_texture: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_diffuse_texture(mut self, file_name: impl Into<String>) -> Self {
        self.diffuse_texture = Some(file_name.into());
        self
    }

    pub fn with_normal_texture(mut self, file_name: impl Into<String>) -> Self {
        self.normal_texture = Some(file_name.into());
        self
    }
}

/// Counts, stream sizes and global bounds of a model.
///
/// The depth index stream has no size of its own: it always mirrors
/// `index_data_byte_size`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Header {
    pub mesh_count: u32,
    pub material_count: u32,
    pub vertex_data_byte_size: u32,
    pub index_data_byte_size: u32,
    pub vertex_data_byte_size_depth: u32,
    pub bounding_box: BoundingBox,
}

/// Optional position-only stream used by depth passes.
#[derive(Debug, Clone, Default)]
pub struct DepthStream {
    pub vertex_stride: u32,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u8>,
}

/// Everything a loader hands over to populate a [`Model`].
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub vertex_stride: u32,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u8>,
    pub depth: Option<DepthStream>,
}

impl ModelData {
    /// A single water plane mesh with one untextured material.
    pub fn water(config: &GridConfig) -> Result<Self, GeometryError> {
        config.validate()?;
        let vertex_count = config.vertex_count();
        let index_count = config.index_count();

        let mut vertex_data = allocate_staging(PlaneVertex::STRIDE * vertex_count)?;
        let mut index_data = allocate_staging(INDEX_STRIDE * index_count)?;
        make_plane(config, &mut vertex_data, PlaneVertex::STRIDE, &mut index_data)?;

        let mesh = Mesh {
            material_index: 0,
            vertex_count: vertex_count as u32,
            vertex_stride: PlaneVertex::STRIDE as u32,
            vertex_data_byte_offset: 0,
            index_count: index_count as u32,
            index_data_byte_offset: 0,
            ..Default::default()
        }
        .with_attribute(AttributeKind::Position, PlaneVertex::POSITION_OFFSET as u32)
        .with_attribute(AttributeKind::TexCoord0, PlaneVertex::TEX_COORDS_OFFSET as u32);

        Ok(Self {
            meshes: vec![mesh],
            materials: vec![Material::new("water")],
            vertex_stride: PlaneVertex::STRIDE as u32,
            vertex_data,
            index_data,
            depth: None,
        })
    }
}

/// Where a model is in its lifecycle.
///
/// Bounds are not tracked as a state of their own: a populated model may or
/// may not have had [`Model::compute_all_bounding_boxes`] run on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Empty,
    /// Descriptors and CPU staging data are present.
    Populated,
    /// At least one GPU buffer has been created.
    GpuResident,
}

/// Owner of a model's descriptors, staging bytes, GPU buffers and textures.
///
/// Not synchronised: populate, clear and recompute bounds from one thread.
pub struct Model<B: GpuBackend> {
    backend: B,
    header: Header,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    vertex_stride: u32,
    vertex_stride_depth: u32,
    vertex_data: Vec<u8>,
    index_data: Vec<u8>,
    vertex_data_depth: Vec<u8>,
    index_data_depth: Vec<u8>,
    vertex_buffer: GpuBuffer<B::Buffer>,
    index_buffer: GpuBuffer<B::Buffer>,
    vertex_buffer_depth: GpuBuffer<B::Buffer>,
    index_buffer_depth: GpuBuffer<B::Buffer>,
    textures: Vec<B::Texture>,
}

impl<B: GpuBackend> Model<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            header: Header::default(),
            meshes: Vec::new(),
            materials: Vec::new(),
            vertex_stride: 0,
            vertex_stride_depth: 0,
            vertex_data: Vec::new(),
            index_data: Vec::new(),
            vertex_data_depth: Vec::new(),
            index_data_depth: Vec::new(),
            vertex_buffer: GpuBuffer::empty(),
            index_buffer: GpuBuffer::empty(),
            vertex_buffer_depth: GpuBuffer::empty(),
            index_buffer_depth: GpuBuffer::empty(),
            textures: Vec::new(),
        }
    }

    /// Release every GPU buffer, descriptor, staging buffer and texture.
    ///
    /// Calling this on an empty model, or twice in a row, does nothing.
    pub fn clear(&mut self) {
        self.vertex_buffer.destroy(&self.backend);
        self.index_buffer.destroy(&self.backend);
        self.vertex_buffer_depth.destroy(&self.backend);
        self.index_buffer_depth.destroy(&self.backend);

        self.meshes = Vec::new();
        self.header.mesh_count = 0;

        self.materials = Vec::new();
        self.header.material_count = 0;

        self.vertex_data = Vec::new();
        self.header.vertex_data_byte_size = 0;
        self.index_data = Vec::new();
        self.header.index_data_byte_size = 0;
        self.vertex_data_depth = Vec::new();
        self.header.vertex_data_byte_size_depth = 0;
        self.index_data_depth = Vec::new();
        self.vertex_stride = 0;
        self.vertex_stride_depth = 0;

        self.release_textures();

        self.header.bounding_box = BoundingBox::zero();
    }

    /// Replace the model's contents with `data` without touching the GPU.
    ///
    /// On error the model is left empty.
    pub fn stage(&mut self, data: ModelData) -> Result<(), GeometryError> {
        self.clear();
        validate(&data)?;

        let ModelData {
            meshes,
            materials,
            vertex_stride,
            vertex_data,
            index_data,
            depth,
        } = data;
        let depth = depth.unwrap_or_default();
        for (mesh_index, mesh) in meshes.iter().enumerate() {
            if mesh.vertex_count > 0 && mesh.vertex_stride != vertex_stride {
                log::warn!(
                    "mesh {mesh_index} uses a {} byte stride inside a {vertex_stride} byte vertex stream",
                    mesh.vertex_stride
                );
            }
        }

        // Sizes were checked against u32::MAX by `validate`.
        self.header = Header {
            mesh_count: meshes.len() as u32,
            material_count: materials.len() as u32,
            vertex_data_byte_size: vertex_data.len() as u32,
            index_data_byte_size: index_data.len() as u32,
            vertex_data_byte_size_depth: depth.vertex_data.len() as u32,
            bounding_box: BoundingBox::zero(),
        };
        log::debug!(
            "staged {} meshes, {} materials, {} vertex bytes, {} index bytes",
            meshes.len(),
            materials.len(),
            vertex_data.len(),
            index_data.len()
        );

        self.meshes = meshes;
        self.materials = materials;
        self.vertex_stride = vertex_stride;
        self.vertex_stride_depth = depth.vertex_stride;
        self.vertex_data = vertex_data;
        self.index_data = index_data;
        self.vertex_data_depth = depth.vertex_data;
        self.index_data_depth = depth.index_data;
        Ok(())
    }

    /// Stage `data`, compute its bounds, upload it and load its textures.
    pub fn load(&mut self, data: ModelData) -> anyhow::Result<()> {
        self.stage(data)?;
        self.finish_population()
    }

    /// Replace the model's contents with a generated water plane, kept on
    /// the CPU.
    pub fn stage_water(&mut self, config: &GridConfig) -> Result<(), GeometryError> {
        self.clear();
        let data = ModelData::water(config)?;
        self.stage(data)
    }

    /// Generate a water plane and make it GPU-resident.
    ///
    /// The CPU copy of the geometry is released once uploaded; bounds are
    /// computed before that happens.
    pub fn generate_water(&mut self, config: &GridConfig) -> anyhow::Result<()> {
        self.stage_water(config)?;
        log::info!(
            "generated {}x{} water plane with {} vertices and {} indices",
            config.width,
            config.height,
            config.vertex_count(),
            config.index_count()
        );
        self.finish_population()
    }

    fn finish_population(&mut self) -> anyhow::Result<()> {
        self.compute_all_bounding_boxes()?;
        self.upload()?;
        self.load_textures()
    }

    /// Move every non-empty staging buffer into a GPU buffer.
    ///
    /// Streams that were already uploaded are skipped. A backend failure is
    /// returned as is; buffers created before it stay owned by the model.
    pub fn upload(&mut self) -> anyhow::Result<()> {
        upload_stream(
            &self.backend,
            &mut self.vertex_buffer,
            &mut self.vertex_data,
            "VertexBuffer",
            BufferUsage::Vertex,
            self.vertex_stride,
        )?;
        upload_stream(
            &self.backend,
            &mut self.index_buffer,
            &mut self.index_data,
            "IndexBuffer",
            BufferUsage::Index,
            INDEX_STRIDE as u32,
        )?;
        upload_stream(
            &self.backend,
            &mut self.vertex_buffer_depth,
            &mut self.vertex_data_depth,
            "VertexBufferDepth",
            BufferUsage::Vertex,
            self.vertex_stride_depth,
        )?;
        upload_stream(
            &self.backend,
            &mut self.index_buffer_depth,
            &mut self.index_data_depth,
            "IndexBufferDepth",
            BufferUsage::Index,
            INDEX_STRIDE as u32,
        )?;
        Ok(())
    }

    fn load_textures(&mut self) -> anyhow::Result<()> {
        self.release_textures();
        for material in &self.materials {
            let texture = self
                .backend
                .load_texture(material)
                .with_context(|| format!("Failed to load textures of material {}", material.name))?;
            self.textures.push(texture);
        }
        Ok(())
    }

    fn release_textures(&mut self) {
        for texture in std::mem::take(&mut self.textures) {
            self.backend.release_texture(texture);
        }
    }

    /// Bounds of the positions of mesh `mesh_index`, read from the vertex
    /// staging buffer.
    pub fn compute_mesh_bounding_box(&self, mesh_index: usize) -> Result<BoundingBox, GeometryError> {
        let mesh = self.meshes.get(mesh_index).ok_or(GeometryError::MeshOutOfRange {
            index: mesh_index,
            count: self.meshes.len(),
        })?;
        if mesh.vertex_count == 0 {
            return Ok(BoundingBox::zero());
        }
        if self.vertex_data.is_empty() {
            return Err(GeometryError::StagingReleased);
        }
        let position = mesh
            .attribute(AttributeKind::Position)
            .ok_or(GeometryError::MissingPosition { mesh: mesh_index })?;

        let positions = AttributeView::<Position>::new(
            &self.vertex_data,
            mesh.vertex_data_byte_offset as usize,
            mesh.vertex_stride as usize,
            position as usize,
            mesh.vertex_count as usize,
        )?;
        Ok(BoundingBox::from_points(positions.iter().map(Point3::from)))
    }

    /// Union of the stored per-mesh boxes.
    pub fn compute_global_bounding_box(&self) -> BoundingBox {
        BoundingBox::enclosing(self.meshes.iter().map(|mesh| &mesh.bounding_box))
    }

    /// Recompute every mesh box in order, then the global box.
    ///
    /// Bounds are not tracked for staleness; call this after any change to
    /// the vertex data.
    pub fn compute_all_bounding_boxes(&mut self) -> Result<(), GeometryError> {
        for mesh_index in 0..self.meshes.len() {
            let bounding_box = self.compute_mesh_bounding_box(mesh_index)?;
            self.meshes[mesh_index].bounding_box = bounding_box;
        }
        self.header.bounding_box = self.compute_global_bounding_box();
        Ok(())
    }

    pub fn state(&self) -> ModelState {
        let gpu_resident = [
            &self.vertex_buffer,
            &self.index_buffer,
            &self.vertex_buffer_depth,
            &self.index_buffer_depth,
        ]
        .iter()
        .any(|buffer| !buffer.is_empty());
        if gpu_resident {
            ModelState::GpuResident
        } else if !self.meshes.is_empty() || !self.vertex_data.is_empty() || !self.index_data.is_empty() {
            ModelState::Populated
        } else {
            ModelState::Empty
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn vertex_stride(&self) -> u32 {
        self.vertex_stride
    }

    pub fn vertex_stride_depth(&self) -> u32 {
        self.vertex_stride_depth
    }

    pub fn vertex_data(&self) -> &[u8] {
        &self.vertex_data
    }

    pub fn index_data(&self) -> &[u8] {
        &self.index_data
    }

    pub fn vertex_data_depth(&self) -> &[u8] {
        &self.vertex_data_depth
    }

    pub fn index_data_depth(&self) -> &[u8] {
        &self.index_data_depth
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer<B::Buffer> {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &GpuBuffer<B::Buffer> {
        &self.index_buffer
    }

    pub fn vertex_buffer_depth(&self) -> &GpuBuffer<B::Buffer> {
        &self.vertex_buffer_depth
    }

    pub fn index_buffer_depth(&self) -> &GpuBuffer<B::Buffer> {
        &self.index_buffer_depth
    }

    pub fn textures(&self) -> &[B::Texture] {
        &self.textures
    }
}

impl<B: GpuBackend> Drop for Model<B> {
    fn drop(&mut self) {
        self.clear();
    }
}

fn upload_stream<B: GpuBackend>(
    backend: &B,
    buffer: &mut GpuBuffer<B::Buffer>,
    staging: &mut Vec<u8>,
    label: &str,
    usage: BufferUsage,
    stride: u32,
) -> anyhow::Result<()> {
    if staging.is_empty() {
        return Ok(());
    }
    // The staging bytes are handed over for good; the model keeps no copy.
    let contents = std::mem::take(staging);
    let element_count = (contents.len() / stride as usize) as u32;
    buffer.destroy(backend);
    *buffer = GpuBuffer::create(backend, label, usage, element_count, stride, contents)?;
    Ok(())
}

fn allocate_staging(byte_size: usize) -> Result<Vec<u8>, GeometryError> {
    let mut data = Vec::new();
    data.try_reserve_exact(byte_size)
        .map_err(|_| GeometryError::AllocationFailed { bytes: byte_size })?;
    data.resize(byte_size, 0);
    Ok(data)
}

fn validate(data: &ModelData) -> Result<(), GeometryError> {
    check_stream("vertex data", data.vertex_data.len(), data.vertex_stride as usize)?;
    check_stream("index data", data.index_data.len(), INDEX_STRIDE)?;
    if let Some(depth) = &data.depth {
        check_stream("depth vertex data", depth.vertex_data.len(), depth.vertex_stride as usize)?;
        if !depth.index_data.is_empty() && depth.index_data.len() != data.index_data.len() {
            return Err(GeometryError::DepthIndexSizeMismatch {
                expected: data.index_data.len(),
                actual: depth.index_data.len(),
            });
        }
    }

    for (mesh_index, mesh) in data.meshes.iter().enumerate() {
        if mesh.material_index as usize >= data.materials.len() {
            return Err(GeometryError::MaterialOutOfRange {
                mesh: mesh_index,
                material_index: mesh.material_index,
                material_count: data.materials.len(),
            });
        }
        if mesh.vertex_count > 0 {
            if mesh.vertex_stride == 0 {
                return Err(GeometryError::ZeroStride { mesh: mesh_index });
            }
            let position = mesh
                .attribute(AttributeKind::Position)
                .ok_or(GeometryError::MissingPosition { mesh: mesh_index })?;
            let end = mesh.vertex_data_end();
            if end > data.vertex_data.len() {
                return Err(GeometryError::VertexRangeOutOfBounds {
                    mesh: mesh_index,
                    end,
                    len: data.vertex_data.len(),
                });
            }
            AttributeView::<Position>::new(
                &data.vertex_data,
                mesh.vertex_data_byte_offset as usize,
                mesh.vertex_stride as usize,
                position as usize,
                mesh.vertex_count as usize,
            )?;
        }
        let end = mesh.index_data_end();
        if end > data.index_data.len() {
            return Err(GeometryError::IndexRangeOutOfBounds {
                mesh: mesh_index,
                end,
                len: data.index_data.len(),
            });
        }
    }
    Ok(())
}

fn check_stream(stream: &'static str, byte_size: usize, stride: usize) -> Result<(), GeometryError> {
    if byte_size > u32::MAX as usize {
        return Err(GeometryError::StreamTooLarge { stream, byte_size });
    }
    if byte_size > 0 && (stride == 0 || byte_size % stride != 0) {
        return Err(GeometryError::MisalignedStream {
            stream,
            byte_size,
            stride,
        });
    }
    Ok(())
}
