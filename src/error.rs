//! Geometry error types.

use std::fmt;

/// Precondition violations detected while interpreting, generating or
/// staging geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A grid needs at least one cell in each direction.
    GridTooSmall { width: u32, height: u32 },
    /// The highest vertex index of a grid does not fit into a 16-bit index.
    IndexOverflow { vertex_count: u64 },
    /// A vertex record is narrower than the data written into it.
    StrideTooSmall { stride: usize, required: usize },
    /// A mesh with vertices declares a zero stride.
    ZeroStride { mesh: usize },
    /// An attribute reaches past the end of its vertex record.
    AttributeOutsideVertex { offset: usize, size: usize, stride: usize },
    /// A read or write would leave the buffer.
    BufferTooSmall { needed: usize, len: usize },
    /// A mesh index is not part of the model.
    MeshOutOfRange { index: usize, count: usize },
    /// A mesh references a material the model doesn't own.
    MaterialOutOfRange { mesh: usize, material_index: u32, material_count: usize },
    /// A mesh with vertices has no position attribute.
    MissingPosition { mesh: usize },
    /// A mesh's vertex range is not inside the vertex staging buffer.
    VertexRangeOutOfBounds { mesh: usize, end: usize, len: usize },
    /// A mesh's index range is not inside the index staging buffer.
    IndexRangeOutOfBounds { mesh: usize, end: usize, len: usize },
    /// A staging stream's size is not a multiple of its element stride.
    MisalignedStream { stream: &'static str, byte_size: usize, stride: usize },
    /// A staging stream is too large to describe with 32-bit byte sizes.
    StreamTooLarge { stream: &'static str, byte_size: usize },
    /// The depth index stream must mirror the primary index stream.
    DepthIndexSizeMismatch { expected: usize, actual: usize },
    /// The CPU copy of the vertex data was already moved to the GPU.
    StagingReleased,
    /// A staging buffer could not be allocated.
    AllocationFailed { bytes: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridTooSmall { width, height } => {
                write!(f, "grid of {width}x{height} cells has no quads")
            }
            Self::IndexOverflow { vertex_count } => write!(
                f,
                "grid of {vertex_count} vertices cannot be addressed with 16-bit indices"
            ),
            Self::StrideTooSmall { stride, required } => {
                write!(f, "vertex stride {stride} is smaller than the {required} bytes required")
            }
            Self::ZeroStride { mesh } => write!(f, "mesh {mesh} has vertices but a zero stride"),
            Self::AttributeOutsideVertex { offset, size, stride } => write!(
                f,
                "attribute of {size} bytes at offset {offset} does not fit a {stride} byte vertex"
            ),
            Self::BufferTooSmall { needed, len } => {
                write!(f, "buffer of {len} bytes is too small, {needed} bytes needed")
            }
            Self::MeshOutOfRange { index, count } => {
                write!(f, "mesh {index} out of range for a model with {count} meshes")
            }
            Self::MaterialOutOfRange { mesh, material_index, material_count } => write!(
                f,
                "mesh {mesh} references material {material_index} but only {material_count} exist"
            ),
            Self::MissingPosition { mesh } => {
                write!(f, "mesh {mesh} has vertices but no position attribute")
            }
            Self::VertexRangeOutOfBounds { mesh, end, len } => write!(
                f,
                "vertices of mesh {mesh} end at byte {end} but the vertex data holds {len} bytes"
            ),
            Self::IndexRangeOutOfBounds { mesh, end, len } => write!(
                f,
                "indices of mesh {mesh} end at byte {end} but the index data holds {len} bytes"
            ),
            Self::MisalignedStream { stream, byte_size, stride } => write!(
                f,
                "{stream} of {byte_size} bytes is not a multiple of its {stride} byte stride"
            ),
            Self::StreamTooLarge { stream, byte_size } => {
                write!(f, "{stream} of {byte_size} bytes exceeds the 32-bit size limit")
            }
            Self::DepthIndexSizeMismatch { expected, actual } => write!(
                f,
                "depth index data holds {actual} bytes, expected {expected}"
            ),
            Self::StagingReleased => write!(f, "vertex staging data was already uploaded and released"),
            Self::AllocationFailed { bytes } => {
                write!(f, "failed to allocate a {bytes} byte staging buffer")
            }
        }
    }
}

impl std::error::Error for GeometryError {}
