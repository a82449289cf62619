//! Procedural grid generation.
//!
//! [`make_plane`] lays out a flat rectangular grid on the XZ plane and one
//! continuous triangle strip covering it. Rows are joined with a pair of
//! degenerate indices so the whole grid draws without a primitive restart:
//!
//! ```text
//!  z^
//!   |  6---7---8        row 0: 0 3 1 4 2 5   stitch: 5 3
//!   |  | / | / |        row 1: 3 6 4 7 5 8
//!   |  3---4---5
//!   |  | / | / |
//!   |  0---1---2
//!   +-------------> x
//! ```

use std::mem::offset_of;

use crate::error::GeometryError;

/// Byte size of one index in the generated strip.
pub const INDEX_STRIDE: usize = size_of::<u16>();

/// The vertex record written by [`make_plane`]: position followed by UV.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl PlaneVertex {
    pub const STRIDE: usize = size_of::<PlaneVertex>();
    pub const POSITION_OFFSET: usize = offset_of!(PlaneVertex, position);
    pub const TEX_COORDS_OFFSET: usize = offset_of!(PlaneVertex, tex_coords);
}

/// Shape of a generated grid.
///
/// `width` and `height` count cells, not vertices. `scale` is the world-space
/// edge length of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl GridConfig {
    pub const DEFAULT_CELLS: u32 = 10;
    pub const DEFAULT_SCALE: f32 = 100.0;

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: Self::DEFAULT_SCALE,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn vertex_width(&self) -> u32 {
        self.width.saturating_add(1)
    }

    pub fn vertex_height(&self) -> u32 {
        self.height.saturating_add(1)
    }

    /// Saturates for grids that [`validate`](Self::validate) rejects.
    pub fn vertex_count(&self) -> usize {
        (self.vertex_width() as usize).saturating_mul(self.vertex_height() as usize)
    }

    /// Strip length: two indices per vertex column and row, plus a
    /// degenerate pair between consecutive rows.
    pub fn index_count(&self) -> usize {
        let indices_per_row = (self.vertex_width() as usize).saturating_mul(2);
        let degenerate_count = (self.height.saturating_sub(1) as usize).saturating_mul(2);
        indices_per_row
            .saturating_mul(self.height as usize)
            .saturating_add(degenerate_count)
    }

    /// Check that the grid has quads and that its last vertex is addressable
    /// with a 16-bit index.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width == 0 || self.height == 0 {
            return Err(GeometryError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let vertex_count = (self.width as u64 + 1).saturating_mul(self.height as u64 + 1);
        if vertex_count - 1 > u16::MAX as u64 {
            return Err(GeometryError::IndexOverflow { vertex_count });
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELLS, Self::DEFAULT_CELLS)
    }
}

/// Write the grid's vertices and strip indices into caller-owned bytes.
///
/// Each vertex occupies `vertex_stride` bytes; only the leading
/// [`PlaneVertex::STRIDE`] bytes of a record are written. Indices are
/// little-endian `u16`.
pub fn make_plane(
    config: &GridConfig,
    vertices: &mut [u8],
    vertex_stride: usize,
    indices: &mut [u8],
) -> Result<(), GeometryError> {
    config.validate()?;
    if vertex_stride < PlaneVertex::STRIDE {
        return Err(GeometryError::StrideTooSmall {
            stride: vertex_stride,
            required: PlaneVertex::STRIDE,
        });
    }
    let vertex_bytes = required_len(vertices, vertex_stride, config.vertex_count())?;
    let index_bytes = required_len(indices, INDEX_STRIDE, config.index_count())?;

    let vertex_width = config.vertex_width() as usize;
    // UVs divide by the vertex count per axis, so they stop short of 1.0
    // at the far edge. Existing water shaders depend on that mapping.
    let u_denominator = config.vertex_width() as f32;
    let v_denominator = config.vertex_height() as f32;
    let records = vertices[..vertex_bytes].chunks_exact_mut(vertex_stride);
    for (index, record) in records.enumerate() {
        let x = (index % vertex_width) as f32;
        let y = (index / vertex_width) as f32;
        let vertex = PlaneVertex {
            position: [x * config.scale, 0.0, y * config.scale],
            tex_coords: [x / u_denominator, y / v_denominator],
        };
        record[..PlaneVertex::STRIDE].copy_from_slice(bytemuck::bytes_of(&vertex));
    }

    let slots = indices[..index_bytes].chunks_exact_mut(INDEX_STRIDE);
    for (slot, index) in slots.zip(strip_indices(config.width, config.height)) {
        slot.copy_from_slice(&index.to_le_bytes());
    }

    Ok(())
}

/// Byte size of `count` records of `stride` bytes, if `buffer` holds them.
fn required_len(buffer: &[u8], stride: usize, count: usize) -> Result<usize, GeometryError> {
    let needed = stride.checked_mul(count).unwrap_or(usize::MAX);
    if buffer.len() < needed {
        return Err(GeometryError::BufferTooSmall {
            needed,
            len: buffer.len(),
        });
    }
    Ok(needed)
}

/// Zig-zag every row from bottom to top, then repeat the last vertex of
/// the next row and its first vertex before moving on.
fn strip_indices(width: u32, height: u32) -> impl Iterator<Item = u16> {
    let vertex_width = width + 1;
    (0..height)
        .flat_map(move |y| {
            let base = y * vertex_width;
            let zig_zag = (0..vertex_width).flat_map(move |x| [base + x, base + vertex_width + x]);
            let next_row = (y + 1) * vertex_width;
            let stitch = (y + 1 < height)
                .then_some([next_row + vertex_width - 1, next_row])
                .into_iter()
                .flatten();
            zig_zag.chain(stitch)
        })
        .map(|index| index as u16)
}
