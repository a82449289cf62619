//! Typed, strided views over raw vertex bytes.
//!
//! Vertex streams are stored as plain bytes with a per-record stride and a
//! per-attribute offset, so one buffer can hold arbitrary interleaved
//! layouts. An [`AttributeView`] picks a single attribute out of such a
//! stream and reads it as `T` for every record.

use std::marker::PhantomData;

use crate::error::GeometryError;

/// Position attributes are always three consecutive `f32` values.
pub type Position = [f32; 3];

/// Read-only view of one attribute inside a strided vertex stream.
///
/// The attribute of record `i` starts at `base + offset + i * stride`.
/// Construction checks that every addressed byte lies inside `data`, so
/// [`get`](Self::get) never reads out of bounds.
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a, T> {
    data: &'a [u8],
    base: usize,
    stride: usize,
    offset: usize,
    count: usize,
    _attribute: PhantomData<T>,
}

impl<'a, T: bytemuck::Pod> AttributeView<'a, T> {
    /// Create a view of `count` records.
    ///
    /// # Arguments
    ///
    /// * `data` is the whole vertex stream
    /// * `base` is the byte offset of the first record
    /// * `stride` is the byte size of one record
    /// * `offset` is the attribute's byte offset within a record
    pub fn new(
        data: &'a [u8],
        base: usize,
        stride: usize,
        offset: usize,
        count: usize,
    ) -> Result<Self, GeometryError> {
        let size = size_of::<T>();
        if count > 0 {
            if offset.checked_add(size).is_none_or(|end| end > stride) {
                return Err(GeometryError::AttributeOutsideVertex {
                    offset,
                    size,
                    stride,
                });
            }
            let end = (count - 1)
                .checked_mul(stride)
                .and_then(|last| last.checked_add(base))
                .and_then(|last| last.checked_add(offset + size))
                .ok_or(GeometryError::BufferTooSmall {
                    needed: usize::MAX,
                    len: data.len(),
                })?;
            if end > data.len() {
                return Err(GeometryError::BufferTooSmall {
                    needed: end,
                    len: data.len(),
                });
            }
        }

        Ok(Self {
            data,
            base,
            stride,
            offset,
            count,
            _attribute: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Byte address of record `index`'s attribute inside the stream.
    pub fn address(&self, index: usize) -> usize {
        self.base + self.offset + index * self.stride
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.count {
            return None;
        }
        let start = self.address(index);
        Some(bytemuck::pod_read_unaligned(
            &self.data[start..start + size_of::<T>()],
        ))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = T> + '_ {
        (0..self.count).map(|index| {
            let start = self.address(index);
            bytemuck::pod_read_unaligned(&self.data[start..start + size_of::<T>()])
        })
    }
}
