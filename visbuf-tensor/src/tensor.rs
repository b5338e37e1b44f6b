use std::fmt::{Debug, Formatter};

use visbuf_error::{VisbufResult, visbuf_bail, visbuf_panic};

use crate::Shape;

/// A dense, owned tensor with the row axis last and slowest-varying.
///
/// Elements live in a single flat `Vec<T>` in first-axis-fastest order, so
/// the block of elements belonging to one row is always contiguous and the
/// storage of retained rows never moves when the row axis shrinks.
#[derive(Clone, PartialEq, Eq)]
pub struct Tensor<T> {
    shape: Shape,
    data: Vec<T>,
}

impl<T> Tensor<T> {
    /// A rank-1 tensor with zero rows. The canonical "no value yet" payload.
    pub fn empty() -> Self {
        Self {
            shape: Shape::from([0]),
            data: Vec::new(),
        }
    }

    /// A rank-1 tensor holding `values`.
    pub fn from_rank1(values: impl Into<Vec<T>>) -> Self {
        let data = values.into();
        Self {
            shape: Shape::from([data.len()]),
            data,
        }
    }

    /// Build a tensor from a shape and a flat element vector.
    ///
    /// Fails when the vector's length disagrees with the shape's volume.
    pub fn from_parts(shape: impl Into<Shape>, data: Vec<T>) -> VisbufResult<Self> {
        let shape = shape.into();
        if data.len() != shape.volume() {
            visbuf_bail!(
                "tensor data length {} does not match shape {} (volume {})",
                data.len(),
                shape,
                shape.volume()
            );
        }
        Ok(Self { shape, data })
    }

    /// The tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements.
    pub fn volume(&self) -> usize {
        self.data.len()
    }

    /// True when the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extent of the trailing (row) axis.
    pub fn rows(&self) -> usize {
        self.shape.rows()
    }

    /// The flat elements, first axis fastest, row axis slowest.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the flat elements.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// The contiguous element block of row `row`.
    ///
    /// ## Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[T] {
        let block = self.shape.row_block();
        if row >= self.rows() {
            visbuf_panic!("row {} out of bounds for shape {}", row, self.shape);
        }
        &self.data[row * block..(row + 1) * block]
    }

    /// Mutable access to the contiguous element block of row `row`.
    ///
    /// ## Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let block = self.shape.row_block();
        if row >= self.rows() {
            visbuf_panic!("row {} out of bounds for shape {}", row, self.shape);
        }
        &mut self.data[row * block..(row + 1) * block]
    }

    /// Shrink the trailing (row) axis to the first `rows` rows.
    ///
    /// Retained rows keep referring to the same storage; nothing is copied.
    pub fn truncate_rows(&mut self, rows: usize) -> VisbufResult<()> {
        if rows > self.rows() {
            visbuf_bail!(
                "cannot truncate shape {} to {} rows",
                self.shape,
                rows
            );
        }
        self.data.truncate(rows * self.shape.row_block());
        self.shape = self.shape.with_rows(rows);
        Ok(())
    }
}

impl<T: Copy> Tensor<T> {
    /// A tensor of the given shape with every element set to `value`.
    pub fn full(value: T, shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        let data = vec![value; shape.volume()];
        Self { shape, data }
    }

    /// Copy the whole non-row element block of row `src` over row `dst`.
    ///
    /// Used when compacting rows; the row axis is slowest so this is one
    /// contiguous block copy at any rank.
    pub fn copy_row(&mut self, src: usize, dst: usize) -> VisbufResult<()> {
        let rows = self.rows();
        if src >= rows || dst >= rows {
            visbuf_bail!(
                "row copy {} -> {} out of bounds for shape {}",
                src,
                dst,
                self.shape
            );
        }
        if src == dst {
            return Ok(());
        }
        let block = self.shape.row_block();
        self.data
            .copy_within(src * block..(src + 1) * block, dst * block);
        Ok(())
    }
}

impl<T: Copy + Default> Tensor<T> {
    /// A zero-filled tensor of the given shape.
    pub fn zeroed(shape: impl Into<Shape>) -> Self {
        Self::full(T::default(), shape)
    }

    /// Grow the trailing (row) axis by `additional` rows.
    ///
    /// Existing rows are preserved unchanged; the new slots are zeroed.
    pub fn grow_rows(&mut self, additional: usize) {
        let rows = self.rows() + additional;
        self.data
            .resize(rows * self.shape.row_block(), T::default());
        self.shape = self.shape.with_rows(rows);
    }

    /// Change the trailing (row) axis to exactly `rows`, preserving every
    /// retained row.
    pub fn resize_rows(&mut self, rows: usize) -> VisbufResult<()> {
        let current = self.rows();
        if rows < current {
            self.truncate_rows(rows)
        } else {
            self.grow_rows(rows - current);
            Ok(())
        }
    }

    /// Reshape to `shape`.
    ///
    /// With `copy_values` the elements of the overlapping hyper-rectangle
    /// are carried over (ranks must agree for any overlap to exist); without
    /// it the new storage is entirely zero-filled.
    pub fn resize(&mut self, shape: impl Into<Shape>, copy_values: bool) {
        let shape = shape.into();
        if shape == self.shape {
            return;
        }
        let mut data = vec![T::default(); shape.volume()];
        if copy_values && shape.rank() == self.shape.rank() && self.rank() > 0 {
            copy_overlap(&self.shape, &self.data, &shape, &mut data);
        }
        self.shape = shape;
        self.data = data;
    }
}

/// Copy the overlapping hyper-rectangle between two equal-rank layouts,
/// walking contiguous runs along the fastest axis.
fn copy_overlap<T: Copy>(src_shape: &Shape, src: &[T], dst_shape: &Shape, dst: &mut [T]) {
    let rank = src_shape.rank();
    let overlap: Vec<usize> = src_shape
        .iter()
        .zip(dst_shape.iter())
        .map(|(&a, &b)| a.min(b))
        .collect();
    if overlap.iter().any(|&d| d == 0) {
        return;
    }
    let src_strides = src_shape.strides();
    let dst_strides = dst_shape.strides();
    let run = overlap[0];
    let mut coords = vec![0usize; rank];
    'rows: loop {
        let src_off: usize = coords
            .iter()
            .zip(&src_strides)
            .map(|(&c, &s)| c * s)
            .sum();
        let dst_off: usize = coords
            .iter()
            .zip(&dst_strides)
            .map(|(&c, &s)| c * s)
            .sum();
        dst[dst_off..dst_off + run].copy_from_slice(&src[src_off..src_off + run]);
        let mut axis = 1;
        loop {
            if axis == rank {
                break 'rows;
            }
            coords[axis] += 1;
            if coords[axis] < overlap[axis] {
                break;
            }
            coords[axis] = 0;
            axis += 1;
        }
    }
}

impl<T> std::ops::Index<usize> for Tensor<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> std::ops::IndexMut<usize> for Tensor<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T: Debug> Debug for Tensor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}
