use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

use itertools::Itertools;

/// A dimension vector, first axis fastest-varying and the row axis last.
///
/// An empty trailing axis (`[.., 0]`) is the canonical shape of a tensor
/// that holds no rows yet; the leading axes still describe the per-row
/// block.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements a tensor of this shape holds.
    pub fn volume(&self) -> usize {
        self.0.iter().product()
    }

    /// Extent of the trailing (row) axis, or zero for a rank-0 shape.
    pub fn rows(&self) -> usize {
        self.0.last().copied().unwrap_or(0)
    }

    /// Number of elements in one row, i.e. the product of all non-row axes.
    pub fn row_block(&self) -> usize {
        match self.0.split_last() {
            Some((_, leading)) => leading.iter().product(),
            None => 0,
        }
    }

    /// The same shape with the trailing (row) axis replaced by `rows`.
    pub fn with_rows(&self, rows: usize) -> Self {
        let mut dims = self.0.clone();
        match dims.last_mut() {
            Some(last) => *last = rows,
            None => dims.push(rows),
        }
        Self(dims)
    }

    /// Extent of the leading (fastest) axis, or zero for a rank-0 shape.
    pub fn leading(&self) -> usize {
        self.0.first().copied().unwrap_or(0)
    }

    /// The dimensions as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Element strides for this shape, first axis fastest.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.rank());
        let mut acc = 1usize;
        for dim in &self.0 {
            strides.push(acc);
            acc *= dim;
        }
        strides
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().format(", "))
    }
}

impl Debug for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
