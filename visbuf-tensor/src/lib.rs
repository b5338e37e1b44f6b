#![deny(missing_docs)]

//! Dense in-memory tensors for Visbuf buffers.
//!
//! A [`Tensor`] stores its elements in one flat, contiguous allocation with
//! the first axis varying fastest and the row axis always last (slowest).
//! That layout makes every per-row block contiguous, so the row-structural
//! operations the buffer cache needs (truncating rows in place, growing rows
//! zero-filled, copying one row over another) are plain `Vec` operations
//! that never relocate retained row data.

mod macros;
mod shape;
mod tensor;

pub use shape::*;
pub use tensor::*;
