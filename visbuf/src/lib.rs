//! On-demand columnar record cache for visibility buffers.
//!
//! A visibility buffer is one iteration's snapshot of many named fields
//! (scalars and tensors) over a set of measurement rows. Each field is
//! cached independently: materialized lazily through a fill callback bound
//! at registration time, dirty-tracked for write-back, and validated
//! against the shape the buffer's current dimensions dictate.
//!
//! The aggregate type is [`BufferCache`]; its moving parts are the
//! [`CacheItem`] implementations ([`ScalarItem`], [`TensorItem`]), the
//! [`CacheRegistry`] that owns them, and the [`ShapeOracle`] implemented by
//! [`BufferDims`].

mod cache;
mod corr;
mod cursor;
mod field;
mod item;
mod oracle;
mod policy;
mod registry;

pub use cache::*;
pub use corr::*;
pub use cursor::*;
pub use field::*;
pub use item::*;
pub use oracle::*;
pub use policy::*;
pub use registry::*;
pub use visbuf_error::{VisbufError, VisbufResult};
pub use visbuf_tensor::{Shape, Tensor};
