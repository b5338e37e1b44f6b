//! Cache items: one per registered field, scalar or tensor.
//!
//! The object-safe [`CacheItem`] trait carries the lifecycle every item
//! supports regardless of its payload type; typed access (get/set/fill)
//! lives on the concrete [`ScalarItem`] and [`TensorItem`] types and is
//! reached through `as_any` downcasts.

use std::any::Any;

use visbuf_error::{VisbufError, VisbufResult, visbuf_bail};

use crate::{FieldId, FieldSpec, FillStatus, RowCursor, ShapeOracle};

mod scalar;
mod tensor;

pub use scalar::*;
pub use tensor::*;

/// The lifecycle contract shared by every cached field.
///
/// Items hold no reference back to their buffer; operations that depend on
/// the buffer's dimensions receive the shape oracle as an argument, which
/// keeps the registry free to own its items outright.
pub trait CacheItem {
    /// The static descriptor of the field this item caches.
    fn spec(&self) -> FieldSpec;

    /// The field this item caches.
    fn field(&self) -> FieldId {
        self.spec().id
    }

    /// True once a value has been fetched or explicitly set.
    fn is_present(&self) -> bool;

    /// True when the value has been modified since the last fill or
    /// write-back.
    fn is_dirty(&self) -> bool;

    /// Mark the value clean again, after a successful write-back.
    fn clear_dirty(&mut self);

    /// Forget the cached value: `present` and `dirty` are reset, and unless
    /// `status_only` the payload is released to its empty state.
    fn clear(&mut self, status_only: bool);

    /// Whether the cached value's shape agrees with the oracle. Always true
    /// for scalars, unchecked patterns, and absent items.
    fn is_shape_ok(&self, oracle: &dyn ShapeOracle) -> bool;

    /// Grow or shrink the trailing row axis: with `truncate` the value is
    /// cut down to its first `n` rows, otherwise it grows by `n` zeroed
    /// rows. No-op for scalars, unchecked or non-row patterns, and items
    /// that are absent or empty.
    fn append_rows(&mut self, oracle: &dyn ShapeOracle, n: usize, truncate: bool)
    -> VisbufResult<()>;

    /// Set the trailing row axis to exactly `rows`, preserving retained row
    /// content, and mark the item dirty. No-op for scalars, non-row
    /// patterns, and absent items.
    fn resize_rows(&mut self, oracle: &dyn ShapeOracle, rows: usize) -> VisbufResult<()>;

    /// Reshape the value to the oracle's current full shape; with
    /// `copy_values` the overlapping region is carried over, otherwise the
    /// new storage is zero-filled. No-op for scalars, unchecked patterns,
    /// and absent items.
    fn resize(&mut self, oracle: &dyn ShapeOracle, copy_values: bool) -> VisbufResult<()>;

    /// Copy the whole non-row element block of row `src` over row `dst`,
    /// for row compaction. No-op for scalars, non-row patterns, and absent
    /// items.
    fn copy_row(&mut self, src: usize, dst: usize) -> VisbufResult<()>;

    /// Rotate this item's four correlation planes from natural to sorted
    /// order. No-op unless the pattern leads with the correlation axis and
    /// the item is present and non-empty.
    fn sort_correlations(&mut self) -> VisbufResult<()>;

    /// The exact inverse of [`CacheItem::sort_correlations`].
    fn unsort_correlations(&mut self) -> VisbufResult<()>;

    /// Downcast support for typed access.
    fn as_any(&self) -> &dyn Any;

    /// Downcast support for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Resolve the cursor an item may fill from, enforcing the attachment and
/// fillability preconditions. Computed fields skip the fillability check:
/// they derive their value rather than read it from storage.
pub(crate) fn fillable_cursor<'a>(
    cursor: Option<&'a mut dyn RowCursor>,
    spec: &FieldSpec,
) -> VisbufResult<&'a mut dyn RowCursor> {
    let cursor = cursor.ok_or(VisbufError::NotAttached)?;
    if !spec.computed {
        if let FillStatus::Blocked(diagnostic) = cursor.fill_status() {
            visbuf_bail!(NotFillable: "{diagnostic}");
        }
    }
    Ok(cursor)
}
