use visbuf_error::VisbufResult;
use visbuf_tensor::Tensor;

/// Whether an attached cursor can currently supply data for un-cached
/// fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FillStatus {
    /// The cursor can be read from.
    Ready,
    /// The cursor cannot supply data right now; carries its own diagnostic
    /// (e.g. "row-group is mid-write").
    Blocked(String),
}

/// The external data source a buffer is attached to.
///
/// The cache only ever asks the cursor whether it is fillable; actually
/// reading a field goes through the fill callback bound to that field at
/// registration time, which receives the cursor back as its first argument.
pub trait RowCursor {
    /// Whether the cursor can currently supply data.
    fn fill_status(&self) -> FillStatus;
}

/// Fill callback for a scalar field: populate `value` completely or fail.
///
/// Only invoked while the item is absent and the owning buffer is attached
/// (and, for non-computed fields, fillable).
pub type ScalarFiller<T> = Box<dyn Fn(&mut dyn RowCursor, &mut T) -> VisbufResult<()>>;

/// Fill callback for a tensor field: populate `value` completely or fail.
///
/// The tensor is pre-sized to the expected shape before the callback runs;
/// the callback may replace it wholesale, but the result is re-validated
/// against the shape oracle and rejected on mismatch.
pub type TensorFiller<T> = Box<dyn Fn(&mut dyn RowCursor, &mut Tensor<T>) -> VisbufResult<()>>;
