use std::any::type_name;

use visbuf_error::{VisbufExpect, VisbufResult, visbuf_bail, visbuf_err};
use visbuf_tensor::Tensor;

use crate::{
    BufferDims, CacheRegistry, Complex, FieldId, FieldKind, RowCursor, ScalarFiller,
    ScalarItem, TensorFiller, TensorItem, WritePolicy,
};

/// The per-buffer aggregate: one cache item per registered field, the
/// buffer's current dimensions, its write policy, and the optionally
/// attached cursor.
///
/// Every operation that changes a dimension the shape oracle reports also
/// resizes the affected items before it returns, so consumers can never
/// observe a cached value whose shape disagrees with the oracle.
pub struct BufferCache {
    dims: BufferDims,
    policy: WritePolicy,
    cursor: Option<Box<dyn RowCursor>>,
    registry: CacheRegistry,
    correlations_sorted: bool,
}

impl BufferCache {
    /// An empty cache; fields are added with [`BufferCache::register_scalar`]
    /// and [`BufferCache::register_tensor`].
    pub fn new(dims: BufferDims, policy: WritePolicy) -> Self {
        Self {
            dims,
            policy,
            cursor: None,
            registry: CacheRegistry::new(),
            correlations_sorted: false,
        }
    }

    /// A cache with every field of the standard visibility buffer
    /// registered, without fill callbacks. Suitable for write-mostly
    /// buffers; lazily filled fields are registered individually instead.
    pub fn standard(dims: BufferDims, policy: WritePolicy) -> Self {
        let mut cache = Self::new(dims, policy);
        for &field in FieldId::ALL {
            cache
                .register_standard_field(field)
                .visbuf_expect("standard field table is duplicate-free");
        }
        cache
    }

    fn register_standard_field(&mut self, field: FieldId) -> VisbufResult<()> {
        use FieldId::*;
        match field {
            NRows | NChannels | NCorrelations | NAntennas | SpectralWindow | SourceField
            | DataDescriptionId | PolarizationId => self.register_scalar::<i32>(field, None),
            Time | Exposure | Uvw => self.register_tensor::<f64>(field, None),
            Antenna1 | Antenna2 | Scan => self.register_tensor::<i32>(field, None),
            FlagRow | FlagCube => self.register_tensor::<bool>(field, None),
            Sigma | Weight | FeedPa => self.register_tensor::<f32>(field, None),
            VisCube | ModelCube | CorrectedCube => self.register_tensor::<Complex>(field, None),
            RowIds => self.register_tensor::<u64>(field, None),
        }
    }

    /// Register a scalar field, optionally with its fill callback.
    pub fn register_scalar<T: Default + 'static>(
        &mut self,
        field: FieldId,
        filler: Option<ScalarFiller<T>>,
    ) -> VisbufResult<()> {
        if field.spec().kind != FieldKind::Scalar {
            visbuf_bail!("field {} is not scalar-typed", field);
        }
        self.registry
            .register(Box::new(ScalarItem::new(field, filler)))
    }

    /// Register a tensor field, optionally with its fill callback.
    pub fn register_tensor<T: Copy + Default + 'static>(
        &mut self,
        field: FieldId,
        filler: Option<TensorFiller<T>>,
    ) -> VisbufResult<()> {
        if field.spec().kind != FieldKind::Tensor {
            visbuf_bail!("field {} is not tensor-typed", field);
        }
        self.registry
            .register(Box::new(TensorItem::new(field, filler)))
    }

    /// The buffer's current dimensions.
    pub fn dims(&self) -> &BufferDims {
        &self.dims
    }

    /// The buffer's write policy.
    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// The registry, for collaborators that scan items directly.
    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    // ---- cursor -----------------------------------------------------------

    /// Attach a cursor, invalidating every cached value.
    pub fn attach(&mut self, cursor: Box<dyn RowCursor>) {
        log::debug!("attaching cursor, clearing {} items", self.registry.len());
        self.registry.clear_all(false);
        self.correlations_sorted = false;
        self.cursor = Some(cursor);
    }

    /// Detach the cursor, invalidating every cached value.
    pub fn detach(&mut self) {
        log::debug!("detaching cursor, clearing {} items", self.registry.len());
        self.registry.clear_all(false);
        self.correlations_sorted = false;
        self.cursor = None;
    }

    /// Whether a cursor is attached.
    pub fn is_attached(&self) -> bool {
        self.cursor.is_some()
    }

    // ---- typed access -----------------------------------------------------

    /// Read a scalar field, filling it from the cursor if absent.
    pub fn scalar<T: Default + 'static>(&mut self, field: FieldId) -> VisbufResult<&T> {
        let Self {
            cursor, registry, ..
        } = self;
        scalar_item::<T>(registry, field)?.get(cursor.as_deref_mut().map(|c| c as &mut dyn RowCursor))
    }

    /// Mutable access to a scalar field; marks it dirty.
    pub fn scalar_mut<T: Default + 'static>(
        &mut self,
        field: FieldId,
        fill_if_absent: bool,
    ) -> VisbufResult<&mut T> {
        let Self {
            cursor,
            registry,
            policy,
            ..
        } = self;
        scalar_item::<T>(registry, field)?.get_mut(
            cursor.as_deref_mut().map(|c| c as &mut dyn RowCursor),
            *policy,
            fill_if_absent,
        )
    }

    /// Replace a scalar field's value; marks it dirty.
    pub fn set_scalar<T: Default + 'static>(
        &mut self,
        field: FieldId,
        value: T,
    ) -> VisbufResult<()> {
        let policy = self.policy;
        scalar_item::<T>(&mut self.registry, field)?.set(value, policy)
    }

    /// Read a tensor field, filling it from the cursor if absent.
    pub fn tensor<T: Copy + Default + 'static>(
        &mut self,
        field: FieldId,
    ) -> VisbufResult<&Tensor<T>> {
        let Self {
            cursor,
            registry,
            dims,
            ..
        } = self;
        tensor_item::<T>(registry, field)?
            .get(cursor.as_deref_mut().map(|c| c as &mut dyn RowCursor), dims)
    }

    /// Mutable access to a tensor field; marks it dirty. An absent item is
    /// filled (`fill_if_absent`) or pre-sized to the expected shape.
    pub fn tensor_mut<T: Copy + Default + 'static>(
        &mut self,
        field: FieldId,
        fill_if_absent: bool,
    ) -> VisbufResult<&mut Tensor<T>> {
        let Self {
            cursor,
            registry,
            dims,
            policy,
            ..
        } = self;
        tensor_item::<T>(registry, field)?.get_mut(
            cursor.as_deref_mut().map(|c| c as &mut dyn RowCursor),
            dims,
            *policy,
            fill_if_absent,
        )
    }

    /// Replace a tensor field's value after validating its shape; marks it
    /// dirty.
    pub fn set_tensor<T: Copy + Default + 'static>(
        &mut self,
        field: FieldId,
        value: Tensor<T>,
    ) -> VisbufResult<()> {
        let Self {
            registry,
            dims,
            policy,
            ..
        } = self;
        tensor_item::<T>(registry, field)?.set(value, dims, *policy)
    }

    // ---- status -----------------------------------------------------------

    /// Whether `field` currently holds a value.
    pub fn is_present(&self, field: FieldId) -> VisbufResult<bool> {
        Ok(self.registry.item(field)?.is_present())
    }

    /// Whether `field` has been modified since its last fill or write-back.
    pub fn is_dirty(&self, field: FieldId) -> VisbufResult<bool> {
        Ok(self.registry.item(field)?.is_dirty())
    }

    /// Forget one field's value.
    pub fn clear_field(&mut self, field: FieldId, status_only: bool) -> VisbufResult<()> {
        self.registry.item_mut(field)?.clear(status_only);
        Ok(())
    }

    /// Forget every field's value, e.g. when the cursor repositions to a
    /// new row-group.
    pub fn clear_all(&mut self, status_only: bool) {
        log::debug!("clearing {} items", self.registry.len());
        self.registry.clear_all(status_only);
        self.correlations_sorted = false;
    }

    /// Whether every present item's shape agrees with the oracle.
    pub fn all_shapes_ok(&self) -> bool {
        self.registry.iter().all(|item| item.is_shape_ok(&self.dims))
    }

    // ---- write-back -------------------------------------------------------

    /// The identities of all dirty fields, for the write-back collaborator.
    pub fn dirty_fields(&self) -> Vec<FieldId> {
        self.registry.dirty_fields()
    }

    /// Mark one field clean after it has been persisted.
    pub fn clear_dirty(&mut self, field: FieldId) -> VisbufResult<()> {
        self.registry.item_mut(field)?.clear_dirty();
        Ok(())
    }

    /// Mark every field clean after a bulk write-back.
    pub fn clear_dirty_all(&mut self) {
        self.registry.clear_dirty_all();
    }

    // ---- dimension changes ------------------------------------------------

    /// Append or truncate rows. With `truncate` the buffer is cut down to
    /// its first `n` rows; otherwise it grows by `n` zeroed rows. The
    /// oracle is updated first and every item is resized before this
    /// returns.
    pub fn append_rows(&mut self, n: usize, truncate: bool) -> VisbufResult<()> {
        if truncate {
            if n > self.dims.nrows() {
                visbuf_bail!(
                    "cannot truncate {} rows to {}",
                    self.dims.nrows(),
                    n
                );
            }
            self.dims.set_rows(n);
        } else {
            self.dims.set_rows(self.dims.nrows() + n);
        }
        log::debug!(
            "append_rows(n={n}, truncate={truncate}): row count now {}",
            self.dims.nrows()
        );
        let Self {
            dims, registry, ..
        } = self;
        registry.append_rows(dims, n, truncate)
    }

    /// Set the row count to exactly `rows`, preserving retained row
    /// content; affected items are marked dirty.
    pub fn resize_rows(&mut self, rows: usize) -> VisbufResult<()> {
        self.dims.set_rows(rows);
        let Self {
            dims, registry, ..
        } = self;
        registry.resize_rows(dims, rows)
    }

    /// Change the channel count, reshaping every stale item. With
    /// `copy_values` the overlapping region of each item is carried over;
    /// otherwise stale items are zero-filled.
    pub fn set_channel_count(&mut self, nchannels: usize, copy_values: bool) -> VisbufResult<()> {
        self.dims.set_channels(nchannels);
        self.resize_stale_items(copy_values)
    }

    /// Change the correlation count, reshaping every stale item.
    pub fn set_correlation_count(
        &mut self,
        ncorrelations: usize,
        copy_values: bool,
    ) -> VisbufResult<()> {
        self.dims.set_correlations(ncorrelations);
        self.resize_stale_items(copy_values)
    }

    /// Change the antenna count, reshaping every stale item.
    pub fn set_antenna_count(&mut self, nantennas: usize, copy_values: bool) -> VisbufResult<()> {
        self.dims.set_antennas(nantennas);
        self.resize_stale_items(copy_values)
    }

    fn resize_stale_items(&mut self, copy_values: bool) -> VisbufResult<()> {
        let Self {
            dims, registry, ..
        } = self;
        for item in registry.iter_mut() {
            if !item.is_shape_ok(dims) {
                item.resize(dims, copy_values)?;
            }
        }
        Ok(())
    }

    // ---- row compaction ---------------------------------------------------

    /// Copy row `src` over row `dst` in every present row-shaped item, for
    /// squashing flagged or duplicate rows before a truncate.
    pub fn copy_row(&mut self, src: usize, dst: usize) -> VisbufResult<()> {
        self.policy.check_mutate()?;
        for item in self.registry.iter_mut() {
            item.copy_row(src, dst)?;
        }
        Ok(())
    }

    // ---- correlation order ------------------------------------------------

    /// Rotate every present 4-plane correlation item from natural to sorted
    /// order. Idempotent: a buffer already in sorted order is untouched.
    pub fn sort_correlations(&mut self) -> VisbufResult<()> {
        if self.correlations_sorted {
            return Ok(());
        }
        self.check_four_correlations()?;
        for item in self.registry.iter_mut() {
            item.sort_correlations()?;
        }
        self.correlations_sorted = true;
        Ok(())
    }

    /// Rotate every present 4-plane correlation item from sorted back to
    /// natural order. Idempotent.
    pub fn unsort_correlations(&mut self) -> VisbufResult<()> {
        if !self.correlations_sorted {
            return Ok(());
        }
        self.check_four_correlations()?;
        for item in self.registry.iter_mut() {
            item.unsort_correlations()?;
        }
        self.correlations_sorted = false;
        Ok(())
    }

    /// Whether the buffer's correlation items are currently in sorted
    /// order.
    pub fn are_correlations_sorted(&self) -> bool {
        self.correlations_sorted
    }

    fn check_four_correlations(&self) -> VisbufResult<()> {
        if self.dims.ncorrelations() != 4 {
            visbuf_bail!(
                "correlation reordering requires exactly 4 correlations, buffer has {}",
                self.dims.ncorrelations()
            );
        }
        Ok(())
    }
}

fn scalar_item<'a, T: Default + 'static>(
    registry: &'a mut CacheRegistry,
    field: FieldId,
) -> VisbufResult<&'a mut ScalarItem<T>> {
    registry
        .item_mut(field)?
        .as_any_mut()
        .downcast_mut::<ScalarItem<T>>()
        .ok_or_else(|| visbuf_err!(WrongItemType: field, type_name::<T>()))
}

fn tensor_item<'a, T: Copy + Default + 'static>(
    registry: &'a mut CacheRegistry,
    field: FieldId,
) -> VisbufResult<&'a mut TensorItem<T>> {
    registry
        .item_mut(field)?
        .as_any_mut()
        .downcast_mut::<TensorItem<T>>()
        .ok_or_else(|| visbuf_err!(WrongItemType: field, type_name::<Tensor<T>>()))
}
