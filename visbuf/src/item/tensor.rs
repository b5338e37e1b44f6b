use std::any::Any;

use visbuf_error::{VisbufError, VisbufResult, visbuf_err};
use visbuf_tensor::Tensor;

use crate::item::fillable_cursor;
use crate::{
    CacheItem, FieldId, FieldSpec, RowCursor, ShapeOracle, TensorFiller, WritePolicy,
    sort_correlation_planes, unsort_correlation_planes,
};

/// Cache item for a tensor-valued field.
///
/// On top of the scalar lifecycle this validates every fill and set against
/// the shape the oracle currently dictates, and participates in the
/// row-structural operations the buffer applies when its dimensions change.
pub struct TensorItem<T> {
    spec: FieldSpec,
    value: Tensor<T>,
    present: bool,
    dirty: bool,
    filler: Option<TensorFiller<T>>,
}

impl<T: Copy + Default + 'static> TensorItem<T> {
    /// A new, empty item for `field`, with an optional fill callback.
    pub fn new(field: FieldId, filler: Option<TensorFiller<T>>) -> Self {
        Self {
            spec: field.spec(),
            value: Tensor::empty(),
            present: false,
            dirty: false,
            filler,
        }
    }

    /// Fetch the value from the cursor. The tensor is pre-sized to the
    /// expected shape, the callback populates it, and the result is
    /// re-validated. All-or-nothing: on any failure the item is left empty.
    pub fn fill(
        &mut self,
        cursor: Option<&mut dyn RowCursor>,
        oracle: &dyn ShapeOracle,
    ) -> VisbufResult<()> {
        let cursor = fillable_cursor(cursor, &self.spec)?;
        if let Some(expected) = oracle.expected_shape(self.spec.pattern) {
            self.value = Tensor::zeroed(expected);
        }
        let result = match self.filler.as_ref() {
            Some(filler) => filler(cursor, &mut self.value),
            None => Err(visbuf_err!(
                "no fill callback registered for field {}",
                self.spec.id
            )),
        };
        if let Err(e) = result {
            self.clear(false);
            return Err(e);
        }
        if let Err(e) = self.check_shape(oracle) {
            self.clear(false);
            return Err(e);
        }
        self.present = true;
        self.dirty = false;
        log::trace!("filled tensor field {}", self.spec.id);
        Ok(())
    }

    /// Read the value, filling it first if absent.
    pub fn get(
        &mut self,
        cursor: Option<&mut dyn RowCursor>,
        oracle: &dyn ShapeOracle,
    ) -> VisbufResult<&Tensor<T>> {
        if !self.present {
            self.fill(cursor, oracle)?;
        }
        Ok(&self.value)
    }

    /// Mutable access to the value. An absent item is either filled
    /// (`fill_if_absent`) or pre-sized to the expected shape, zeroed, so the
    /// caller always writes into correctly shaped storage. Always marks the
    /// item present and dirty.
    pub fn get_mut(
        &mut self,
        cursor: Option<&mut dyn RowCursor>,
        oracle: &dyn ShapeOracle,
        policy: WritePolicy,
        fill_if_absent: bool,
    ) -> VisbufResult<&mut Tensor<T>> {
        policy.check_mutate()?;
        if !self.present {
            if fill_if_absent {
                self.fill(cursor, oracle)?;
            } else if let Some(expected) = oracle.expected_shape(self.spec.pattern) {
                self.value = Tensor::zeroed(expected);
            }
        }
        self.present = true;
        self.dirty = true;
        Ok(&mut self.value)
    }

    /// Replace the value outright. The new value's shape must agree with
    /// the oracle; on any failure the prior state is untouched.
    pub fn set(
        &mut self,
        value: Tensor<T>,
        oracle: &dyn ShapeOracle,
        policy: WritePolicy,
    ) -> VisbufResult<()> {
        policy.check_set(&self.spec)?;
        if let Some(expected) = oracle.expected_shape(self.spec.pattern) {
            if value.shape() != &expected {
                return Err(VisbufError::shape_mismatch(
                    self.spec.id,
                    expected,
                    value.shape(),
                ));
            }
        }
        self.value = value;
        self.present = true;
        self.dirty = true;
        Ok(())
    }

    /// The cached value, if present.
    pub fn value(&self) -> Option<&Tensor<T>> {
        self.present.then_some(&self.value)
    }

    fn check_shape(&self, oracle: &dyn ShapeOracle) -> VisbufResult<()> {
        if let Some(expected) = oracle.expected_shape(self.spec.pattern) {
            if self.value.shape() != &expected {
                return Err(VisbufError::shape_mismatch(
                    self.spec.id,
                    expected,
                    self.value.shape(),
                ));
            }
        }
        Ok(())
    }
}

impl<T: Copy + Default + 'static> CacheItem for TensorItem<T> {
    fn spec(&self) -> FieldSpec {
        self.spec
    }

    fn is_present(&self) -> bool {
        self.present
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn clear(&mut self, status_only: bool) {
        if !status_only {
            self.value = Tensor::empty();
        }
        self.present = false;
        self.dirty = false;
    }

    fn is_shape_ok(&self, oracle: &dyn ShapeOracle) -> bool {
        !self.present || self.check_shape(oracle).is_ok()
    }

    fn append_rows(
        &mut self,
        _oracle: &dyn ShapeOracle,
        n: usize,
        truncate: bool,
    ) -> VisbufResult<()> {
        if !self.spec.pattern.tracks_rows() || !self.present || self.value.is_empty() {
            return Ok(());
        }
        if truncate {
            self.value.truncate_rows(n)
        } else {
            self.value.grow_rows(n);
            Ok(())
        }
    }

    fn resize_rows(&mut self, _oracle: &dyn ShapeOracle, rows: usize) -> VisbufResult<()> {
        if !self.spec.pattern.tracks_rows() || !self.present {
            return Ok(());
        }
        self.value.resize_rows(rows)?;
        self.dirty = true;
        Ok(())
    }

    fn resize(&mut self, oracle: &dyn ShapeOracle, copy_values: bool) -> VisbufResult<()> {
        if !self.present {
            return Ok(());
        }
        let Some(expected) = oracle.expected_shape(self.spec.pattern) else {
            return Ok(());
        };
        self.value.resize(expected, copy_values);
        Ok(())
    }

    fn copy_row(&mut self, src: usize, dst: usize) -> VisbufResult<()> {
        if !self.spec.pattern.tracks_rows() || !self.present {
            return Ok(());
        }
        self.value.copy_row(src, dst)?;
        self.dirty = true;
        Ok(())
    }

    fn sort_correlations(&mut self) -> VisbufResult<()> {
        if !self.spec.pattern.leads_with_correlations() || !self.present {
            return Ok(());
        }
        sort_correlation_planes(&mut self.value)
    }

    fn unsort_correlations(&mut self) -> VisbufResult<()> {
        if !self.spec.pattern.leads_with_correlations() || !self.present {
            return Ok(());
        }
        unsort_correlation_planes(&mut self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
