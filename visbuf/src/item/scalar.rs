use std::any::Any;

use visbuf_error::{VisbufResult, visbuf_err};

use crate::item::fillable_cursor;
use crate::{CacheItem, FieldId, FieldSpec, RowCursor, ScalarFiller, ShapeOracle, WritePolicy};

/// Cache item for a single value of type `T`.
///
/// Scalars have no shape concerns: row-count changes are no-ops, and `set`
/// succeeds on any writable (and, for key fields, rekeyable) buffer.
pub struct ScalarItem<T> {
    spec: FieldSpec,
    value: T,
    present: bool,
    dirty: bool,
    filler: Option<ScalarFiller<T>>,
}

impl<T: Default + 'static> ScalarItem<T> {
    /// A new, empty item for `field`, with an optional fill callback.
    pub fn new(field: FieldId, filler: Option<ScalarFiller<T>>) -> Self {
        Self {
            spec: field.spec(),
            value: T::default(),
            present: false,
            dirty: false,
            filler,
        }
    }

    /// Fetch the value from the cursor. All-or-nothing: on any failure the
    /// item is left empty.
    pub fn fill(&mut self, cursor: Option<&mut dyn RowCursor>) -> VisbufResult<()> {
        let cursor = fillable_cursor(cursor, &self.spec)?;
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
        self.present = true;
        self.dirty = false;
        log::trace!("filled scalar field {}", self.spec.id);
        Ok(())
    }

    /// Read the value, filling it first if absent.
    pub fn get(&mut self, cursor: Option<&mut dyn RowCursor>) -> VisbufResult<&T> {
        if !self.present {
            self.fill(cursor)?;
        }
        Ok(&self.value)
    }

    /// Mutable access to the value. Always marks the item present and
    /// dirty: the borrow escapes the cache's control, so it must assume a
    /// modification.
    pub fn get_mut(
        &mut self,
        cursor: Option<&mut dyn RowCursor>,
        policy: WritePolicy,
        fill_if_absent: bool,
    ) -> VisbufResult<&mut T> {
        policy.check_mutate()?;
        if !self.present && fill_if_absent {
            self.fill(cursor)?;
        }
        self.present = true;
        self.dirty = true;
        Ok(&mut self.value)
    }

    /// Replace the value outright.
    pub fn set(&mut self, value: T, policy: WritePolicy) -> VisbufResult<()> {
        policy.check_set(&self.spec)?;
        self.value = value;
        self.present = true;
        self.dirty = true;
        Ok(())
    }

    /// The cached value, if present.
    pub fn value(&self) -> Option<&T> {
        self.present.then_some(&self.value)
    }
}

impl<T: Default + 'static> CacheItem for ScalarItem<T> {
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
            self.value = T::default();
        }
        self.present = false;
        self.dirty = false;
    }

    fn is_shape_ok(&self, _oracle: &dyn ShapeOracle) -> bool {
        true
    }

    fn append_rows(
        &mut self,
        _oracle: &dyn ShapeOracle,
        _n: usize,
        _truncate: bool,
    ) -> VisbufResult<()> {
        Ok(())
    }

    fn resize_rows(&mut self, _oracle: &dyn ShapeOracle, _rows: usize) -> VisbufResult<()> {
        Ok(())
    }

    fn resize(&mut self, _oracle: &dyn ShapeOracle, _copy_values: bool) -> VisbufResult<()> {
        Ok(())
    }

    fn copy_row(&mut self, _src: usize, _dst: usize) -> VisbufResult<()> {
        Ok(())
    }

    fn sort_correlations(&mut self) -> VisbufResult<()> {
        Ok(())
    }

    fn unsort_correlations(&mut self) -> VisbufResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
