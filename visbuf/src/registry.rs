use itertools::Itertools;
use visbuf_error::{VisbufResult, visbuf_bail};

use crate::{CacheItem, FieldId, ShapeOracle};

/// The insertion-ordered collection of every cache item of one buffer.
///
/// The registry owns its items; bulk operations run in registration order,
/// but each item's outcome depends only on itself and the oracle, so the
/// order never changes the effect.
#[derive(Default)]
pub struct CacheRegistry {
    items: Vec<Box<dyn CacheItem>>,
}

impl CacheRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Each field may be registered at most once.
    pub fn register(&mut self, item: Box<dyn CacheItem>) -> VisbufResult<()> {
        let field = item.field();
        if self.contains(field) {
            visbuf_bail!("field {} is already registered", field);
        }
        self.items.push(item);
        Ok(())
    }

    /// Whether `field` has been registered.
    pub fn contains(&self, field: FieldId) -> bool {
        self.items.iter().any(|item| item.field() == field)
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up one item.
    pub fn item(&self, field: FieldId) -> VisbufResult<&dyn CacheItem> {
        self.items
            .iter()
            .find(|item| item.field() == field)
            .map(AsRef::as_ref)
            .ok_or_else(|| visbuf_error::visbuf_err!(NoSuchField: field))
    }

    /// Look up one item mutably.
    pub fn item_mut(&mut self, field: FieldId) -> VisbufResult<&mut (dyn CacheItem + 'static)> {
        self.items
            .iter_mut()
            .find(|item| item.field() == field)
            .map(AsMut::as_mut)
            .ok_or_else(|| visbuf_error::visbuf_err!(NoSuchField: field))
    }

    /// Iterate over the items in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn CacheItem> {
        self.items.iter().map(AsRef::as_ref)
    }

    /// Iterate mutably over the items in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn CacheItem>> {
        self.items.iter_mut()
    }

    /// Forward a row append/truncate to every item.
    pub fn append_rows(
        &mut self,
        oracle: &dyn ShapeOracle,
        n: usize,
        truncate: bool,
    ) -> VisbufResult<()> {
        for item in &mut self.items {
            item.append_rows(oracle, n, truncate)?;
        }
        Ok(())
    }

    /// Forward a row resize to every item.
    pub fn resize_rows(&mut self, oracle: &dyn ShapeOracle, rows: usize) -> VisbufResult<()> {
        for item in &mut self.items {
            item.resize_rows(oracle, rows)?;
        }
        Ok(())
    }

    /// Clear every item; see [`CacheItem::clear`].
    pub fn clear_all(&mut self, status_only: bool) {
        for item in &mut self.items {
            item.clear(status_only);
        }
    }

    /// Mark every item clean, after a bulk write-back.
    pub fn clear_dirty_all(&mut self) {
        for item in &mut self.items {
            item.clear_dirty();
        }
    }

    /// The identities of all currently dirty items, in registration order.
    pub fn dirty_fields(&self) -> Vec<FieldId> {
        let dirty: Vec<FieldId> = self
            .items
            .iter()
            .filter(|item| item.is_dirty())
            .map(|item| item.field())
            .collect();
        if !dirty.is_empty() {
            log::debug!("dirty fields: {}", dirty.iter().format(", "));
        }
        dirty
    }

    /// The identities of all currently present items, in registration
    /// order.
    pub fn present_fields(&self) -> Vec<FieldId> {
        self.items
            .iter()
            .filter(|item| item.is_present())
            .map(|item| item.field())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use visbuf_tensor::Tensor;

    use crate::{
        BufferDims, CacheRegistry, FieldId, ScalarItem, TensorItem, WritePolicy,
    };

    fn registry() -> CacheRegistry {
        let mut registry = CacheRegistry::new();
        registry
            .register(Box::new(ScalarItem::<i32>::new(FieldId::NChannels, None)))
            .unwrap();
        registry
            .register(Box::new(TensorItem::<bool>::new(FieldId::FlagRow, None)))
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register(Box::new(ScalarItem::<i32>::new(FieldId::NChannels, None)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: field nChannels is already registered"
        );
    }

    #[test]
    fn dirty_fields_in_registration_order() {
        let mut registry = registry();
        let oracle = BufferDims::new(2, 8, 4, 3);

        assert!(registry.dirty_fields().is_empty());

        registry
            .item_mut(FieldId::FlagRow)
            .unwrap()
            .as_any_mut()
            .downcast_mut::<TensorItem<bool>>()
            .unwrap()
            .set(
                Tensor::from_rank1(vec![false, true]),
                &oracle,
                WritePolicy::WRITABLE,
            )
            .unwrap();
        registry
            .item_mut(FieldId::NChannels)
            .unwrap()
            .as_any_mut()
            .downcast_mut::<ScalarItem<i32>>()
            .unwrap()
            .set(8, WritePolicy::WRITABLE)
            .unwrap();

        assert_eq!(
            registry.dirty_fields(),
            vec![FieldId::NChannels, FieldId::FlagRow]
        );
        assert_eq!(registry.present_fields(), registry.dirty_fields());

        registry.clear_dirty_all();
        assert!(registry.dirty_fields().is_empty());
        assert_eq!(registry.present_fields().len(), 2);
    }

    #[test]
    fn clear_all_empties_every_item() {
        let mut registry = registry();
        registry
            .item_mut(FieldId::NChannels)
            .unwrap()
            .as_any_mut()
            .downcast_mut::<ScalarItem<i32>>()
            .unwrap()
            .set(8, WritePolicy::WRITABLE)
            .unwrap();

        registry.clear_all(false);
        assert!(registry.present_fields().is_empty());
        assert!(registry.dirty_fields().is_empty());
    }
}
