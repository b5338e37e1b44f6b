//! End-to-end tests of the buffer cache: lazy fill, dirty tracking,
//! dimension changes, correlation ordering and write-back.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

use visbuf::{BufferCache, BufferDims, FillStatus, RowCursor, WritePolicy};

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| {
        let _ = simplelog::SimpleLogger::init(
            simplelog::LevelFilter::Debug,
            simplelog::Config::default(),
        );
    });
}

/// A cursor that is always ready.
struct ReadyCursor;

impl RowCursor for ReadyCursor {
    fn fill_status(&self) -> FillStatus {
        FillStatus::Ready
    }
}

/// A cursor that cannot currently supply data.
struct BlockedCursor;

impl RowCursor for BlockedCursor {
    fn fill_status(&self) -> FillStatus {
        FillStatus::Blocked("row-group is mid-write".to_string())
    }
}

fn standard_cache(nrows: usize, policy: WritePolicy) -> BufferCache {
    init_logging();
    BufferCache::standard(BufferDims::new(nrows, 8, 4, 3), policy)
}

#[cfg(test)]
mod tests {
    use visbuf::{Complex, FieldId, ScalarFiller, Tensor, TensorFiller, VisbufError};

    use super::*;

    #[test]
    fn scenario_row_count_and_flags() {
        // One scalar field and one per-row array field over a buffer that
        // starts with zero rows.
        init_logging();
        let mut cache = BufferCache::new(BufferDims::new(0, 1, 1, 1), WritePolicy::WRITABLE);
        cache.register_scalar::<i32>(FieldId::NRows, None).unwrap();
        cache.register_tensor::<bool>(FieldId::FlagRow, None).unwrap();

        cache.append_rows(3, false).unwrap();
        cache
            .set_tensor(FieldId::FlagRow, Tensor::from_rank1(vec![false, false, false]))
            .unwrap();
        assert_eq!(
            cache.tensor::<bool>(FieldId::FlagRow).unwrap().as_slice(),
            &[false, false, false]
        );

        cache.append_rows(2, false).unwrap();
        let flags = cache.tensor::<bool>(FieldId::FlagRow).unwrap();
        assert_eq!(flags.shape().dims(), &[5]);
        assert_eq!(&flags.as_slice()[..3], &[false, false, false]);
    }

    #[test]
    fn fill_happens_at_most_once() {
        init_logging();
        let mut cache = BufferCache::new(BufferDims::new(2, 8, 4, 3), WritePolicy::READ_ONLY);
        let fills = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&fills);
        let filler: TensorFiller<f64> = Box::new(move |_, t| {
            counter.set(counter.get() + 1);
            t.as_mut_slice().copy_from_slice(&[4.5e9, 4.5e9 + 10.0]);
            Ok(())
        });
        cache.register_tensor(FieldId::Time, Some(filler)).unwrap();
        cache.attach(Box::new(ReadyCursor));

        assert_eq!(
            cache.tensor::<f64>(FieldId::Time).unwrap().as_slice(),
            &[4.5e9, 4.5e9 + 10.0]
        );
        let _ = cache.tensor::<f64>(FieldId::Time).unwrap();
        assert_eq!(fills.get(), 1);

        // Repositioning invalidates the cache; the next read fills again.
        cache.clear_all(false);
        let _ = cache.tensor::<f64>(FieldId::Time).unwrap();
        assert_eq!(fills.get(), 2);
    }

    #[test]
    fn scalar_fill_through_cursor() {
        init_logging();
        let mut cache = BufferCache::new(BufferDims::new(2, 8, 4, 3), WritePolicy::READ_ONLY);
        let filler: ScalarFiller<i32> = Box::new(|_, v| {
            *v = 64;
            Ok(())
        });
        cache.register_scalar(FieldId::NChannels, Some(filler)).unwrap();

        assert!(matches!(
            cache.scalar::<i32>(FieldId::NChannels).unwrap_err(),
            VisbufError::NotAttached
        ));

        cache.attach(Box::new(BlockedCursor));
        assert!(matches!(
            cache.scalar::<i32>(FieldId::NChannels).unwrap_err(),
            VisbufError::NotFillable(d) if d == "row-group is mid-write"
        ));

        cache.attach(Box::new(ReadyCursor));
        assert_eq!(cache.scalar::<i32>(FieldId::NChannels).unwrap(), &64);
    }

    #[test]
    fn write_back_flow() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);

        cache.tensor_mut::<f32>(FieldId::Sigma, false).unwrap()[0] = 0.5;
        cache
            .tensor_mut::<f32>(FieldId::Weight, false)
            .unwrap()
            .as_mut_slice()
            .fill(2.0);
        assert_eq!(
            cache.dirty_fields(),
            vec![FieldId::Sigma, FieldId::Weight]
        );

        // The collaborator persists sigma and marks it clean.
        cache.clear_dirty(FieldId::Sigma).unwrap();
        assert_eq!(cache.dirty_fields(), vec![FieldId::Weight]);
        assert!(cache.is_present(FieldId::Sigma).unwrap());

        cache.clear_dirty_all();
        assert!(cache.dirty_fields().is_empty());

        // A collaborator scanning the registry directly sees the same
        // presence the typed surface reports.
        assert_eq!(
            cache.registry().present_fields(),
            vec![FieldId::Sigma, FieldId::Weight]
        );
        assert!(cache.registry().contains(FieldId::VisCube));
    }

    #[test]
    fn read_only_buffers_reject_every_mutation() {
        let mut cache = standard_cache(2, WritePolicy::READ_ONLY);
        assert!(matches!(
            cache.tensor_mut::<i32>(FieldId::Scan, false).unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(matches!(
            cache.tensor_mut::<bool>(FieldId::FlagRow, false).unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(matches!(
            cache.scalar_mut::<i32>(FieldId::NChannels, false).unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(matches!(
            cache
                .set_tensor(FieldId::Scan, Tensor::from_rank1(vec![1i32, 2]))
                .unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(matches!(
            cache.set_scalar(FieldId::NChannels, 8i32).unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(matches!(
            cache.copy_row(0, 1).unwrap_err(),
            VisbufError::ReadOnly
        ));
        assert!(!cache.is_present(FieldId::Scan).unwrap());
        assert!(!cache.is_dirty(FieldId::Scan).unwrap());
    }

    #[test]
    fn key_fields_require_rekey_permission() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);
        let err = cache
            .set_tensor(FieldId::Antenna1, Tensor::from_rank1(vec![0i32, 1]))
            .unwrap_err();
        assert!(matches!(err, VisbufError::RekeyNotAllowed(f) if f == "antenna1"));
        assert!(!cache.is_present(FieldId::Antenna1).unwrap());

        let mut rekeyable = standard_cache(2, WritePolicy::REKEYABLE);
        rekeyable
            .set_tensor(FieldId::Antenna1, Tensor::from_rank1(vec![0i32, 1]))
            .unwrap();
        assert!(rekeyable.is_dirty(FieldId::Antenna1).unwrap());
    }

    #[test]
    fn shape_rejection_reports_both_shapes() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);
        let err = cache
            .set_tensor(FieldId::Weight, Tensor::<f32>::zeroed([4, 3]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "shape mismatch for weight: expected [4, 2], actual [4, 3]"
        );
    }

    #[test]
    fn typed_access_checks_element_type() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);
        assert!(matches!(
            cache.tensor::<f32>(FieldId::Time).unwrap_err(),
            VisbufError::WrongItemType { .. }
        ));
        assert!(matches!(
            cache.scalar::<i32>(FieldId::Time).unwrap_err(),
            VisbufError::WrongItemType { .. }
        ));
    }

    #[test]
    fn correlation_sorting_is_idempotent_per_direction() {
        let mut cache = standard_cache(1, WritePolicy::WRITABLE);
        let natural: Vec<Complex> = (0..4 * 8)
            .map(|i| {
                let v = i as f32;
                [v, -v]
            })
            .collect();
        cache
            .set_tensor(
                FieldId::VisCube,
                Tensor::from_parts([4, 8, 1], natural.clone()).unwrap(),
            )
            .unwrap();

        cache.sort_correlations().unwrap();
        assert!(cache.are_correlations_sorted());
        let sorted = cache.tensor::<Complex>(FieldId::VisCube).unwrap().clone();
        assert_eq!(&sorted.as_slice()[..4], &[[0.0, -0.0], [2.0, -2.0], [3.0, -3.0], [1.0, -1.0]]);

        // Sorting again must not rotate a second time.
        cache.sort_correlations().unwrap();
        assert_eq!(cache.tensor::<Complex>(FieldId::VisCube).unwrap(), &sorted);

        cache.unsort_correlations().unwrap();
        assert!(!cache.are_correlations_sorted());
        assert_eq!(
            cache.tensor::<Complex>(FieldId::VisCube).unwrap().as_slice(),
            natural.as_slice()
        );
    }

    #[test]
    fn channel_count_change_restores_shape_invariant() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);
        cache
            .set_tensor(FieldId::FlagCube, Tensor::<bool>::zeroed([4, 8, 2]))
            .unwrap();

        cache.set_channel_count(16, false).unwrap();
        assert!(cache.all_shapes_ok());
        assert_eq!(
            cache
                .tensor::<bool>(FieldId::FlagCube)
                .unwrap()
                .shape()
                .dims(),
            &[4, 16, 2]
        );
    }

    #[test]
    fn row_compaction_then_truncate() {
        let mut cache = standard_cache(3, WritePolicy::WRITABLE);
        cache
            .set_tensor(FieldId::Scan, Tensor::from_rank1(vec![10i32, 20, 30]))
            .unwrap();
        cache
            .set_tensor(
                FieldId::FlagRow,
                Tensor::from_rank1(vec![false, true, false]),
            )
            .unwrap();

        // Row 1 is flagged: squash row 2 into it, then drop the tail.
        cache.copy_row(2, 1).unwrap();
        cache.append_rows(2, true).unwrap();

        assert_eq!(
            cache.tensor::<i32>(FieldId::Scan).unwrap().as_slice(),
            &[10, 30]
        );
        assert_eq!(
            cache.tensor::<bool>(FieldId::FlagRow).unwrap().as_slice(),
            &[false, false]
        );
        assert_eq!(cache.dims().nrows(), 2);
        assert!(cache.all_shapes_ok());
    }

    #[test]
    fn detach_invalidates_everything() {
        let mut cache = standard_cache(2, WritePolicy::WRITABLE);
        cache.attach(Box::new(ReadyCursor));
        cache
            .set_tensor(FieldId::FlagRow, Tensor::from_rank1(vec![true, true]))
            .unwrap();
        assert!(cache.is_attached());

        cache.detach();
        assert!(!cache.is_attached());
        assert!(!cache.is_present(FieldId::FlagRow).unwrap());
        assert!(cache.dirty_fields().is_empty());
    }
}
