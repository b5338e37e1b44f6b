use visbuf_error::{VisbufResult, visbuf_bail};

use crate::FieldSpec;

/// What the owning buffer permits its consumers to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WritePolicy {
    /// Whether any mutation is permitted at all.
    pub writable: bool,
    /// Whether key fields may be overwritten through `set`.
    pub rekeyable: bool,
}

impl WritePolicy {
    /// Every `set` and mutable access fails with `ReadOnly`.
    pub const READ_ONLY: Self = Self {
        writable: false,
        rekeyable: false,
    };

    /// Ordinary fields may be written; key fields stay protected.
    pub const WRITABLE: Self = Self {
        writable: true,
        rekeyable: false,
    };

    /// Everything may be written, key fields included.
    pub const REKEYABLE: Self = Self {
        writable: true,
        rekeyable: true,
    };

    /// Check that a mutable view may be handed out.
    pub(crate) fn check_mutate(&self) -> VisbufResult<()> {
        if !self.writable {
            visbuf_bail!(ReadOnly);
        }
        Ok(())
    }

    /// Check that `set` is permitted for the given field.
    pub(crate) fn check_set(&self, spec: &FieldSpec) -> VisbufResult<()> {
        self.check_mutate()?;
        if spec.key && !self.rekeyable {
            visbuf_bail!(RekeyNotAllowed: spec.id);
        }
        Ok(())
    }
}
