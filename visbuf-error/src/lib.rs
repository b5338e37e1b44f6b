#![deny(missing_docs)]

//! Error types and macros shared by every Visbuf crate.
//!
//! All fallible operations in the workspace return [`VisbufResult`]. Errors
//! are local to the operation that raised them: the cache never retries
//! internally, and a failed operation leaves the touched item in its prior
//! state.

use std::fmt::Display;

mod ext;

pub use ext::*;

/// The workspace-wide error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum VisbufError {
    /// The buffer is not attached to a cursor, so nothing can be filled.
    #[error("buffer is not attached to a cursor")]
    NotAttached,

    /// A cursor is attached but cannot currently supply data. Carries the
    /// cursor's own diagnostic.
    #[error("cursor cannot supply data: {0}")]
    NotFillable(String),

    /// An array value's shape disagrees with the shape the buffer's
    /// dimensions dictate.
    #[error("shape mismatch for {field}: expected {expected}, actual {actual}")]
    ShapeMismatch {
        /// The field whose value was rejected.
        field: String,
        /// The shape the oracle currently dictates.
        expected: String,
        /// The shape of the offending value.
        actual: String,
    },

    /// A mutation was attempted on a non-writable buffer.
    #[error("buffer is not writable")]
    ReadOnly,

    /// A key field was assigned through the ordinary `set` path on a buffer
    /// that does not permit rekeying.
    #[error("cannot overwrite key field {0} on a non-rekeyable buffer")]
    RekeyNotAllowed(String),

    /// The requested field is not registered with the cache.
    #[error("no such field: {0}")]
    NoSuchField(String),

    /// A typed accessor was used with the wrong item or element type.
    #[error("field {field} is not cached as {requested}")]
    WrongItemType {
        /// The field that was looked up.
        field: String,
        /// The type the caller asked for.
        requested: String,
    },

    /// Catch-all for malformed arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// The workspace-wide result type.
pub type VisbufResult<T> = Result<T, VisbufError>;

impl VisbufError {
    /// Construct a [`VisbufError::ShapeMismatch`] from anything displayable.
    pub fn shape_mismatch(
        field: impl Display,
        expected: impl Display,
        actual: impl Display,
    ) -> Self {
        Self::ShapeMismatch {
            field: field.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Construct a [`VisbufError`], either from a labeled variant or as a plain
/// [`VisbufError::InvalidArgument`] with a format string.
#[macro_export]
macro_rules! visbuf_err {
    (NotAttached) => {
        $crate::VisbufError::NotAttached
    };
    (ReadOnly) => {
        $crate::VisbufError::ReadOnly
    };
    (NotFillable: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::VisbufError::NotFillable(format!($fmt $(, $arg)*))
    };
    (RekeyNotAllowed: $field:expr) => {
        $crate::VisbufError::RekeyNotAllowed($field.to_string())
    };
    (NoSuchField: $field:expr) => {
        $crate::VisbufError::NoSuchField($field.to_string())
    };
    (ShapeMismatch: $field:expr, $expected:expr, $actual:expr) => {
        $crate::VisbufError::shape_mismatch($field, $expected, $actual)
    };
    (WrongItemType: $field:expr, $requested:expr) => {
        $crate::VisbufError::WrongItemType {
            field: $field.to_string(),
            requested: $requested.to_string(),
        }
    };
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::VisbufError::InvalidArgument(format!($fmt $(, $arg)*))
    };
}

/// Return early with a [`VisbufError`], see [`visbuf_err!`] for the accepted
/// forms.
#[macro_export]
macro_rules! visbuf_bail {
    ($($tt:tt)+) => {
        return Err($crate::visbuf_err!($($tt)+))
    };
}

/// Panic with a [`VisbufError`]. Reserved for invariant violations that
/// indicate a bug rather than bad input.
#[macro_export]
macro_rules! visbuf_panic {
    ($($tt:tt)+) => {{
        #[allow(clippy::panic)]
        {
            panic!("{}", $crate::visbuf_err!($($tt)+))
        }
    }};
}
