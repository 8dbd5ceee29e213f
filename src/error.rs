use thiserror::Error;

use crate::VarId;

/// The result of a library compilation operation.
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Error returned when a library compilation operation failed.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// The cell record is inconsistent (pins, outputs and sequential info do not agree).
    #[error("invalid cell {cell:?}: {reason}")]
    InvalidCell { cell: String, reason: String },

    /// An expression refers to a variable the function does not have.
    #[error("variable {var} is out of range for a function of {input_num} inputs")]
    VarOutOfRange { var: VarId, input_num: usize },

    /// Only single-output, non-tristate, pure logic signatures have an NPN canonical form.
    /// See [`Signature::is_canonicalizable`].
    ///
    /// [`Signature::is_canonicalizable`]: crate::Signature::is_canonicalizable
    #[error("signature is not eligible for NPN canonicalization")]
    NotCanonicalizable,

    /// The arrays handed to [`Snapshot::from_raw`] do not describe a valid snapshot.
    ///
    /// [`Snapshot::from_raw`]: crate::Snapshot::from_raw
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
