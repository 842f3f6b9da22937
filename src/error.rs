//! Error types for PE layout analysis.
//!
//! The taxonomy is deliberately small: the two signature failures abort the
//! whole analysis, while the two traversal failures are scoped to the single
//! directory being walked.

use thiserror::Error;

/// Main error type for analysis operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeError {
    /// The buffer does not carry a PE signature where one is required.
    #[error("not a PE image: signature {found:#06x}")]
    NotPeImage { found: u16 },

    /// The optional-header magic names neither PE32 nor PE32+.
    #[error("unsupported optional header magic: {magic:#06x}")]
    UnknownBitness { magic: u16 },

    /// A structured read would run past the end of the image.
    #[error("read of {len} bytes at offset {offset:#x} exceeds image size {size:#x}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },

    /// A directory walk reached the end of the image without its sentinel.
    #[error("{table} table ran out of image data before its terminator")]
    TruncatedTable { table: &'static str },
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, PeError>;
