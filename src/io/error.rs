//! Custom error types for the I/O module.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("file size of {found} bytes exceeds the maximum allowed size of {limit} bytes")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("an underlying I/O error occurred")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
