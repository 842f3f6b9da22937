//! Bounded loading of image files.
//!
//! The analysis core never opens files itself; this module owns that
//! concern. A file is memory-mapped, checked against `IoLimits`, and handed
//! over as an owning `ImageBuffer` that lives for the duration of a single
//! analysis run. Every downstream component borrows the bytes; nothing is
//! copied again after the load.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, warn};

/// Defines the resource limits for loading an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
}

impl Default for IoLimits {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256MB
        }
    }
}

/// Owns the raw bytes of one image for the lifetime of the analysis.
///
/// All other entities hold offsets into this buffer; none of them copy or
/// mutate it.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    bytes: Bytes,
}

impl ImageBuffer {
    /// Opens a file, memory-maps it, and captures its contents.
    ///
    /// Fails with `IoError::FileTooLarge` if the file size exceeds
    /// `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: &IoLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limit = limits.max_file_size,
            "Loading image"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        // Zero-length files cannot be mapped; they still load as an empty
        // buffer and are rejected later by the DOS header parse.
        let bytes = if file_size == 0 {
            Bytes::new()
        } else {
            // Safety: read-only map of a regular file we just opened.
            let mmap = unsafe { Mmap::map(&file)? };
            Bytes::copy_from_slice(&mmap)
        };

        Ok(Self { bytes })
    }

    /// Wraps an in-memory byte sequence, bypassing the filesystem.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Total image length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no data at all.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Borrow the raw bytes for parsing.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}
