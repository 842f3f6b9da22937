//! Structural inspection of Portable Executable images.
//!
//! The crate takes a byte buffer holding a PE image and reports its
//! layout: bit width, section table, and the standard, bound, and
//! delay-load import directories. The core of the work is address
//! translation (RVA to file offset through the section table) and safe
//! traversal of self-describing tables inside an untrusted buffer.
//!
//! Parsing is strictly read-only and single-pass per query; presentation
//! is left to the caller of [`pe::inspect`], which returns a
//! [`report::LayoutReport`].

pub mod error;
pub mod io;
pub mod logging;
pub mod pe;
pub mod report;

pub use error::{PeError, Result};
pub use pe::{inspect, PeImage};
pub use report::LayoutReport;
