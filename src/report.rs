//! Structured findings handed to the presentation layer.
//!
//! The core only builds these values; formatting them for a console (or
//! anything else) is the consumer's business. Everything derives
//! `Serialize` so a report can also leave the process as JSON.

use serde::Serialize;

use crate::pe::types::Bitness;

/// Outcome of walking one directory.
///
/// `Absent` means the directory RVA was zero or pointed outside file data;
/// `Present` carries every entry up to the sentinel (possibly none);
/// `Truncated` carries what was read before the table ran out of image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableStatus<T> {
    Absent,
    Present(Vec<T>),
    Truncated(Vec<T>),
}

impl<T> TableStatus<T> {
    /// Entries read from the directory, regardless of how the walk ended.
    pub fn entries(&self) -> &[T] {
        match self {
            Self::Absent => &[],
            Self::Present(v) | Self::Truncated(v) => v,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// One resolved import-table slot: by ordinal or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ImportSymbol {
    /// Ordinal number with the flag bit already masked off.
    Ordinal(u64),
    Name(String),
}

/// Imports pulled in from a single DLL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DllImports {
    pub dll: String,
    pub symbols: Vec<ImportSymbol>,
}

/// One row of the section table, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub name: String,
    pub virtual_address: u32,
    pub virtual_size: u32,
    pub raw_offset: u32,
}

/// Full structural layout of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutReport {
    pub bitness: Bitness,
    pub sections: Vec<SectionSummary>,
    pub imports: TableStatus<DllImports>,
    pub bound_imports: TableStatus<String>,
    pub delay_imports: TableStatus<String>,
}

impl LayoutReport {
    /// Section names in file order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}
