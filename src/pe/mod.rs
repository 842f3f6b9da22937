//! Unified PE layout inspection.
//!
//! `PeImage` parses the headers and section table once up front; the
//! fatal failures (`NotPeImage`, `UnknownBitness`, header reads out of
//! bounds) all surface there. Directory walks afterwards can only degrade
//! their own table in the report, never the analysis.

pub mod headers;
pub mod imports;
pub mod sections;
pub mod types;
pub mod utils;

use tracing::debug;

use crate::error::Result;
use crate::report::{LayoutReport, SectionSummary};
use headers::{parse_dos_header, parse_nt_header, probe_bitness};
use imports::ImportDirectoryReader;
use sections::SectionTable;
use types::{Bitness, DosHeader, NtHeaderView};

/// A parsed view over one PE image buffer.
pub struct PeImage<'data> {
    data: &'data [u8],
    dos: DosHeader,
    nt: NtHeaderView,
    sections: SectionTable,
}

impl<'data> PeImage<'data> {
    /// Parse the DOS header, probe the bit width, and read the NT header
    /// and section table.
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let dos = parse_dos_header(data)?;
        let bitness = probe_bitness(data, &dos)?;
        let nt = parse_nt_header(data, &dos, bitness)?;
        let sections = SectionTable::build(data, &dos, &nt)?;

        debug!(
            bitness = bitness.label(),
            sections = nt.number_of_sections,
            "parsed image headers"
        );

        Ok(Self {
            data,
            dos,
            nt,
            sections,
        })
    }

    /// Pointer width of the image.
    pub fn bitness(&self) -> Bitness {
        self.nt.bitness
    }

    /// Parsed DOS header.
    pub fn dos_header(&self) -> &DosHeader {
        &self.dos
    }

    /// Parsed NT header view.
    pub fn nt_header(&self) -> &NtHeaderView {
        &self.nt
    }

    /// Section table with its translation service.
    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Convert an RVA to a file offset through the section table.
    pub fn rva_to_offset(&self, rva: u32) -> Option<u32> {
        self.sections.rva_to_offset(rva)
    }

    /// Walk every directory and collect the structural layout.
    ///
    /// Purely a read of the already-parsed image: running it twice on the
    /// same buffer yields identical reports.
    pub fn analyze(&self) -> LayoutReport {
        let reader = ImportDirectoryReader::new(self.data, &self.sections, &self.nt);

        LayoutReport {
            bitness: self.nt.bitness,
            sections: self
                .sections
                .sections()
                .iter()
                .map(|s| SectionSummary {
                    name: s.name(),
                    virtual_address: s.virtual_address,
                    virtual_size: s.virtual_size,
                    raw_offset: s.pointer_to_raw_data,
                })
                .collect(),
            imports: reader.standard_imports(),
            bound_imports: reader.bound_imports(),
            delay_imports: reader.delay_imports(),
        }
    }
}

/// Parse and analyze in one step.
pub fn inspect(data: &[u8]) -> Result<LayoutReport> {
    Ok(PeImage::parse(data)?.analyze())
}
