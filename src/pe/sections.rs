//! Section table construction and RVA translation.

use crate::error::Result;
use crate::pe::types::{DosHeader, NtHeaderView, SectionHeader, COFF_HEADER_SIZE};
use crate::pe::utils::{align_up, ImageRead};

/// Size on disk of one section record.
const SECTION_RECORD_SIZE: usize = 40;

/// Ordered list of sections with the RVA-to-file-offset translation
/// service every directory walker depends on.
///
/// Sections stay in file order; malformed images may carry unordered or
/// overlapping ranges, and translation picks the first match.
#[derive(Debug, Clone)]
pub struct SectionTable {
    sections: Vec<SectionHeader>,
    alignment: u32,
}

impl SectionTable {
    /// Create a table from already-parsed records, preserving file order.
    pub fn new(sections: Vec<SectionHeader>, alignment: u32) -> Self {
        Self {
            sections,
            alignment,
        }
    }

    /// Read `number_of_sections` consecutive records starting immediately
    /// after the NT header (whose size depends on bitness via
    /// `size_of_optional_header`).
    pub fn build(data: &[u8], dos: &DosHeader, nt: &NtHeaderView) -> Result<Self> {
        let table_offset = dos.e_lfanew as usize
            + 4
            + COFF_HEADER_SIZE
            + nt.size_of_optional_header as usize;

        let mut sections = Vec::with_capacity(nt.number_of_sections as usize);
        for i in 0..nt.number_of_sections as usize {
            let offset = table_offset + i * SECTION_RECORD_SIZE;
            let mut name = [0u8; 8];
            name.copy_from_slice(data.read_bytes_at(offset, 8)?);

            sections.push(SectionHeader {
                name,
                virtual_size: data.read_u32_at(offset + 8)?,
                virtual_address: data.read_u32_at(offset + 12)?,
                size_of_raw_data: data.read_u32_at(offset + 16)?,
                pointer_to_raw_data: data.read_u32_at(offset + 20)?,
            });
        }

        Ok(Self::new(sections, nt.section_alignment))
    }

    /// All sections in file order.
    pub fn sections(&self) -> &[SectionHeader] {
        &self.sections
    }

    /// Index of the first section whose aligned virtual range contains
    /// `rva`.
    pub fn find_section(&self, rva: u32) -> Option<usize> {
        self.sections.iter().position(|s| {
            let start = s.virtual_address;
            let span = align_up(s.virtual_size, self.alignment);
            rva >= start && rva < start.saturating_add(span)
        })
    }

    /// Translate an RVA into a raw file offset.
    ///
    /// `None` means the RVA is not backed by file data; callers treat that
    /// as "table absent", never as an error to propagate.
    pub fn rva_to_offset(&self, rva: u32) -> Option<u32> {
        let section = &self.sections[self.find_section(rva)?];
        Some(rva - section.virtual_address + section.pointer_to_raw_data)
    }
}
