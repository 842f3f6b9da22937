//! DOS and NT header parsing.
//!
//! The bit width is probed once from the optional-header magic and then
//! threaded through every later parse; the 32- and 64-bit optional headers
//! share a prefix but diverge in field widths after it, so each layout is
//! read by its own arm rather than assuming one.

use crate::error::{PeError, Result};
use crate::pe::types::*;
use crate::pe::utils::ImageRead;

/// Parse the fixed-size DOS header at offset 0.
///
/// Fails with `NotPeImage` when the MZ signature is missing.
pub fn parse_dos_header(data: &[u8]) -> Result<DosHeader> {
    let e_magic = data.read_u16_at(0)?;
    if e_magic != DOS_SIGNATURE {
        return Err(PeError::NotPeImage { found: e_magic });
    }

    Ok(DosHeader {
        e_magic,
        e_lfanew: data.read_u32_at(60)?,
    })
}

/// Read the optional-header magic and classify the image bit width.
///
/// The magic sits at a fixed position: NT offset + 4 (signature) + the
/// COFF file header. Anything other than the PE32/PE32+ values is
/// `UnknownBitness`, and no table walk happens after that.
pub fn probe_bitness(data: &[u8], dos: &DosHeader) -> Result<Bitness> {
    let magic_offset = dos.e_lfanew as usize + 4 + COFF_HEADER_SIZE;
    let magic = data.read_u16_at(magic_offset)?;
    match magic {
        PE32_MAGIC => Ok(Bitness::Bits32),
        PE32PLUS_MAGIC => Ok(Bitness::Bits64),
        other => Err(PeError::UnknownBitness { magic: other }),
    }
}

/// Parse the NT header at `e_lfanew` using the layout `bitness` selects.
pub fn parse_nt_header(data: &[u8], dos: &DosHeader, bitness: Bitness) -> Result<NtHeaderView> {
    let nt_offset = dos.e_lfanew as usize;

    let signature = data.read_bytes_at(nt_offset, 4)?;
    if signature != PE_SIGNATURE {
        return Err(PeError::NotPeImage {
            found: data.read_u16_at(nt_offset)?,
        });
    }

    // COFF file header
    let coff_offset = nt_offset + 4;
    let number_of_sections = data.read_u16_at(coff_offset + 2)?;
    let size_of_optional_header = data.read_u16_at(coff_offset + 16)?;

    // Optional header; SectionAlignment shares an offset across layouts,
    // the directory table does not.
    let opt_offset = coff_offset + COFF_HEADER_SIZE;
    let section_alignment = data.read_u32_at(opt_offset + 32)?;

    let (rva_count_offset, dir_offset) = match bitness {
        Bitness::Bits32 => (opt_offset + 92, opt_offset + 96),
        Bitness::Bits64 => (opt_offset + 108, opt_offset + 112),
    };
    let number_of_rva_and_sizes = data.read_u32_at(rva_count_offset)?;
    let data_directories = parse_data_directories(data, dir_offset, number_of_rva_and_sizes)?;

    Ok(NtHeaderView {
        bitness,
        number_of_sections,
        section_alignment,
        size_of_optional_header,
        data_directories,
    })
}

/// Read up to 16 (rva, size) directory pairs, padding vacant slots so
/// indexing by directory kind never goes out of range.
fn parse_data_directories(data: &[u8], offset: usize, count: u32) -> Result<Vec<DataDirectory>> {
    let count = (count as usize).min(DATA_DIRECTORY_COUNT);
    let mut directories = Vec::with_capacity(DATA_DIRECTORY_COUNT);

    for i in 0..count {
        let dir_offset = offset + i * 8;
        directories.push(DataDirectory {
            virtual_address: data.read_u32_at(dir_offset)?,
            size: data.read_u32_at(dir_offset + 4)?,
        });
    }

    while directories.len() < DATA_DIRECTORY_COUNT {
        directories.push(DataDirectory::default());
    }

    Ok(directories)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dos_prefix(e_lfanew: u32) -> Vec<u8> {
        let mut data = vec![0u8; 64];
        data[0] = 0x4D;
        data[1] = 0x5A;
        data[60..64].copy_from_slice(&e_lfanew.to_le_bytes());
        data
    }

    #[test]
    fn test_parse_dos_header() {
        let data = dos_prefix(0x80);
        let header = parse_dos_header(&data).unwrap();
        assert_eq!(header.e_magic, DOS_SIGNATURE);
        assert_eq!(header.e_lfanew, 0x80);
    }

    #[test]
    fn test_parse_dos_header_bad_signature() {
        let mut data = dos_prefix(0x80);
        data[0] = 0xFF;
        assert!(matches!(
            parse_dos_header(&data),
            Err(PeError::NotPeImage { .. })
        ));
    }

    #[test]
    fn test_parse_dos_header_truncated() {
        // Magic fits but e_lfanew does not
        let mut short = vec![0u8; 10];
        short[0] = 0x4D;
        short[1] = 0x5A;
        assert!(matches!(
            parse_dos_header(&short),
            Err(PeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_probe_bitness() {
        let mut data = dos_prefix(0x40);
        data.resize(0x100, 0);
        let dos = parse_dos_header(&data).unwrap();

        // Magic at 0x40 + 4 + 20 = 0x58
        data[0x58..0x5A].copy_from_slice(&PE32_MAGIC.to_le_bytes());
        assert_eq!(probe_bitness(&data, &dos).unwrap(), Bitness::Bits32);

        data[0x58..0x5A].copy_from_slice(&PE32PLUS_MAGIC.to_le_bytes());
        assert_eq!(probe_bitness(&data, &dos).unwrap(), Bitness::Bits64);

        data[0x58..0x5A].copy_from_slice(&0x0107u16.to_le_bytes());
        assert_eq!(
            probe_bitness(&data, &dos).unwrap_err(),
            PeError::UnknownBitness { magic: 0x107 }
        );
    }

    #[test]
    fn test_parse_nt_header_pe32() {
        let mut data = dos_prefix(0x80);
        data.resize(0x400, 0);
        let opt = 0x80 + 24;

        data[0x80..0x84].copy_from_slice(b"PE\0\0");
        data[0x80 + 6..0x80 + 8].copy_from_slice(&3u16.to_le_bytes()); // sections
        data[0x80 + 20..0x80 + 22].copy_from_slice(&0xE0u16.to_le_bytes()); // opt size
        data[opt..opt + 2].copy_from_slice(&PE32_MAGIC.to_le_bytes());
        data[opt + 32..opt + 36].copy_from_slice(&0x1000u32.to_le_bytes()); // alignment
        data[opt + 92..opt + 96].copy_from_slice(&16u32.to_le_bytes());
        // Import directory (index 1)
        data[opt + 96 + 8..opt + 96 + 12].copy_from_slice(&0x3000u32.to_le_bytes());
        data[opt + 96 + 12..opt + 96 + 16].copy_from_slice(&40u32.to_le_bytes());

        let dos = parse_dos_header(&data).unwrap();
        let nt = parse_nt_header(&data, &dos, Bitness::Bits32).unwrap();
        assert_eq!(nt.number_of_sections, 3);
        assert_eq!(nt.section_alignment, 0x1000);
        assert_eq!(nt.size_of_optional_header, 0xE0);
        assert_eq!(nt.data_directories.len(), DATA_DIRECTORY_COUNT);

        let import = nt.data_directory(IMAGE_DIRECTORY_ENTRY_IMPORT);
        assert_eq!(import.virtual_address, 0x3000);
        assert_eq!(import.size, 40);
        assert!(!nt.data_directory(IMAGE_DIRECTORY_ENTRY_EXPORT).is_present());
    }

    #[test]
    fn test_parse_nt_header_pe32_plus_directory_offset() {
        let mut data = dos_prefix(0x80);
        data.resize(0x400, 0);
        let opt = 0x80 + 24;

        data[0x80..0x84].copy_from_slice(b"PE\0\0");
        data[0x80 + 6..0x80 + 8].copy_from_slice(&1u16.to_le_bytes());
        data[0x80 + 20..0x80 + 22].copy_from_slice(&0xF0u16.to_le_bytes());
        data[opt..opt + 2].copy_from_slice(&PE32PLUS_MAGIC.to_le_bytes());
        data[opt + 32..opt + 36].copy_from_slice(&0x1000u32.to_le_bytes());
        data[opt + 108..opt + 112].copy_from_slice(&16u32.to_le_bytes());
        // The 64-bit directory table starts 16 bytes later than the 32-bit one
        data[opt + 112 + 8..opt + 112 + 12].copy_from_slice(&0x5000u32.to_le_bytes());

        let dos = parse_dos_header(&data).unwrap();
        let nt = parse_nt_header(&data, &dos, Bitness::Bits64).unwrap();
        assert_eq!(
            nt.data_directory(IMAGE_DIRECTORY_ENTRY_IMPORT).virtual_address,
            0x5000
        );
    }

    #[test]
    fn test_parse_nt_header_bad_signature() {
        let mut data = dos_prefix(0x80);
        data.resize(0x400, 0);
        data[0x80..0x84].copy_from_slice(b"XX\0\0");

        let dos = parse_dos_header(&data).unwrap();
        assert!(matches!(
            parse_nt_header(&data, &dos, Bitness::Bits32),
            Err(PeError::NotPeImage { .. })
        ));
    }

    #[test]
    fn test_directory_count_clamped() {
        let mut data = dos_prefix(0x80);
        data.resize(0x400, 0);
        let opt = 0x80 + 24;

        data[0x80..0x84].copy_from_slice(b"PE\0\0");
        data[opt..opt + 2].copy_from_slice(&PE32_MAGIC.to_le_bytes());
        // Hostile count; only 16 entries are ever read
        data[opt + 92..opt + 96].copy_from_slice(&0xFFFF_FFFFu32.to_le_bytes());

        let dos = parse_dos_header(&data).unwrap();
        let nt = parse_nt_header(&data, &dos, Bitness::Bits32).unwrap();
        assert_eq!(nt.data_directories.len(), DATA_DIRECTORY_COUNT);
    }
}
