//! The 512-byte structure at the beginning of a compound file, and the
//! constants every CFB implementation agrees on regardless of who wrote it.
//!
//! This module only describes the *parsed* shape of a header plus the wire
//! constants; [`crate::cfb::writer`] assembles the bytes for a freshly
//! planned layout and [`crate::cfb::parser`] validates an existing header
//! against these same constants.

use crate::cfb::codec::{read_i32, read_u16, read_u32};
use crate::cfb::error::CfbError;
use crate::cfb::fat::sector_number::SectorNumber;

pub(crate) const SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
pub(crate) const MINOR_VERSION: u16 = 0x003E;
pub(crate) const MAJOR_VERSION_3: u16 = 0x0003;
pub(crate) const MAJOR_VERSION_4: u16 = 0x0004;
pub(crate) const BYTE_ORDER_MARK: u16 = 0xFFFE;
pub(crate) const SECTOR_SHIFT_V3: u16 = 0x0009;
pub(crate) const SECTOR_SHIFT_V4: u16 = 0x000C;
pub(crate) const MINI_SECTOR_SHIFT: u16 = 0x0006;
pub(crate) const MINI_STREAM_CUTOFF: u32 = 0x0000_1000;
pub(crate) const HEADER_LEN: usize = 512;
pub(crate) const DIFAT_IN_HEADER_LEN: usize = 109;

/// The parsed fields of a compound file header. Produced by
/// [`Header::parse`]; [`crate::cfb::writer`] builds the on-wire bytes
/// straight from a [`crate::cfb::layout::Layout`] instead of going through
/// this struct, since the writer always emits the same major version and
/// most of these fields are write-only constants for it.
#[derive(Debug, Clone)]
pub struct Header {
    pub minor_version: u16,
    pub major_version: u16,
    pub sector_size: usize,
    pub no_of_directory_sectors: u32,
    pub no_of_fat_sectors: u32,
    pub first_directory_sector_location: SectorNumber,
    pub transaction_signature_number: u32,
    pub first_mini_fat_sector_location: SectorNumber,
    pub no_of_mini_fat_sectors: u32,
    pub first_difat_sector_location: SectorNumber,
    pub no_of_difat_sectors: u32,
    pub difat: Vec<SectorNumber>,
}

impl Header {
    /// Parses and validates the fixed 512-byte header. Assumes the caller
    /// has already rejected inputs shorter than [`HEADER_LEN`] and any ZIP
    /// magic — that's a `Parser` concern, not a `Header` one.
    pub fn parse(bytes: &[u8]) -> Result<Self, CfbError> {
        if bytes[0..8] != SIGNATURE {
            return Err(CfbError::header_mismatch("signature", "D0CF11E0A1B11AE1", hex_of(&bytes[0..8])));
        }

        let minor_version = read_u16(bytes, 24);
        let major_version = read_u16(bytes, 26);
        let sector_size = match major_version {
            v if v == MAJOR_VERSION_3 => 512usize,
            v if v == MAJOR_VERSION_4 => 4096usize,
            other => return Err(CfbError::unsupported(format!("unsupported major version 0x{:04X}", other))),
        };

        let sector_shift = read_u16(bytes, 30);
        let expected_shift = if major_version == MAJOR_VERSION_3 { SECTOR_SHIFT_V3 } else { SECTOR_SHIFT_V4 };
        if sector_shift != expected_shift {
            return Err(CfbError::header_mismatch("sector_shift", format!("0x{:04X}", expected_shift), format!("0x{:04X}", sector_shift)));
        }

        let mini_sector_shift = read_u16(bytes, 32);
        if mini_sector_shift != MINI_SECTOR_SHIFT {
            return Err(CfbError::header_mismatch("mini_sector_shift", format!("0x{:04X}", MINI_SECTOR_SHIFT), format!("0x{:04X}", mini_sector_shift)));
        }

        if bytes[34..40] != [0u8; 6] {
            return Err(CfbError::header_mismatch("reserved", "000000000000", hex_of(&bytes[34..40])));
        }

        let no_of_directory_sectors = read_u32(bytes, 40);
        if major_version == MAJOR_VERSION_3 && no_of_directory_sectors != 0 {
            return Err(CfbError::header_mismatch("no_of_directory_sectors", 0, no_of_directory_sectors));
        }

        let no_of_fat_sectors = read_u32(bytes, 44);
        let first_directory_sector_location = SectorNumber(read_i32(bytes, 48));
        let transaction_signature_number = read_u32(bytes, 52);

        let mini_stream_cutoff_size = read_u32(bytes, 56);
        if mini_stream_cutoff_size != MINI_STREAM_CUTOFF {
            return Err(CfbError::header_mismatch("mini_stream_cutoff_size", format!("0x{:08X}", MINI_STREAM_CUTOFF), format!("0x{:08X}", mini_stream_cutoff_size)));
        }

        let first_mini_fat_sector_location = SectorNumber(read_i32(bytes, 60));
        let no_of_mini_fat_sectors = read_u32(bytes, 64);
        let first_difat_sector_location = SectorNumber(read_i32(bytes, 68));
        let no_of_difat_sectors = read_u32(bytes, 72);

        let mut difat = Vec::with_capacity(DIFAT_IN_HEADER_LEN);
        for i in 0..DIFAT_IN_HEADER_LEN {
            difat.push(SectorNumber(read_i32(bytes, 76 + i * 4)));
        }

        Ok(Self {
            minor_version,
            major_version,
            sector_size,
            no_of_directory_sectors,
            no_of_fat_sectors,
            first_directory_sector_location,
            transaction_signature_number,
            first_mini_fat_sector_location,
            no_of_mini_fat_sectors,
            first_difat_sector_location,
            no_of_difat_sectors,
            difat,
        })
    }
}

fn hex_of(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
