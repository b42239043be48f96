//! Shared helpers for building and walking FAT/MiniFAT sector chains.
//!
//! The whole file is always held in memory, so there is nothing to cache —
//! a chain entry is just an `i32` read straight out of the concatenated FAT
//! bytes.

pub mod sector_number;

use crate::cfb::codec::read_i32;
use sector_number::SectorNumber;

/// Reads the FAT/MiniFAT entry for `index` out of the concatenated
/// allocation-table bytes (one `i32` per entry, four bytes each).
pub(crate) fn entry_at(table: &[u8], index: i32) -> SectorNumber {
    SectorNumber(read_i32(table, index as usize * 4))
}

/// Builds the forward-pointer run for a chain of `len` sectors starting at
/// absolute index `base`: `len - 1` slots of `base+i -> base+i+1` followed by
/// one `ENDOFCHAIN`. Pointers are absolute sector (or mini-sector) indices,
/// not chain-relative offsets, since the FAT/MiniFAT are flat arrays indexed
/// by the same absolute numbering the rest of the file uses. An empty chain
/// contributes nothing.
pub(crate) fn chain_pointers(base: i32, len: usize) -> Vec<i32> {
    if len == 0 {
        return Vec::new();
    }
    let mut pointers = Vec::with_capacity(len);
    for i in 1..len {
        pointers.push(base + i as i32);
    }
    pointers.push(SectorNumber::ENDOFCHAIN.0);
    pointers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_pointers_single_sector() {
        assert_eq!(chain_pointers(0, 1), vec![SectorNumber::ENDOFCHAIN.0]);
    }

    #[test]
    fn chain_pointers_multi_sector() {
        assert_eq!(chain_pointers(0, 3), vec![1, 2, SectorNumber::ENDOFCHAIN.0]);
    }

    #[test]
    fn chain_pointers_multi_sector_with_nonzero_base() {
        assert_eq!(chain_pointers(10, 3), vec![11, 12, SectorNumber::ENDOFCHAIN.0]);
    }

    #[test]
    fn chain_pointers_empty() {
        assert_eq!(chain_pointers(0, 0), Vec::<i32>::new());
    }

    #[test]
    fn entry_at_reads_i32le() {
        let table = [0xE4, 0xFF, 0xFF, 0xFF];
        assert_eq!(entry_at(&table, 0).0, -28);
    }
}
