use core::fmt;
use std::fmt::Formatter;

/** A signed index into the post-header sector array.

The locations of FAT sectors are read from the DIFAT. A sector number can be
converted into a byte offset into the file with `(sector_number + 1) *
sector_size` — sector #0 begins at byte offset `sector_size`, not at 0.

Reserved values are not chained like regular sectors: [`ENDOFCHAIN`] marks
the end of a chain, [`FREESECT`] marks an unallocated sector, [`FATSECT`] and
[`DIFSECT`] mark sectors that hold the FAT/DIFAT themselves.

[`ENDOFCHAIN`]: SectorNumber::ENDOFCHAIN
[`FREESECT`]: SectorNumber::FREESECT
[`FATSECT`]: SectorNumber::FATSECT
[`DIFSECT`]: SectorNumber::DIFSECT
 */
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SectorNumber(pub i32);

impl SectorNumber {
    /// Largest reserved (non-regular) sector marker.
    pub const MAXREGSECT: Self = Self(-6);
    /// Sectors allocated to the DIFAT.
    pub const DIFSECT: Self = Self(-4);
    /// Sectors allocated to the FAT.
    pub const FATSECT: Self = Self(-3);
    /// Chain terminator.
    pub const ENDOFCHAIN: Self = Self(-2);
    /// Unallocated sector.
    pub const FREESECT: Self = Self(-1);
    /// Absent tree link (directory entries only, shares the bit pattern of `FREESECT`).
    pub const NOSTREAM: Self = Self(-1);

    pub fn is_difat(&self) -> bool {
        self == &Self::DIFSECT
    }

    pub fn is_fat(&self) -> bool {
        self == &Self::FATSECT
    }

    pub fn is_end_of_chain(&self) -> bool {
        self == &Self::ENDOFCHAIN
    }

    pub fn is_free(&self) -> bool {
        self == &Self::FREESECT
    }

    /// True for a sector index that takes part in a regular chain (not a reserved marker).
    pub fn is_other(&self) -> bool {
        self.0 >= 0 || self.0 <= Self::MAXREGSECT.0
    }

    /// True for a non-negative index, i.e. one that can be dereferenced into the sector array.
    pub fn is_regular(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Debug for SectorNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match *self {
            Self::FREESECT => "FREESECT".to_string(),
            Self::FATSECT => "FATSECT".to_string(),
            Self::ENDOFCHAIN => "ENDOFCHAIN".to_string(),
            Self::DIFSECT => "DIFSECT".to_string(),
            Self(v) => format!("0x{:08X}", v),
        };
        f.write_str(&format!("SectorNumber({})", str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_values_match_spec() {
        assert_eq!(SectorNumber::FREESECT.0, -1);
        assert_eq!(SectorNumber::ENDOFCHAIN.0, -2);
        assert_eq!(SectorNumber::FATSECT.0, -3);
        assert_eq!(SectorNumber::DIFSECT.0, -4);
        assert_eq!(SectorNumber::MAXREGSECT.0, -6);
    }

    #[test]
    fn is_other_excludes_reserved() {
        assert!(!SectorNumber::FREESECT.is_other());
        assert!(!SectorNumber::ENDOFCHAIN.is_other());
        assert!(!SectorNumber::FATSECT.is_other());
        assert!(!SectorNumber::DIFSECT.is_other());
        assert!(SectorNumber(0).is_other());
        assert!(SectorNumber(41).is_other());
    }
}
