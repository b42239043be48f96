use std::convert::TryFrom;
use chrono::NaiveDateTime;

/// Absent tree link. Shares the wire-level all-ones bit pattern with
/// [`SectorNumber::FREESECT`](crate::cfb::SectorNumber::FREESECT) but lives
/// in directory-entry index space, not sector index space.
pub const NOSTREAM: i32 = -1;

/// The kind of object a [`Entry`] represents.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Kind {
    /// An unallocated directory slot (padding out to a multiple of four per sector).
    Unknown = 0x00,
    /// Analogous to a file system directory.
    Storage = 0x01,
    /// Analogous to a file system file.
    Stream = 0x02,
    /// The single root storage object, always at index 0.
    Root = 0x05,
}

impl TryFrom<u8> for Kind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            x if x == Self::Unknown as u8 => Ok(Self::Unknown),
            x if x == Self::Storage as u8 => Ok(Self::Storage),
            x if x == Self::Stream as u8 => Ok(Self::Stream),
            x if x == Self::Root as u8 => Ok(Self::Root),
            _ => Err(format!("invalid directory entry type byte 0x{:02X}", value)),
        }
    }
}

/// The red-black coloring bit. Entries produced by the rebuilder are always
/// black.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Color {
    Red = 0,
    Black = 1,
}

impl TryFrom<u8> for Color {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Red),
            1 => Ok(Self::Black),
            _ => Err(format!("invalid directory entry color byte 0x{:02X}", value)),
        }
    }
}

/// Which allocation table backs a stream's content: the regular FAT or the
/// MiniFAT. Populated by the parser only — `add`-created entries don't know
/// their backing store until the layout planner runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Backing {
    Fat,
    MiniFat,
}

/// A single directory entry, with every field always present rather than
/// left `nil`/optional the way a dynamically-typed attribute bag would.
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub kind: Kind,
    pub color: Color,
    /// Left sibling directory index, or [`NOSTREAM`].
    pub left: i32,
    /// Right sibling directory index, or [`NOSTREAM`].
    pub right: i32,
    /// Child directory index (storages and root only), or [`NOSTREAM`].
    pub child: i32,
    pub clsid: [u8; 16],
    pub state: u32,
    pub created: Option<NaiveDateTime>,
    pub modified: Option<NaiveDateTime>,
    /// Starting sector: a FAT sector index for FAT-resident streams, a
    /// MiniFAT-relative index for mini-resident streams, the mini-stream's
    /// start sector for the root.
    pub start: i32,
    pub size: u64,
    /// Present for streams (and the root's mini-stream) once materialized.
    pub content: Option<Vec<u8>>,
    /// Set by the parser once it knows whether a stream lives in the FAT or the MiniFAT.
    pub backing: Option<Backing>,
}

impl Entry {
    /// Directory entries are fixed at 128 bytes on the wire.
    pub const LENGTH: usize = 128;
    /// Names are limited to 31 UTF-16 code units, excluding the terminator.
    pub const MAX_NAME_UNITS: usize = 31;

    pub(crate) fn new_root() -> Self {
        Self {
            name: "Root Entry".to_string(),
            kind: Kind::Root,
            color: Color::Black,
            left: NOSTREAM,
            right: NOSTREAM,
            child: NOSTREAM,
            clsid: [0; 16],
            state: 0,
            created: None,
            modified: None,
            start: NOSTREAM,
            size: 0,
            content: None,
            backing: None,
        }
    }

    pub(crate) fn new_stream(name: &str, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        Self {
            name: name.to_string(),
            kind: Kind::Stream,
            color: Color::Black,
            left: NOSTREAM,
            right: NOSTREAM,
            child: NOSTREAM,
            clsid: [0; 16],
            state: 0,
            created: None,
            modified: None,
            start: 0,
            size,
            content: Some(content),
            backing: None,
        }
    }

    pub(crate) fn new_storage(name: &str, created: Option<NaiveDateTime>) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Storage,
            color: Color::Black,
            left: NOSTREAM,
            right: NOSTREAM,
            child: NOSTREAM,
            clsid: [0; 16],
            state: 0,
            created,
            modified: created,
            start: 0,
            size: 0,
            content: None,
            backing: None,
        }
    }

    pub(crate) fn new_unknown() -> Self {
        Self {
            name: String::new(),
            kind: Kind::Unknown,
            color: Color::Black,
            left: NOSTREAM,
            right: NOSTREAM,
            child: NOSTREAM,
            clsid: [0; 16],
            state: 0,
            created: None,
            modified: None,
            start: NOSTREAM,
            size: 0,
            content: None,
            backing: None,
        }
    }

    pub fn is_stream(&self) -> bool {
        self.kind == Kind::Stream
    }

    pub fn is_storage(&self) -> bool {
        matches!(self.kind, Kind::Storage | Kind::Root)
    }
}
