pub mod header;
pub mod error;
mod codec;
mod fat;
mod directory;
mod layout;
mod writer;
mod parser;

pub use error::CfbError;
pub use directory::entry::{Backing, Color, Entry, Kind};
pub use fat::sector_number::SectorNumber;

use core::fmt;
use std::fmt::Formatter;

use directory::DirectoryModel;

/**
A compound file is a structure that is used to store a hierarchy of storage objects and stream
objects into a single file or memory buffer.

A storage object is analogous to a file system directory. Just as a directory can contain other
directories and files, a storage object can contain other storage objects and stream objects. Also
like a directory, a storage object tracks the locations and sizes of the child storage object and
stream objects that are nested beneath it.

A stream object is analogous to the traditional notion of a file. Like a file, a stream contains
user-defined data that is stored as a consecutive sequence of bytes.

The hierarchy is defined by a parent object/child object relationship. Stream objects cannot contain
child objects. Storage objects can contain stream objects and/or other storage objects, each of
which has a name that uniquely identifies it among the child objects of its parent storage object.

The root storage object has no parent object. The root storage object also has no name. Because
names are used to identify child objects, a name for the root storage object is unnecessary and the
file format does not provide a representation for it.

This type operates entirely on in-memory byte buffers: building one calls
[`Cfb::add`] any number of times and then [`Cfb::write`]; reading one calls
[`Cfb::parse`]. There is no filesystem access anywhere in this crate — the
caller owns all I/O.
 */
pub struct Cfb {
    model: DirectoryModel,
}

impl Cfb {
    /// An empty compound file containing only the root storage.
    pub fn new() -> Self {
        Self { model: DirectoryModel::new() }
    }

    /// Adds a root-level stream named `name` with the given content. Forces
    /// a directory rebuild and returns the entry's index in
    /// [`Cfb::file_index`] after that rebuild.
    pub fn add(&mut self, name: &str, content: impl Into<Vec<u8>>) -> usize {
        self.model.add(name, content.into())
    }

    /// Serializes the current directory model into a full compound-file
    /// image. Does not consume the model: the caller may
    /// call `write` repeatedly, and may keep calling `add` in between.
    pub fn write(&mut self) -> Vec<u8> {
        self.model.rebuild(false);
        let mut entries = self.model.entries.clone();
        let layout = layout::plan(&mut entries);
        let bytes = writer::write(&entries, &layout);
        self.model.entries = entries;
        bytes
    }

    /// Parses an existing compound-file image. Fails with a
    /// [`CfbError`] rather than partially populating the model.
    pub fn parse(input: &[u8]) -> Result<Self, CfbError> {
        let (entries, full_paths) = parser::parse(input)?;
        let model = DirectoryModel::from_parts(entries, full_paths);
        model.validate()?;
        Ok(Self { model })
    }

    /// The directory entries, index-parallel with [`Cfb::full_paths`].
    /// Index 0 is always the root entry.
    pub fn file_index(&self) -> &[Entry] {
        &self.model.entries
    }

    /// Full slash-joined path strings, index-parallel with
    /// [`Cfb::file_index`]. Stream paths are plain; storage (and root)
    /// paths end with `/`.
    pub fn full_paths(&self) -> &[String] {
        &self.model.full_paths
    }
}

impl Default for Cfb {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cfb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut fmt = f.debug_map();
        crate::debug_map_method_reflection!(fmt, self, file_index, full_paths);
        fmt.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_codec_has_only_root() {
        let cfb = Cfb::new();
        assert_eq!(cfb.file_index().len(), 1);
        assert_eq!(cfb.full_paths(), &["Root Entry/".to_string()]);
    }

    #[test]
    fn add_returns_post_rebuild_index() {
        let mut cfb = Cfb::new();
        let idx = cfb.add("hello.txt", b"1234".to_vec());
        assert_eq!(cfb.full_paths()[idx], "/hello.txt");
    }

    #[test]
    fn write_is_repeatable_without_consuming_model() {
        let mut cfb = Cfb::new();
        cfb.add("hello.txt", b"1234".to_vec());
        let first = cfb.write();
        let second = cfb.write();
        assert_eq!(first, second);
    }

    #[test]
    fn seed_entry_present_after_write() {
        let mut cfb = Cfb::new();
        cfb.add("hello.txt", b"1234".to_vec());
        cfb.write();
        assert!(cfb.full_paths()[1].ends_with("Sh33tJ5"));
    }

    #[test]
    fn parse_rejects_too_small_input() {
        let err = Cfb::parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, CfbError::TooSmall { actual: 10 }));
    }

    #[test]
    fn write_length_matches_sector_formula() {
        let mut cfb = Cfb::new();
        cfb.add("a.txt", vec![1, 2, 3]);
        let bytes = cfb.write();
        assert_eq!(bytes.len() % 512, 0);
    }
}
