//! The in-memory directory model: the full array of [`Entry`] records plus
//! their parallel full-path strings.
//!
//! There is no lazy iteration here — `add`/`parse` build the whole array up
//! front and [`rebuild`] normalizes it in place.

pub mod entry;
mod rebuild;

use crate::cfb::error::CfbError;
use entry::Entry;

/// Stream named `\u{1}Sh33tJ5` whose content is the four bytes below. Its
/// presence is required to byte-match the reference compound files this
/// crate targets; once injected it is never removed.
const SEED_NAME: &str = "\u{1}Sh33tJ5";
const SEED_CONTENT: [u8; 4] = [55, 50, 54, 50];

#[derive(Debug, Clone)]
pub(crate) struct DirectoryModel {
    pub(crate) entries: Vec<Entry>,
    pub(crate) full_paths: Vec<String>,
}

impl DirectoryModel {
    pub(crate) fn new() -> Self {
        Self {
            entries: vec![Entry::new_root()],
            full_paths: vec!["Root Entry/".to_string()],
        }
    }

    pub(crate) fn from_parts(entries: Vec<Entry>, full_paths: Vec<String>) -> Self {
        Self { entries, full_paths }
    }

    /// Adds a root-level stream, forcing a rebuild, and returns its index
    /// in the (freshly sorted) entry array.
    pub(crate) fn add(&mut self, name: &str, content: Vec<u8>) -> usize {
        self.ensure_seed();

        let path = format!("/{}", name);
        self.entries.push(Entry::new_stream(name, content));
        self.full_paths.push(path.clone());

        self.rebuild(true);

        self.full_paths
            .iter()
            .position(|p| p == &path)
            .expect("the entry just added must survive rebuild")
    }

    fn ensure_seed(&mut self) {
        let seed_path = format!("/{}", SEED_NAME);
        if self.full_paths.iter().any(|p| p == &seed_path) {
            return;
        }
        self.entries.push(Entry::new_stream(SEED_NAME, SEED_CONTENT.to_vec()));
        self.full_paths.push(seed_path);
    }

    pub(crate) fn rebuild(&mut self, force: bool) {
        rebuild::rebuild(&mut self.entries, &mut self.full_paths, force);
    }

    pub(crate) fn validate(&self) -> Result<(), CfbError> {
        if self.full_paths.len() != self.entries.len() {
            return Err(CfbError::InconsistentModel {
                full_paths: self.full_paths.len(),
                file_index: self.entries.len(),
            });
        }
        Ok(())
    }
}
