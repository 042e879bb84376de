//! The staging area
//!
//! A sorted map of working-tree paths to staged blob ids plus stat data,
//! persisted as the text table described in `artifacts::index`. The map is
//! loaded lazily (`rehydrate`) and written back atomically (`write_updates`).

use crate::artifacts::index::index_entry::IndexEntry;
use crate::errors::PygitError;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Load the on-disk table, replacing the in-memory state.
    /// A missing file is an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).context("unable to read index"),
        };

        for (line_no, line) in content.lines().enumerate() {
            let entry = IndexEntry::parse_record(line).map_err(|e| {
                PygitError::IndexMalformed(format!("line {}: {}", line_no + 1, e))
            })?;
            self.entries.insert(entry.path.clone(), entry);
        }

        Ok(())
    }

    /// Persist the table through a temp file + rename
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("index path has no parent directory")?;
        let temp_path = parent.join(format!("tmp-index-{}", std::process::id()));

        let mut temp_file = std::fs::File::create(&temp_path)
            .with_context(|| format!("unable to create {}", temp_path.display()))?;
        for entry in self.entries.values() {
            temp_file.write_all(entry.to_record().as_bytes())?;
        }
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &self.path).context("unable to move index into place")?;
        Ok(())
    }

    pub fn add(&mut self, entry: IndexEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn get(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.entries.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
