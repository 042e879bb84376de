//! Status inspection
//!
//! Classifies every path in the union of index, tracking ledger and working
//! tree (minus ignored files). Content comparison goes through a cheap
//! `(size, mtime)` check against the stat recorded in the index before
//! falling back to hashing the file.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::{FileState, StatusReport};
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

#[derive(new)]
pub struct Inspector<'r> {
    repository: &'r Repository,
}

impl<'r> Inspector<'r> {
    /// Classify the whole working tree against the given index state
    pub fn report(&self, index: &Index) -> anyhow::Result<StatusReport> {
        let ledger = self.repository.tracking().load()?;
        let ignore = self.repository.ignore();

        let on_disk: BTreeSet<PathBuf> = self
            .repository
            .workspace()
            .list_files(None)?
            .into_iter()
            .filter(|path| !ignore.is_ignored(path, false))
            .collect();

        let mut union: BTreeSet<PathBuf> = on_disk.iter().cloned().collect();
        union.extend(index.paths().cloned());
        union.extend(ledger.keys().cloned());

        let mut report = StatusReport::default();
        for path in union {
            for state in self.classify(&path, index, &ledger, on_disk.contains(&path))? {
                report.record(path.clone(), state);
            }
        }

        Ok(report)
    }

    fn classify(
        &self,
        path: &Path,
        index: &Index,
        ledger: &BTreeMap<PathBuf, ObjectId>,
        on_disk: bool,
    ) -> anyhow::Result<Vec<FileState>> {
        let index_entry = index.get(path);
        let ledger_oid = ledger.get(path);
        let mut states = Vec::new();

        match (index_entry, ledger_oid) {
            (Some(_), None) => states.push(FileState::StagedNew),
            (Some(entry), Some(committed)) if &entry.oid != committed => {
                states.push(FileState::StagedModified);
            }
            _ => {}
        }

        if on_disk {
            if let Some(entry) = index_entry {
                if self.content_differs(path, &entry.oid, Some(entry))? {
                    states.push(FileState::UnstagedModified);
                }
            } else if let Some(committed) = ledger_oid
                && self.content_differs(path, committed, None)?
            {
                states.push(FileState::UnstagedModified);
            }

            if index_entry.is_none() && ledger_oid.is_none() {
                states.push(FileState::Untracked);
            }
        } else if ledger_oid.is_some() {
            states.push(FileState::Deleted);
        }

        Ok(states)
    }

    /// Does the working-tree content differ from `expected`?
    ///
    /// When an index entry is at hand and its recorded stat matches, the file
    /// is assumed unchanged without reading it.
    fn content_differs(
        &self,
        path: &Path,
        expected: &ObjectId,
        entry: Option<&IndexEntry>,
    ) -> anyhow::Result<bool> {
        if let Some(entry) = entry
            && let Some(metadata) = self.repository.workspace().stat(path)?
            && entry.stat_match(&metadata)
        {
            return Ok(false);
        }

        let content = self.repository.workspace().read_file(path)?;
        let actual = Blob::from_bytes(content).object_id()?;
        Ok(&actual != expected)
    }
}
