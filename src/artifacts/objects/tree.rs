//! Tree object: one directory level of a snapshot
//!
//! ## Format
//!
//! Payload is the concatenation, in lexicographic name order, of
//! `<mode-octal> <name>\0<20-byte-digest>`. Sorted, unique names make the
//! serialization canonical: equal entry sets hash identically.
//!
//! `TreeBuilder` assembles the hierarchy for a whole index bottom-up, so a
//! parent tree is only serialized once the ids of its subtrees are known.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;

/// A tree entry as stored: mode plus target id
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeRecord {
    pub mode: EntryMode,
    pub oid: ObjectId,
}

impl TreeRecord {
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }
}

/// One directory level: sorted, unique-named entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeRecord>,
}

impl Tree {
    pub fn new(entries: BTreeMap<String, TreeRecord>) -> Self {
        Tree { entries }
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeRecord)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, TreeRecord)> {
        self.entries.into_iter()
    }

    pub fn get(&self, name: &str) -> Option<&TreeRecord> {
        self.entries.get(name)
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut payload = Vec::new();
        for (name, record) in &self.entries {
            write!(payload, "{} {}\0", record.mode.as_octal_str(), name)?;
            record.oid.write_raw_to(&mut payload)?;
        }

        frame(ObjectType::Tree, &payload)
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected EOF in tree entry mode");
            }
            let mode = EntryMode::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in tree entry name");
            }
            let name = std::str::from_utf8(&name_bytes)?.to_owned();
            if name.is_empty() || name.contains('/') {
                anyhow::bail!("invalid tree entry name: {:?}", name);
            }

            let oid = ObjectId::read_raw_from(&mut reader)?;

            if entries.insert(name.clone(), TreeRecord::new(mode, oid)).is_some() {
                anyhow::bail!("duplicate tree entry name: {:?}", name);
            }
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

/// Nested tree under construction, one level of files plus subdirectories
#[derive(Debug, Default)]
pub struct TreeBuilder {
    files: BTreeMap<String, TreeRecord>,
    dirs: BTreeMap<String, TreeBuilder>,
}

impl TreeBuilder {
    /// Group index entries into a directory hierarchy
    pub fn build<'a>(entries: impl Iterator<Item = &'a IndexEntry>) -> anyhow::Result<Self> {
        let mut root = Self::default();
        for entry in entries {
            root.insert(&entry.parent_dirs(), entry)?;
        }
        Ok(root)
    }

    fn insert(&mut self, parents: &[&Path], entry: &IndexEntry) -> anyhow::Result<()> {
        match parents.first() {
            None => {
                self.files.insert(
                    entry.basename()?.to_string(),
                    TreeRecord::new(entry.mode, entry.oid.clone()),
                );
            }
            Some(parent) => {
                let name = parent
                    .file_name()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| anyhow::anyhow!("invalid directory name: {:?}", parent))?;
                self.dirs
                    .entry(name.to_string())
                    .or_default()
                    .insert(&parents[1..], entry)?;
            }
        }
        Ok(())
    }

    /// Store the hierarchy depth-first and return the root tree id.
    ///
    /// Children are persisted before their parent so the parent's entries can
    /// carry the child ids.
    pub fn persist<F>(&self, store: &F) -> anyhow::Result<ObjectId>
    where
        F: Fn(&Tree) -> anyhow::Result<ObjectId>,
    {
        let mut entries = self.files.clone();
        for (name, dir) in &self.dirs {
            let dir_oid = dir.persist(store)?;
            entries.insert(name.clone(), TreeRecord::new(EntryMode::Directory, dir_oid));
        }

        store(&Tree::new(entries))
    }
}
