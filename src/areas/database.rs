//! Content-addressed object store
//!
//! Objects live at `objects/<xx>/<38-hex>` as raw framed bytes. Writes go
//! through a temp file in the same directory followed by a rename, so a
//! half-written object is never visible under its id. Re-storing existing
//! content is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, hash_bytes};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::{Tree, TreeRecord};
use crate::errors::PygitError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Serialize and store an object, returning its id
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let framed = object.serialize()?;
        let oid = hash_bytes(&framed);
        self.write_if_absent(&oid, &framed)?;
        Ok(oid)
    }

    /// Store already-framed bytes (received from a peer), verifying that they
    /// hash to `claimed`.
    pub fn put_framed(&self, claimed: &ObjectId, framed: &[u8]) -> anyhow::Result<ObjectId> {
        let actual = hash_bytes(framed);
        if &actual != claimed {
            return Err(PygitError::Corrupt {
                expected: claimed.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }

        // parse before writing so malformed frames never land on disk
        ObjectBox::parse_framed(framed)
            .map_err(|e| PygitError::ProtocolViolation(format!("unparsable object: {e}")))?;

        self.write_if_absent(&actual, framed)?;
        Ok(actual)
    }

    /// Read the framed bytes of an object, verifying the content address
    pub fn load_raw(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(oid.to_path());
        let framed = match std::fs::read(&object_path) {
            Ok(framed) => framed,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PygitError::ObjectMissing(oid.to_string()).into());
            }
            Err(e) => {
                return Err(e)
                    .context(format!("unable to read object file {}", object_path.display()));
            }
        };

        let actual = hash_bytes(&framed);
        if &actual != oid {
            return Err(PygitError::Corrupt {
                expected: oid.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }

        Ok(Bytes::from(framed))
    }

    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).is_file()
    }

    /// Parse an object into its typed form
    pub fn parse(&self, oid: &ObjectId) -> anyhow::Result<ObjectBox> {
        ObjectBox::parse_framed(&self.load_raw(oid)?)
            .with_context(|| format!("unable to parse object {oid}"))
    }

    pub fn parse_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        match self.parse(oid)? {
            ObjectBox::Blob(blob) => Ok(blob),
            other => anyhow::bail!("{} is a {}, expected a blob", oid, other.object_type()),
        }
    }

    pub fn parse_tree(&self, oid: &ObjectId) -> anyhow::Result<Tree> {
        match self.parse(oid)? {
            ObjectBox::Tree(tree) => Ok(tree),
            other => anyhow::bail!("{} is a {}, expected a tree", oid, other.object_type()),
        }
    }

    pub fn parse_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        match self.parse(oid)? {
            ObjectBox::Commit(commit) => Ok(commit),
            other => anyhow::bail!("{} is a {}, expected a commit", oid, other.object_type()),
        }
    }

    /// Enumerate every stored object id
    pub fn iter_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut ids = Vec::new();
        if !self.path.exists() {
            return Ok(ids);
        }

        for fan_out in std::fs::read_dir(&self.path)? {
            let fan_out = fan_out?;
            if !fan_out.file_type()?.is_dir() {
                continue;
            }
            let prefix = fan_out.file_name().to_string_lossy().to_string();
            for object_file in std::fs::read_dir(fan_out.path())? {
                let name = object_file?.file_name().to_string_lossy().to_string();
                if let Ok(oid) = ObjectId::try_parse(format!("{prefix}{name}")) {
                    ids.push(oid);
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Transitive closure of objects reachable from `roots` via
    /// commit-to-parent, commit-to-tree and tree-to-entry edges.
    ///
    /// The object graph is acyclic by construction; a seen-set is enough.
    pub fn closure(&self, roots: &[ObjectId]) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<ObjectId> = roots.iter().cloned().collect();

        while let Some(oid) = queue.pop_front() {
            if !seen.insert(oid.clone()) {
                continue;
            }

            match self.parse(&oid)? {
                ObjectBox::Commit(commit) => {
                    queue.push_back(commit.tree_oid().clone());
                    if let Some(parent) = commit.parent() {
                        queue.push_back(parent.clone());
                    }
                }
                ObjectBox::Tree(tree) => {
                    for (_, record) in tree.entries() {
                        queue.push_back(record.oid.clone());
                    }
                }
                ObjectBox::Blob(_) => {}
            }
        }

        Ok(seen)
    }

    /// Is `ancestor` reachable from `descendant` through parent edges?
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut cursor = Some(descendant.clone());
        while let Some(oid) = cursor {
            if &oid == ancestor {
                return Ok(true);
            }
            cursor = self.parse_commit(&oid)?.parent().cloned();
        }
        Ok(false)
    }

    /// Flatten a tree into `path -> record`, recursing through subtrees
    pub fn flatten_tree(&self, tree_oid: &ObjectId) -> anyhow::Result<BTreeMap<PathBuf, TreeRecord>> {
        let mut flattened = BTreeMap::new();
        self.flatten_into(tree_oid, &PathBuf::new(), &mut flattened)?;
        Ok(flattened)
    }

    fn flatten_into(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        flattened: &mut BTreeMap<PathBuf, TreeRecord>,
    ) -> anyhow::Result<()> {
        for (name, record) in self.parse_tree(tree_oid)?.into_entries() {
            let path = prefix.join(&name);
            if record.is_tree() {
                self.flatten_into(&record.oid, &path, flattened)?;
            } else {
                flattened.insert(path, record);
            }
        }
        Ok(())
    }

    fn write_if_absent(&self, oid: &ObjectId, framed: &[u8]) -> anyhow::Result<()> {
        let object_path = self.path.join(oid.to_path());
        if object_path.exists() {
            return Ok(());
        }

        let object_dir = object_path
            .parent()
            .context("object path has no parent directory")?;
        std::fs::create_dir_all(object_dir)
            .with_context(|| format!("unable to create {}", object_dir.display()))?;

        let temp_path = object_dir.join(format!(
            "tmp-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let mut temp_file = std::fs::File::create(&temp_path)
            .with_context(|| format!("unable to create {}", temp_path.display()))?;
        temp_file.write_all(framed)?;
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &object_path)
            .with_context(|| format!("unable to move object into {}", object_path.display()))?;

        Ok(())
    }
}
