//! A single staged path with its blob id and stat snapshot

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

/// One record of the staging area
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// Path relative to the working root, POSIX separators
    pub path: PathBuf,
    /// Blob holding the staged content
    pub oid: ObjectId,
    /// Modification time, whole seconds
    pub mtime: i64,
    /// Content size in bytes
    pub size: u64,
    pub mode: EntryMode,
}

impl IndexEntry {
    /// Build an entry from a file's metadata; the caller supplies the mode
    /// (classified from the file, or carried over from a tree record)
    pub fn from_metadata(path: PathBuf, oid: ObjectId, metadata: &Metadata, mode: EntryMode) -> Self {
        IndexEntry {
            path,
            oid,
            mtime: metadata.mtime(),
            size: metadata.size(),
            mode,
        }
    }

    /// Cheap negative check: equal (size, mtime) means "assume unchanged"
    pub fn stat_match(&self, metadata: &Metadata) -> bool {
        self.size == metadata.size() && self.mtime == metadata.mtime()
    }

    /// Render as one index-file record
    pub fn to_record(&self) -> String {
        format!(
            "{} {} {} {}\t{}\n",
            self.oid,
            self.mode.as_octal_str(),
            self.mtime,
            self.size,
            self.path.display()
        )
    }

    /// Parse one index-file record
    pub fn parse_record(line: &str) -> anyhow::Result<Self> {
        let (fields, path) = line
            .split_once('\t')
            .ok_or_else(|| anyhow::anyhow!("missing path separator"))?;

        let mut fields = fields.split(' ');
        let oid = ObjectId::try_parse(
            fields
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing object id"))?,
        )?;
        let mode = EntryMode::from_octal_str(
            fields
                .next()
                .ok_or_else(|| anyhow::anyhow!("missing mode"))?,
        )?;
        let mtime: i64 = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing mtime"))?
            .parse()?;
        let size: u64 = fields
            .next()
            .ok_or_else(|| anyhow::anyhow!("missing size"))?
            .parse()?;
        if fields.next().is_some() {
            anyhow::bail!("trailing fields");
        }
        if path.is_empty() {
            anyhow::bail!("empty path");
        }

        Ok(IndexEntry::new(PathBuf::from(path), oid, mtime, size, mode))
    }

    /// Directory prefixes of the path, outermost first, working root excluded
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self
            .path
            .ancestors()
            .skip(1)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        dirs.reverse();
        dirs
    }

    pub fn basename(&self) -> anyhow::Result<&str> {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow::anyhow!("invalid file name: {}", self.path.display()))
    }
}
