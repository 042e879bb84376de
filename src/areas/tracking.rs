//! Tracking ledger
//!
//! The set of paths committed on the current branch, with the blob each path
//! had at the branch tip. Status uses it to tell "untracked" apart from
//! "modified" and "deleted". It is rebuilt from the tip's tree on checkout
//! and merged with the index on commit.
//!
//! Stored as `<40-hex> <path>` lines, sorted by path, rewritten atomically.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct Tracking {
    path: Box<Path>,
}

impl Tracking {
    pub fn new(path: Box<Path>) -> Self {
        Tracking { path }
    }

    /// Load the ledger; a missing file means nothing is tracked yet
    pub fn load(&self) -> anyhow::Result<BTreeMap<PathBuf, ObjectId>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e).context("unable to read tracking ledger"),
        };

        let mut ledger = BTreeMap::new();
        for line in content.lines().filter(|line| !line.is_empty()) {
            let (hex, path) = line
                .split_once(' ')
                .ok_or_else(|| anyhow::anyhow!("malformed tracking line: {:?}", line))?;
            ledger.insert(PathBuf::from(path), ObjectId::try_parse(hex)?);
        }
        Ok(ledger)
    }

    /// Replace the ledger atomically
    pub fn save(&self, ledger: &BTreeMap<PathBuf, ObjectId>) -> anyhow::Result<()> {
        let parent = self
            .path
            .parent()
            .context("tracking path has no parent directory")?;
        let temp_path = parent.join(format!("tmp-tracking-{}", std::process::id()));

        let mut temp_file = std::fs::File::create(&temp_path)?;
        for (path, oid) in ledger {
            writeln!(temp_file, "{} {}", oid, path.display())?;
        }
        temp_file.sync_all()?;

        std::fs::rename(&temp_path, &self.path)
            .context("unable to move tracking ledger into place")?;
        Ok(())
    }
}
