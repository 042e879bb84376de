//! The working tree
//!
//! Thin filesystem layer over the working root: enumerate files, read and
//! stat them, and materialize blobs during checkout. Path arguments and
//! return values are relative to the working root; the metadata directory is
//! never reported.

use crate::areas::META_DIR;
use crate::artifacts::index::entry_mode::EntryMode;
use anyhow::Context;
use bytes::Bytes;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct Workspace {
    root: Box<Path>,
}

impl Workspace {
    pub fn new(root: Box<Path>) -> Self {
        Workspace { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a working-tree file
    pub fn absolute(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// All files under `prefix` (or the whole tree), relative to the root,
    /// sorted; the metadata directory is skipped.
    pub fn list_files(&self, prefix: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let start = match prefix {
            Some(prefix) => self.root.join(prefix),
            None => self.root.to_path_buf(),
        };

        if start.is_file() {
            return Ok(vec![self.relative(&start)?]);
        }
        if !start.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != std::ffi::OsStr::new(META_DIR));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(self.relative(entry.path())?);
            }
        }

        files.sort();
        Ok(files)
    }

    fn relative(&self, absolute: &Path) -> anyhow::Result<PathBuf> {
        Ok(absolute
            .strip_prefix(&self.root)
            .with_context(|| format!("{} is outside the working tree", absolute.display()))?
            .to_path_buf())
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<Bytes> {
        let absolute = self.absolute(path);
        Ok(Bytes::from(std::fs::read(&absolute).with_context(
            || format!("unable to read {}", absolute.display()),
        )?))
    }

    /// Metadata of a working-tree path; `None` when it does not exist
    pub fn stat(&self, path: &Path) -> anyhow::Result<Option<Metadata>> {
        match std::fs::metadata(self.absolute(path)) {
            Ok(metadata) => Ok(Some(metadata)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context(format!("unable to stat {}", path.display())),
        }
    }

    /// Write file content during checkout, creating parent directories and
    /// applying the executable bit when the mode calls for it.
    pub fn write_file(&self, path: &Path, content: &[u8], mode: EntryMode) -> anyhow::Result<()> {
        let absolute = self.absolute(path);
        if let Some(parent) = absolute.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        std::fs::write(&absolute, content)
            .with_context(|| format!("unable to write {}", absolute.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode_bits = match mode {
                EntryMode::Executable => 0o755,
                _ => 0o644,
            };
            std::fs::set_permissions(&absolute, std::fs::Permissions::from_mode(mode_bits))?;
        }

        Ok(())
    }

    /// Remove a file and prune any directories the removal emptied
    pub fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        let absolute = self.absolute(path);
        match std::fs::remove_file(&absolute) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).context(format!("unable to remove {}", absolute.display()));
            }
        }

        let mut parent = absolute.parent();
        while let Some(dir) = parent {
            if dir == self.root.as_ref() || std::fs::remove_dir(dir).is_err() {
                break; // non-empty or gone
            }
            parent = dir.parent();
        }

        Ok(())
    }
}
