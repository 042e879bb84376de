//! The repository handle
//!
//! One value owning every surface of a repository, passed explicitly through
//! all operations; there is no process-global state. Mutating commands take
//! the exclusive repository lock for their whole duration.

use crate::areas::META_DIR;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::remotes::Remotes;
use crate::areas::tracking::Tracking;
use crate::areas::workspace::Workspace;
use crate::artifacts::ignore::IgnoreMatcher;
use crate::errors::PygitError;
use anyhow::Context;
use file_guard::{FileGuard, Lock};
use std::cell::{RefCell, RefMut};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the branch a fresh repository starts on
pub const DEFAULT_BRANCH: &str = "master";

/// Held for the duration of a mutating command
pub type RepoLock = FileGuard<Box<File>>;

pub struct Repository {
    root: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    remotes: Remotes,
    tracking: Tracking,
}

impl Repository {
    /// Bind a handle to `root` without checking for repository metadata.
    /// Used by `init` and `clone`; everything else goes through `open`.
    pub fn new(root: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !root.exists() {
            std::fs::create_dir_all(root)
                .with_context(|| format!("unable to create {}", root.display()))?;
        }
        let root = root
            .canonicalize()
            .with_context(|| format!("unable to resolve {}", root.display()))?;
        let meta = root.join(META_DIR);

        Ok(Repository {
            index: Arc::new(Mutex::new(Index::new(meta.join("index").into_boxed_path()))),
            database: Database::new(meta.join("objects").into_boxed_path()),
            workspace: Workspace::new(root.clone().into_boxed_path()),
            refs: Refs::new(meta.clone().into_boxed_path()),
            remotes: Remotes::new(meta.join("remotes").into_boxed_path()),
            tracking: Tracking::new(meta.join("tracking").into_boxed_path()),
            writer: RefCell::new(writer),
            root: root.into_boxed_path(),
        })
    }

    /// Bind a handle to an existing repository
    pub fn open(root: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let repository = Self::new(root, writer)?;
        if !repository.meta_path().is_dir() {
            return Err(PygitError::NotARepo.into());
        }
        Ok(repository)
    }

    /// Lay down the metadata directory skeleton
    pub fn create_skeleton(&self) -> anyhow::Result<()> {
        let meta = self.meta_path();
        if meta.exists() {
            anyhow::bail!("repository already exists at {}", meta.display());
        }

        std::fs::create_dir_all(self.refs.heads_path())?;
        std::fs::create_dir_all(self.database.objects_path())?;
        self.refs.set_head_symbolic(DEFAULT_BRANCH)?;

        Index::new(meta.join("index").into_boxed_path()).write_updates()?;

        Ok(())
    }

    /// Acquire the exclusive repository lock, failing fast when another
    /// process holds it.
    pub fn lock(&self) -> anyhow::Result<RepoLock> {
        let lock_path = self.meta_path().join("lock");
        let lock_file = File::create(&lock_path)
            .with_context(|| format!("unable to create {}", lock_path.display()))?;

        file_guard::try_lock(Box::new(lock_file), Lock::Exclusive, 0, 1).map_err(|e| {
            if e.kind() == std::io::ErrorKind::WouldBlock {
                PygitError::RepoLocked.into()
            } else {
                anyhow::Error::from(e).context("unable to lock repository")
            }
        })
    }

    /// Compile the ignore patterns of the working root
    pub fn ignore(&self) -> IgnoreMatcher {
        IgnoreMatcher::load(self.workspace.root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn remotes(&self) -> &Remotes {
        &self.remotes
    }

    pub fn tracking(&self) -> &Tracking {
        &self.tracking
    }
}
