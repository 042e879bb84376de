//! Branch tips and HEAD
//!
//! Branches are one-line files under `refs/heads/`; `HEAD` is either the
//! symbolic form `ref: <branch>\n` or a bare commit id. Every write goes
//! through a temp file + rename so readers never observe a torn pointer.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::PygitError;
use anyhow::Context;
use derive_new::new;
use std::path::{Path, PathBuf};

const SYMBOLIC_PREFIX: &str = "ref: ";

const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadTarget {
    /// Symbolic reference to a branch (the usual state)
    Branch(String),
    /// Detached commit id
    Detached(ObjectId),
}

#[derive(Debug, new)]
pub struct Refs {
    /// The metadata directory (`.pygit`)
    path: Box<Path>,
}

impl Refs {
    /// Read a branch tip; `None` when the branch does not exist
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        match std::fs::read_to_string(&branch_path) {
            Ok(content) => Ok(Some(ObjectId::try_parse(content.trim())?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).context(format!("unable to read ref {}", branch_path.display()))
            }
        }
    }

    /// Point a branch at a commit, atomically
    pub fn write_ref(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let branch_path = self.branch_path(name);
        std::fs::create_dir_all(
            branch_path
                .parent()
                .context("branch path has no parent directory")?,
        )?;
        self.atomic_write(&branch_path, format!("{oid}\n").as_bytes())
    }

    /// Create a branch at `oid`, failing when the name is taken or invalid
    pub fn create_branch(&self, name: &str, oid: &ObjectId) -> anyhow::Result<()> {
        if !Self::is_valid_branch_name(name)? {
            anyhow::bail!("invalid branch name: {}", name);
        }
        if self.branch_path(name).exists() {
            anyhow::bail!("branch '{}' already exists", name);
        }
        self.write_ref(name, oid)
    }

    /// All branches with their tips, sorted by name. Hierarchical names
    /// (`feature/login`) live in nested directories under `refs/heads`.
    pub fn list_branches(&self) -> anyhow::Result<Vec<(String, ObjectId)>> {
        let heads = self.heads_path();
        if !heads.exists() {
            return Ok(Vec::new());
        }

        let mut branches = Vec::new();
        self.collect_branches(&heads, "", &mut branches)?;
        branches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(branches)
    }

    fn collect_branches(
        &self,
        dir: &Path,
        prefix: &str,
        branches: &mut Vec<(String, ObjectId)>,
    ) -> anyhow::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            let qualified = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            if entry.file_type()?.is_dir() {
                self.collect_branches(&entry.path(), &qualified, branches)?;
            } else if let Ok(Some(oid)) = self.read_ref(&qualified) {
                // skips stray temp files from interrupted writes
                branches.push((qualified, oid));
            }
        }
        Ok(())
    }

    /// Parse HEAD; `None` when the HEAD file is missing
    pub fn head_target(&self) -> anyhow::Result<Option<HeadTarget>> {
        let content = match std::fs::read_to_string(self.head_path()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context("unable to read HEAD"),
        };

        let content = content.trim();
        if let Some(branch) = content.strip_prefix(SYMBOLIC_PREFIX) {
            Ok(Some(HeadTarget::Branch(branch.to_string())))
        } else {
            Ok(Some(HeadTarget::Detached(ObjectId::try_parse(content)?)))
        }
    }

    /// Point HEAD at a branch symbolically
    pub fn set_head_symbolic(&self, branch: &str) -> anyhow::Result<()> {
        self.atomic_write(
            &self.head_path(),
            format!("{SYMBOLIC_PREFIX}{branch}\n").as_bytes(),
        )
    }

    /// The branch HEAD names, if HEAD is symbolic
    pub fn current_branch(&self) -> anyhow::Result<Option<String>> {
        match self.head_target()? {
            Some(HeadTarget::Branch(branch)) => Ok(Some(branch)),
            _ => Ok(None),
        }
    }

    /// Resolve HEAD to a commit through at most one indirection.
    /// `None` on a freshly initialized repository with no commits.
    pub fn resolve_head(&self) -> anyhow::Result<Option<ObjectId>> {
        match self.head_target()? {
            None => Err(PygitError::RefNotFound("HEAD".to_string()).into()),
            Some(HeadTarget::Detached(oid)) => Ok(Some(oid)),
            Some(HeadTarget::Branch(branch)) => self.read_ref(&branch),
        }
    }

    fn is_valid_branch_name(name: &str) -> anyhow::Result<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .context("invalid branch name pattern")?;
        // the pattern matches what is NOT allowed
        Ok(!re.is_match(name))
    }

    fn atomic_write(&self, path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let parent = path.parent().context("ref path has no parent directory")?;
        let temp_path = parent.join(format!("tmp-ref-{}", std::process::id()));
        std::fs::write(&temp_path, content)
            .with_context(|| format!("unable to write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("unable to move ref into {}", path.display()))?;
        Ok(())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join("HEAD")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs").join("heads")
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.heads_path().join(name)
    }
}
