//! Working-tree status classification

pub mod inspector;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// The states a path can be reported in. A path may carry more than one
/// (staged and then edited again is both `StagedModified` and
/// `UnstagedModified`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileState {
    /// In the index, never committed on this branch
    StagedNew,
    /// Staged content differs from the committed content
    StagedModified,
    /// Working-tree content differs from what is staged (or committed)
    UnstagedModified,
    /// Committed on this branch, missing from the working tree
    Deleted,
    /// Present on disk, unknown to both index and ledger
    Untracked,
}

impl FileState {
    pub fn label(&self) -> &str {
        match self {
            FileState::StagedNew => "staged-new",
            FileState::StagedModified => "staged-modified",
            FileState::UnstagedModified => "unstaged-modified",
            FileState::Deleted => "deleted",
            FileState::Untracked => "untracked",
        }
    }

    /// Staged states describe index-vs-ledger differences
    pub fn is_staged(&self) -> bool {
        matches!(self, FileState::StagedNew | FileState::StagedModified)
    }
}

/// Everything status found, keyed by path
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusReport {
    states: BTreeMap<PathBuf, BTreeSet<FileState>>,
}

impl StatusReport {
    pub fn record(&mut self, path: PathBuf, state: FileState) {
        self.states.entry(path).or_default().insert(state);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &BTreeSet<FileState>)> {
        self.states.iter()
    }

    pub fn states_of(&self, path: &std::path::Path) -> Option<&BTreeSet<FileState>> {
        self.states.get(path)
    }

    pub fn is_clean(&self) -> bool {
        self.states.is_empty()
    }
}
