//! Checkout: tree comparison and working-tree migration

pub mod migration;

use crate::artifacts::objects::tree::TreeRecord;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How a path differs between two flattened trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// Present only in the target tree
    Added(TreeRecord),
    /// Present only in the source tree
    Deleted,
    /// Present in both with different content or mode
    Modified(TreeRecord),
}

impl TreeChange {
    /// The record to materialize, if any
    pub fn target(&self) -> Option<&TreeRecord> {
        match self {
            TreeChange::Added(record) | TreeChange::Modified(record) => Some(record),
            TreeChange::Deleted => None,
        }
    }
}

/// Paths that differ between two flattened trees
pub fn compare_trees(
    old: &BTreeMap<PathBuf, TreeRecord>,
    new: &BTreeMap<PathBuf, TreeRecord>,
) -> BTreeMap<PathBuf, TreeChange> {
    let mut changes = BTreeMap::new();

    for (path, old_record) in old {
        match new.get(path) {
            None => {
                changes.insert(path.clone(), TreeChange::Deleted);
            }
            Some(new_record) if new_record != old_record => {
                changes.insert(path.clone(), TreeChange::Modified(new_record.clone()));
            }
            Some(_) => {}
        }
    }

    for (path, new_record) in new {
        if !old.contains_key(path) {
            changes.insert(path.clone(), TreeChange::Added(new_record.clone()));
        }
    }

    changes
}
