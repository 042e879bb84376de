//! Working-tree migration
//!
//! Moves the working tree, index and tracking ledger from the currently
//! checked-out commit to a target commit. Changes are planned first so the
//! safety check can reject the whole migration before anything is touched:
//! a path that differs between the two trees and carries uncommitted changes
//! fails the checkout with `DirtyWorkingTree`.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::compare_trees;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeRecord;
use crate::artifacts::status::FileState;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::PygitError;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct Migration<'r> {
    repository: &'r Repository,
    target_commit: ObjectId,
    /// Migrate from the commit HEAD resolves to (the normal case), or from
    /// an empty tree (clone into a fresh directory)
    from_head: bool,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, target_commit: ObjectId) -> Self {
        Migration {
            repository,
            target_commit,
            from_head: true,
        }
    }

    /// A migration whose starting point is nothing at all
    pub fn rooted(repository: &'r Repository, target_commit: ObjectId) -> Self {
        Migration {
            repository,
            target_commit,
            from_head: false,
        }
    }

    /// Plan, validate and apply the migration
    pub fn apply(&self, index: &mut Index) -> anyhow::Result<()> {
        let database = self.repository.database();

        let base = if self.from_head {
            self.repository.refs().resolve_head()?
        } else {
            None
        };
        let current_tree = match base {
            Some(commit_oid) => {
                let commit = database.parse_commit(&commit_oid)?;
                database.flatten_tree(commit.tree_oid())?
            }
            None => BTreeMap::new(),
        };

        let target_commit = database.parse_commit(&self.target_commit)?;
        let target_tree = database.flatten_tree(target_commit.tree_oid())?;

        let changes = compare_trees(&current_tree, &target_tree);
        self.refuse_when_dirty(index, changes.keys())?;

        let ignore = self.repository.ignore();
        for (path, change) in &changes {
            match change.target() {
                None => self.repository.workspace().remove_file(path)?,
                Some(record) => {
                    if ignore.is_ignored(path, false) {
                        continue;
                    }
                    let blob = database.parse_blob(&record.oid)?;
                    self.repository
                        .workspace()
                        .write_file(path, blob.content(), record.mode)?;
                }
            }
        }

        self.reset_index(index, &target_tree)?;
        self.reset_ledger(&target_tree)?;

        Ok(())
    }

    fn refuse_when_dirty<'p>(
        &self,
        index: &Index,
        changed: impl Iterator<Item = &'p PathBuf>,
    ) -> anyhow::Result<()> {
        let report = Inspector::new(self.repository).report(index)?;

        let blocked: Vec<String> = changed
            .filter(|path| report.states_of(path).is_some_and(|states| {
                states.iter().any(|state| *state != FileState::Untracked)
            }))
            .map(|path| format!("\t{}", path.display()))
            .collect();

        if blocked.is_empty() {
            Ok(())
        } else {
            Err(PygitError::DirtyWorkingTree(blocked.join("\n")).into())
        }
    }

    /// Rebuild the index from the freshly materialized files
    fn reset_index(
        &self,
        index: &mut Index,
        target_tree: &BTreeMap<PathBuf, TreeRecord>,
    ) -> anyhow::Result<()> {
        index.clear();

        for (path, record) in target_tree {
            let Some(metadata) = self.repository.workspace().stat(path)? else {
                continue; // ignored entries were never written
            };
            index.add(IndexEntry::from_metadata(
                path.clone(),
                record.oid.clone(),
                &metadata,
                record.mode,
            ));
        }

        index.write_updates().context("unable to persist index")
    }

    fn reset_ledger(
        &self,
        target_tree: &BTreeMap<PathBuf, TreeRecord>,
    ) -> anyhow::Result<()> {
        let ledger: BTreeMap<PathBuf, ObjectId> = target_tree
            .iter()
            .map(|(path, record)| (path.clone(), record.oid.clone()))
            .collect();
        self.repository.tracking().save(&ledger)
    }
}
