use crate::areas::refs::HeadTarget;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::tree::{Tree, TreeBuilder};
use crate::errors::PygitError;
use std::io::Write;

impl Repository {
    /// Fold the index into a tree, wrap it in a commit and advance the
    /// current branch. The index keeps its entries afterwards; the tracking
    /// ledger becomes the committed snapshot.
    pub async fn commit(&self, message: &str) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.is_empty() {
            return Err(PygitError::EmptyCommit.into());
        }

        let branch = match self.refs().head_target()? {
            Some(HeadTarget::Branch(branch)) => branch,
            _ => return Err(PygitError::RefNotFound("HEAD".to_string()).into()),
        };
        let parent = self.refs().read_ref(&branch)?;
        let author = Author::from_env()?;

        let tree_oid = TreeBuilder::build(index.entries())?
            .persist(&|tree: &Tree| self.database().store(tree))?;

        let commit = Commit::new(parent.clone(), tree_oid, author, message.trim().to_string());
        let commit_oid = self.database().store(&commit)?;

        // objects are all on disk; the ref rename is the commit point
        self.refs().write_ref(&branch, &commit_oid)?;

        let ledger = index
            .entries()
            .map(|entry| (entry.path.clone(), entry.oid.clone()))
            .collect();
        self.tracking().save(&ledger)?;

        let root_marker = if parent.is_none() { "(root-commit) " } else { "" };
        writeln!(
            self.writer(),
            "[{} {}{}] {}",
            branch,
            root_marker,
            commit_oid.short(),
            commit.short_message()
        )?;

        Ok(())
    }
}
