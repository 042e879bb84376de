use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::diff::{NULL_PATH, unified};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::FileState;
use crate::artifacts::status::inspector::Inspector;
use bytes::Bytes;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

impl Repository {
    /// Unified diffs for every changed path, in path order: staged changes
    /// against the committed content, unstaged changes against the staged
    /// (or committed) content, deletions against nothing.
    pub async fn diff(&self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let report = Inspector::new(self).report(&index)?;
        let ledger = self.tracking().load()?;

        for (path, states) in report.iter() {
            for state in states {
                let (old, new) = match state {
                    FileState::StagedNew => {
                        (None, self.staged_content(&index, path)?)
                    }
                    FileState::StagedModified => (
                        self.committed_content(&ledger, path)?,
                        self.staged_content(&index, path)?,
                    ),
                    FileState::UnstagedModified => {
                        let base = match self.staged_content(&index, path)? {
                            Some(content) => Some(content),
                            None => self.committed_content(&ledger, path)?,
                        };
                        (base, Some(self.workspace().read_file(path)?))
                    }
                    FileState::Deleted => (self.committed_content(&ledger, path)?, None),
                    FileState::Untracked => continue,
                };

                self.print_unified(path, old, new)?;
            }
        }

        Ok(())
    }

    fn staged_content(
        &self,
        index: &Index,
        path: &Path,
    ) -> anyhow::Result<Option<Bytes>> {
        match index.get(path) {
            Some(entry) => Ok(Some(self.database().parse_blob(&entry.oid)?.content().clone())),
            None => Ok(None),
        }
    }

    fn committed_content(
        &self,
        ledger: &BTreeMap<PathBuf, ObjectId>,
        path: &Path,
    ) -> anyhow::Result<Option<Bytes>> {
        match ledger.get(path) {
            Some(oid) => Ok(Some(self.database().parse_blob(oid)?.content().clone())),
            None => Ok(None),
        }
    }

    fn print_unified(
        &self,
        path: &Path,
        old: Option<Bytes>,
        new: Option<Bytes>,
    ) -> anyhow::Result<()> {
        let old_label = match &old {
            Some(_) => format!("a/{}", path.display()),
            None => NULL_PATH.to_string(),
        };
        let new_label = match &new {
            Some(_) => format!("b/{}", path.display()),
            None => NULL_PATH.to_string(),
        };

        let old = old.unwrap_or_default();
        let new = new.unwrap_or_default();
        let Some(rendered) = unified(&old_label, &new_label, &old, &new) else {
            return Ok(());
        };

        writeln!(
            self.writer(),
            "{}",
            format!("diff --pygit a/{0} b/{0}", path.display()).bold()
        )?;
        write!(self.writer(), "{rendered}")?;
        Ok(())
    }
}
