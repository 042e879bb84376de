use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::errors::PygitError;
use std::io::Write;

impl Repository {
    /// Switch to a branch, materializing its tree. With `create`, make the
    /// branch at the current HEAD commit first (no tree change needed).
    pub async fn checkout(&self, target: &str, create: bool) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        if create {
            let Some(tip) = self.refs().resolve_head()? else {
                anyhow::bail!("no commits yet, cannot create a branch");
            };
            self.refs().create_branch(target, &tip)?;
            self.refs().set_head_symbolic(target)?;
            writeln!(self.writer(), "switched to new branch '{target}'")?;
            return Ok(());
        }

        let tip = self
            .refs()
            .read_ref(target)?
            .ok_or_else(|| PygitError::RefNotFound(target.to_string()))?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        Migration::new(self, tip).apply(&mut index)?;
        self.refs().set_head_symbolic(target)?;

        writeln!(self.writer(), "switched to branch '{target}'")?;
        Ok(())
    }
}
