use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::protocol::client::Client;
use crate::errors::PygitError;
use std::io::Write;

impl Repository {
    /// Fetch the remote branch and fast-forward the local ref. When the
    /// pulled branch is checked out, the working tree follows.
    pub async fn pull(&self, remote: &str, branch: &str, timeout_secs: u64) -> anyhow::Result<()> {
        let _lock = self.lock()?;

        let url = self.remotes().url(remote)?;
        let client = Client::new(url, timeout_secs);

        let remote_tip = client
            .pull(branch, self.database())
            .await?
            .ok_or_else(|| PygitError::RefNotFound(format!("{remote}/{branch}")))?;

        let local_tip = self.refs().read_ref(branch)?;
        if local_tip.as_ref() == Some(&remote_tip) {
            writeln!(self.writer(), "already up to date")?;
            return Ok(());
        }

        if let Some(local_tip) = &local_tip
            && !self.database().is_ancestor(local_tip, &remote_tip)?
        {
            return Err(PygitError::NonFastForward(branch.to_string()).into());
        }

        // everything the new tip references must have arrived
        self.database()
            .closure(std::slice::from_ref(&remote_tip))?;

        if self.refs().current_branch()?.as_deref() == Some(branch) {
            let index = self.index();
            let mut index = index.lock().await;
            index.rehydrate()?;
            Migration::new(self, remote_tip.clone()).apply(&mut index)?;
        }

        self.refs().write_ref(branch, &remote_tip)?;
        writeln!(
            self.writer(),
            "updated {branch} to {}",
            remote_tip.short()
        )?;
        Ok(())
    }
}
