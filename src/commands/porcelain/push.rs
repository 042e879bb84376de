use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::protocol::client::Client;
use crate::errors::PygitError;
use bytes::Bytes;
use std::io::Write;

impl Repository {
    /// Fast-forward the remote branch to the local tip, sending only the
    /// objects the remote lacks.
    pub async fn push(&self, remote: &str, branch: &str, timeout_secs: u64) -> anyhow::Result<()> {
        let url = self.remotes().url(remote)?;
        let client = Client::new(url, timeout_secs);

        let local_tip = self
            .refs()
            .read_ref(branch)?
            .ok_or_else(|| PygitError::RefNotFound(branch.to_string()))?;

        let remote_tip = client.fetch_tip(branch).await?;
        if let Some(remote_tip) = &remote_tip {
            if remote_tip == &local_tip {
                writeln!(self.writer(), "everything up to date")?;
                return Ok(());
            }
            // the remote tip must be part of our history, or we would rewrite it
            if !self.database().exists(remote_tip)
                || !self.database().is_ancestor(remote_tip, &local_tip)?
            {
                return Err(PygitError::NonFastForward(branch.to_string()).into());
            }
        }

        let present = client.fetch_have().await?;
        let missing: Vec<(ObjectId, Bytes)> = self
            .database()
            .closure(std::slice::from_ref(&local_tip))?
            .into_iter()
            .filter(|oid| !present.contains(oid))
            .map(|oid| {
                let framed = self.database().load_raw(&oid)?;
                Ok((oid, framed))
            })
            .collect::<anyhow::Result<_>>()?;

        writeln!(
            self.writer(),
            "pushing {} to {}/{} ({} objects)",
            local_tip.short(),
            remote,
            branch,
            missing.len()
        )?;

        client
            .push(branch, remote_tip.as_ref(), &local_tip, &missing)
            .await?;

        writeln!(self.writer(), "{branch} -> {}", local_tip.short())?;
        Ok(())
    }
}
