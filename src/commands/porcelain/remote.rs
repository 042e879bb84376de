use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn remote_add(&self, name: &str, url: &str) -> anyhow::Result<()> {
        self.remotes().add(name, url)?;
        writeln!(self.writer(), "added remote '{name}' ({url})")?;
        Ok(())
    }

    pub fn remote_remove(&self, name: &str) -> anyhow::Result<()> {
        self.remotes().remove(name)?;
        writeln!(self.writer(), "removed remote '{name}'")?;
        Ok(())
    }

    pub fn remote_list(&self) -> anyhow::Result<()> {
        for (name, url) in self.remotes().list()? {
            writeln!(self.writer(), "{name}\t{url}")?;
        }
        Ok(())
    }
}
