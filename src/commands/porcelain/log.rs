use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print history from the current HEAD, newest first
    pub fn log(&self, limit: Option<usize>) -> anyhow::Result<()> {
        let Some(tip) = self.refs().resolve_head()? else {
            writeln!(self.writer(), "no commits yet")?;
            return Ok(());
        };

        let walk = RevList::new(self.database(), tip).take(limit.unwrap_or(usize::MAX));
        for step in walk {
            let (oid, commit) = step?;
            writeln!(self.writer(), "{}", format!("commit {oid}").yellow())?;
            writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
            writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
            writeln!(self.writer())?;
            for line in commit.message().lines() {
                writeln!(self.writer(), "    {line}")?;
            }
            writeln!(self.writer())?;
        }

        Ok(())
    }
}
