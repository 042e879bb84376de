use crate::areas::repository::Repository;
use crate::artifacts::status::inspector::Inspector;
use colored::Colorize;
use std::io::Write;

impl Repository {
    pub async fn status(&self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let ignore = self.ignore();
        for warning in ignore.warnings() {
            writeln!(self.writer(), "warning: {warning}")?;
        }

        let report = Inspector::new(self).report(&index)?;
        if report.is_clean() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
            return Ok(());
        }

        for (path, states) in report.iter() {
            for state in states {
                let line = format!("{}: {}", state.label(), path.display());
                let line = if state.is_staged() {
                    line.green()
                } else {
                    line.red()
                };
                writeln!(self.writer(), "{line}")?;
            }
        }

        Ok(())
    }
}
