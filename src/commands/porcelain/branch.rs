use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// With a name: create a branch at the current HEAD commit.
    /// Without: list branches, marking the checked-out one.
    pub fn branch(&self, name: Option<&str>) -> anyhow::Result<()> {
        match name {
            Some(name) => {
                let Some(tip) = self.refs().resolve_head()? else {
                    anyhow::bail!("no commits yet, cannot create a branch");
                };
                self.refs().create_branch(name, &tip)?;
                writeln!(self.writer(), "created branch '{}' at {}", name, tip.short())?;
            }
            None => {
                let current = self.refs().current_branch()?;
                for (branch, _) in self.refs().list_branches()? {
                    let marker = if Some(&branch) == current.as_ref() {
                        "* "
                    } else {
                        "  "
                    };
                    writeln!(self.writer(), "{marker}{branch}")?;
                }
            }
        }

        Ok(())
    }
}
