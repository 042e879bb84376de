use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        self.create_skeleton()?;
        writeln!(
            self.writer(),
            "Initialized empty repository in {}",
            self.meta_path().display()
        )?;
        Ok(())
    }
}
