use crate::areas::repository::Repository;
use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Stage files: hash content into the object store and record the index
    /// entry. `add .` stages everything under the working root. A staged path
    /// that no longer exists on disk is removed from the index.
    pub async fn add(&self, paths: &[String]) -> anyhow::Result<()> {
        let _lock = self.lock()?;
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let ignore = self.ignore();
        for warning in ignore.warnings() {
            writeln!(self.writer(), "warning: {warning}")?;
        }

        for raw in paths {
            let prefix = if raw == "." {
                None
            } else {
                Some(Path::new(raw.as_str()))
            };

            let files = self.workspace().list_files(prefix)?;
            if files.is_empty() && prefix.is_some() {
                if index.remove(Path::new(raw.as_str())) {
                    writeln!(self.writer(), "removed {raw}")?;
                } else {
                    writeln!(self.writer(), "path not found: {raw}")?;
                }
                continue;
            }

            for path in files {
                if ignore.is_ignored(&path, false) {
                    continue;
                }

                let Some(metadata) = self.workspace().stat(&path)? else {
                    continue; // raced away between listing and hashing
                };
                let content = match self.workspace().read_file(&path) {
                    Ok(content) => content,
                    Err(_) => continue, // unreadable files are skipped
                };

                let blob = Blob::from_bytes(content);
                let oid = blob.object_id()?;
                let mode = EntryMode::from_file(&self.workspace().absolute(&path), &metadata);

                // re-adding identical content with an identical mode changes nothing
                if let Some(entry) = index.get(&path)
                    && entry.oid == oid
                    && entry.mode == mode
                {
                    continue;
                }

                self.database().store(&blob)?;
                index.add(IndexEntry::from_metadata(path.clone(), oid, &metadata, mode));
                writeln!(self.writer(), "added {}", path.display())?;
            }
        }

        index.write_updates()?;
        Ok(())
    }
}
