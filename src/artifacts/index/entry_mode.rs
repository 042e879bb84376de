use is_executable::IsExecutable;
use std::fs::Metadata;
use std::path::Path;

/// The three modes an entry can carry: regular file, executable file,
/// or directory (trees only; the index never stores directories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum EntryMode {
    #[default]
    Regular,
    Executable,
    Directory,
}

impl EntryMode {
    pub fn as_octal_str(&self) -> &str {
        match self {
            EntryMode::Regular => "100644",
            EntryMode::Executable => "100755",
            EntryMode::Directory => "40000",
        }
    }

    pub fn from_octal_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "100644" => Ok(EntryMode::Regular),
            "100755" => Ok(EntryMode::Executable),
            "40000" => Ok(EntryMode::Directory),
            _ => Err(anyhow::anyhow!("invalid entry mode: {}", value)),
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    /// Classify a working-tree file. `absolute` must be the file's real
    /// location; the executable check stats it.
    pub fn from_file(absolute: &Path, metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            EntryMode::Directory
        } else if absolute.is_executable() {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        }
    }
}
