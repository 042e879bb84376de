//! Staging area data structures
//!
//! The index maps working-tree paths to the blob that would be committed for
//! them, plus the stat data (mtime, size, mode) used for cheap change checks.
//!
//! ## File format
//!
//! One record per line, sorted by path:
//!
//! ```text
//! <40-hex> <mode-octal> <mtime-secs> <size>\t<path>
//! ```
//!
//! The whole table is rewritten through a temp file + rename on save.

pub mod entry_mode;
pub mod index_entry;
