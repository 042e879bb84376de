//! Unified diff output
//!
//! Groups a Myers edit script into hunks with three lines of context and
//! renders the familiar `---`/`+++`/`@@` form. Content with a NUL byte in its
//! first 8 KiB is treated as binary and summarized instead of diffed.

pub mod myers;

use crate::artifacts::diff::myers::{Edit, EditKind, MyersDiff};
use std::fmt::Write;

/// Lines of context around each change
pub const HUNK_CONTEXT: usize = 3;

/// How far into the content the binary sniff looks
const BINARY_SNIFF_LEN: usize = 8192;

/// Label used for an absent side
pub const NULL_PATH: &str = "/dev/null";

/// NUL byte near the front means "do not line-diff this"
pub fn looks_binary(content: &[u8]) -> bool {
    content[..content.len().min(BINARY_SNIFF_LEN)].contains(&0)
}

/// A group of edits sharing one `@@` header
#[derive(Debug)]
pub struct Hunk {
    edits: Vec<Edit>,
}

impl Hunk {
    /// Cluster changes into hunks, attaching up to `HUNK_CONTEXT` equal lines
    /// on both sides and merging clusters whose context would overlap.
    pub fn build(edits: Vec<Edit>) -> Vec<Hunk> {
        let changed: Vec<usize> = edits
            .iter()
            .enumerate()
            .filter(|(_, edit)| edit.kind != EditKind::Eql)
            .map(|(index, _)| index)
            .collect();

        if changed.is_empty() {
            return Vec::new();
        }

        let mut clusters: Vec<(usize, usize)> = Vec::new();
        for &index in &changed {
            match clusters.last_mut() {
                Some((_, last)) if index - *last <= 2 * HUNK_CONTEXT + 1 => *last = index,
                _ => clusters.push((index, index)),
            }
        }

        clusters
            .into_iter()
            .map(|(first, last)| {
                let start = first.saturating_sub(HUNK_CONTEXT);
                let end = (last + HUNK_CONTEXT + 1).min(edits.len());
                Hunk {
                    edits: edits[start..end].to_vec(),
                }
            })
            .collect()
    }

    fn side_range(&self, pick: impl Fn(&Edit) -> Option<usize>) -> (usize, usize) {
        let numbers: Vec<usize> = self.edits.iter().filter_map(&pick).collect();
        match numbers.first() {
            Some(&first) => (first, numbers.len()),
            None => (0, 0),
        }
    }

    pub fn header(&self) -> String {
        let (a_start, a_size) = self.side_range(|edit| edit.a_line.as_ref().map(|l| l.number));
        let (b_start, b_size) = self.side_range(|edit| edit.b_line.as_ref().map(|l| l.number));
        format!("@@ -{a_start},{a_size} +{b_start},{b_size} @@")
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }
}

/// Render a full unified diff between two sides of one path.
///
/// Returns `None` when the contents are identical. Byte-identical inputs
/// always produce byte-identical output.
pub fn unified(old_label: &str, new_label: &str, old: &[u8], new: &[u8]) -> Option<String> {
    if old == new {
        return None;
    }

    let mut output = String::new();
    writeln!(output, "--- {old_label}").ok()?;
    writeln!(output, "+++ {new_label}").ok()?;

    if looks_binary(old) || looks_binary(new) {
        writeln!(output, "Binary files differ").ok()?;
        return Some(output);
    }

    let old_text = String::from_utf8_lossy(old);
    let new_text = String::from_utf8_lossy(new);
    for hunk in Hunk::build(MyersDiff::new(&old_text, &new_text).edits()) {
        writeln!(output, "{}", hunk.header()).ok()?;
        for edit in hunk.edits() {
            writeln!(output, "{edit}").ok()?;
        }
    }

    Some(output)
}
