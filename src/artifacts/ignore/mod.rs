//! `.pygitignore` pattern matching
//!
//! Supported syntax, per pattern line:
//! - blank lines and `#` comments are skipped
//! - `name` matches any path component named `name`
//! - a trailing `/` restricts the pattern to directory components
//! - `*` is a glob within a single component
//!
//! No `**`, no negation, no leading-`/` anchoring. A path is ignored when any
//! pattern matches any of its components; the metadata directory is always
//! ignored. Malformed patterns are skipped with a warning rather than
//! aborting the command.

use crate::areas::META_DIR;
use regex::Regex;
use std::path::Path;

/// Name of the pattern file at the working root
pub const IGNORE_FILE: &str = ".pygitignore";

#[derive(Debug)]
struct IgnoreRule {
    pattern: Regex,
    dir_only: bool,
}

#[derive(Debug, Default)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
    /// Human-readable notes about skipped pattern lines
    warnings: Vec<String>,
}

impl IgnoreMatcher {
    /// Compile the pattern file at the working root; a missing file yields an
    /// empty matcher.
    pub fn load(root: &Path) -> Self {
        match std::fs::read_to_string(root.join(IGNORE_FILE)) {
            Ok(content) => Self::compile(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn compile(content: &str) -> Self {
        let mut matcher = Self::default();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match Self::compile_rule(line) {
                Ok(rule) => matcher.rules.push(rule),
                Err(reason) => matcher.warnings.push(format!(
                    "{IGNORE_FILE}:{}: skipping pattern {:?}: {}",
                    line_no + 1,
                    line,
                    reason
                )),
            }
        }

        matcher
    }

    fn compile_rule(line: &str) -> Result<IgnoreRule, String> {
        let dir_only = line.ends_with('/');
        let component = line.trim_end_matches('/');

        if component.is_empty() {
            return Err("empty pattern".to_string());
        }
        if component.contains('/') {
            return Err("patterns match single path components".to_string());
        }

        let mut regex = String::from("^");
        for c in component.chars() {
            match c {
                '*' => regex.push_str("[^/]*"),
                c => regex.push_str(&regex::escape(&c.to_string())),
            }
        }
        regex.push('$');

        let pattern = Regex::new(&regex).map_err(|e| e.to_string())?;
        Ok(IgnoreRule { pattern, dir_only })
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Should `path` be invisible to add/status/checkout?
    ///
    /// `is_dir` says whether the path itself names a directory; every
    /// non-final component is one by construction.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let components: Vec<&str> = path
            .iter()
            .filter_map(|component| component.to_str())
            .collect();

        for (position, component) in components.iter().enumerate() {
            if *component == META_DIR {
                return true;
            }

            let component_is_dir = position + 1 < components.len() || is_dir;
            for rule in &self.rules {
                if rule.dir_only && !component_is_dir {
                    continue;
                }
                if rule.pattern.is_match(component) {
                    return true;
                }
            }
        }

        false
    }
}
