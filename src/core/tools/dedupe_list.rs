//! Duplicate finder for line-based lists.
//!
//! Like the list splitter this is instant, so it runs inline on the UI
//! thread.

use crate::error::{InputError, ToolError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// File the unique items are written to.
pub const UNIQUE_FILE_NAME: &str = "lista_unicos.txt";
/// File the duplicated items are written to.
pub const DUPLICATES_FILE_NAME: &str = "lista_duplicados.txt";

/// Unique and duplicated items of a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DedupeReport {
    /// Every distinct item, in first-seen order
    pub unique: Vec<String>,
    /// Items seen more than once, each listed once, sorted
    pub duplicates: Vec<String>,
}

impl DedupeReport {
    /// Write both lists into `dir`, returning the two paths.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf), ToolError> {
        let unique = dir.join(UNIQUE_FILE_NAME);
        let duplicates = dir.join(DUPLICATES_FILE_NAME);
        for (path, items) in [(&unique, &self.unique), (&duplicates, &self.duplicates)] {
            fs::write(path, items.join("\n")).map_err(|source| ToolError::Write {
                path: path.clone(),
                source,
            })?;
        }
        Ok((unique, duplicates))
    }
}

/// Trim every line, drop blanks, and separate unique items from repeats.
pub fn dedupe_list(text: &str) -> Result<DedupeReport, InputError> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();
    let mut unique = Vec::new();

    for item in text.lines().map(str::trim).filter(|item| !item.is_empty()) {
        if seen.insert(item) {
            unique.push(item.to_string());
        } else {
            duplicates.insert(item.to_string());
        }
    }

    if unique.is_empty() {
        return Err(InputError::EmptyList);
    }

    Ok(DedupeReport {
        unique,
        duplicates: duplicates.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn keeps_first_seen_order_and_sorts_repeats() {
        let report = dedupe_list(" pear\napple\n\npear \nfig\napple\npear\n").unwrap();
        assert_eq!(report.unique, vec!["pear", "apple", "fig"]);
        assert_eq!(report.duplicates, vec!["apple", "pear"]);
    }

    #[test]
    fn list_without_repeats_has_no_duplicates() {
        let report = dedupe_list("a\nb\nc").unwrap();
        assert_eq!(report.unique.len(), 3);
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(dedupe_list("\n  \n\t\n").unwrap_err(), InputError::EmptyList);
    }

    #[test]
    fn writes_both_files() {
        let temp = TempDir::new().unwrap();
        let report = dedupe_list("x\ny\nx").unwrap();

        let (unique, duplicates) = report.write_to(temp.path()).unwrap();

        assert_eq!(unique, temp.path().join(UNIQUE_FILE_NAME));
        assert_eq!(fs::read_to_string(unique).unwrap(), "x\ny");
        assert_eq!(fs::read_to_string(duplicates).unwrap(), "x");
    }
}
