//! Sequential renamer: copies files into a folder as `1.jpg`, `2.jpg`, ...

use super::{ProgressThrottle, PROGRESS_INTERVAL};
use crate::error::{InputError, ToolError};
use crate::events::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Zero padding applied to the sequence number
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// 1, 2, ... 10
    #[default]
    Plain,
    /// 01, 02, ... 10
    TwoDigits,
    /// 001, 002, ... 010
    ThreeDigits,
}

impl NumberFormat {
    pub fn format(self, number: u64) -> String {
        match self {
            NumberFormat::Plain => number.to_string(),
            NumberFormat::TwoDigits => format!("{:02}", number),
            NumberFormat::ThreeDigits => format!("{:03}", number),
        }
    }
}

/// A validated copy-and-rename request.
#[derive(Debug, Clone)]
pub struct RenameRequest {
    files: Vec<PathBuf>,
    destination: PathBuf,
    start: u64,
    format: NumberFormat,
}

impl RenameRequest {
    pub fn new(
        files: Vec<PathBuf>,
        destination: impl Into<PathBuf>,
        start: u64,
        format: NumberFormat,
    ) -> Result<Self, InputError> {
        if files.is_empty() {
            return Err(InputError::NoFiles);
        }
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(InputError::NotAFile {
                path: missing.clone(),
            });
        }
        let destination = destination.into();
        if !destination.is_dir() {
            return Err(InputError::NotADirectory { path: destination });
        }
        Ok(Self {
            files,
            destination,
            start,
            format,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Target path for the file at `index`, keeping its extension.
    pub fn target_for(&self, index: usize) -> PathBuf {
        let number = self.format.format(self.start + index as u64);
        let name = match self.files[index].extension() {
            Some(ext) => format!("{}.{}", number, ext.to_string_lossy()),
            None => number,
        };
        self.destination.join(name)
    }
}

/// Copy every file into the destination under its sequence number.
///
/// Existing files with the same name are overwritten. Returns how many
/// files were copied.
pub fn copy_renamed(reporter: &ProgressReporter, request: &RenameRequest) -> Result<usize, ToolError> {
    let total = request.files().len();
    reporter.start(total as u64, "Copying...");

    let mut throttle = ProgressThrottle::new(PROGRESS_INTERVAL);
    for (i, source) in request.files().iter().enumerate() {
        let target = request.target_for(i);
        fs::copy(source, &target).map_err(|e| ToolError::Write {
            path: target.clone(),
            source: e,
        })?;
        tracing::debug!(from = %source.display(), to = %target.display(), "Copied");
        if throttle.ready() || i + 1 == total {
            reporter.progress(i as u64 + 1);
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ProgressUpdate;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[test]
    fn number_formats_pad() {
        assert_eq!(NumberFormat::Plain.format(7), "7");
        assert_eq!(NumberFormat::TwoDigits.format(7), "07");
        assert_eq!(NumberFormat::ThreeDigits.format(7), "007");
        assert_eq!(NumberFormat::TwoDigits.format(123), "123");
    }

    #[test]
    fn request_requires_files_and_folder() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            RenameRequest::new(vec![], temp.path(), 1, NumberFormat::Plain).unwrap_err(),
            InputError::NoFiles
        );

        let file = temp.path().join("a.txt");
        fs::write(&file, "a").unwrap();
        let err = RenameRequest::new(vec![file], temp.path().join("nope"), 1, NumberFormat::Plain)
            .unwrap_err();
        assert!(matches!(err, InputError::NotADirectory { .. }));
    }

    #[test]
    fn copies_with_sequence_names_and_reports_each_file() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["scan.pdf", "photo.jpeg", "LICENSE"]
            .iter()
            .map(|name| {
                let path = src.path().join(name);
                fs::write(&path, name.as_bytes()).unwrap();
                path
            })
            .collect();

        let request = RenameRequest::new(files, dest.path(), 9, NumberFormat::TwoDigits).unwrap();
        let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::default();
        let log = Arc::clone(&updates);
        let reporter = ProgressReporter::from_fn(move |u| log.lock().unwrap().push(u));

        let copied = copy_renamed(&reporter, &request).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(dest.path().join("09.pdf")).unwrap(), "scan.pdf");
        assert!(dest.path().join("10.jpeg").exists());
        assert!(dest.path().join("11").exists());
        assert!(src.path().join("scan.pdf").exists());

        let updates = updates.lock().unwrap();
        assert_eq!(updates[0].maximum, Some(3));
        let positions: Vec<u64> = updates.iter().map(|u| u.current).collect();
        assert_eq!(positions.first(), Some(&0));
        assert_eq!(positions.get(1), Some(&1));
        assert_eq!(positions.last(), Some(&3));
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
