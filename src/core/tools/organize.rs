//! Folder organizer: moves loose files into per-category subfolders.

use super::{ProgressThrottle, PROGRESS_INTERVAL};
use crate::error::{InputError, ToolError};
use crate::events::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Folder used for files no category claims.
pub const OTHER_FOLDER: &str = "Other";

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"]),
    ("Videos", &["mp4", "mov", "avi", "mkv", "wmv"]),
    ("Music", &["mp3", "wav", "aac", "flac"]),
    (
        "Documents",
        &["pdf", "docx", "doc", "xlsx", "xls", "pptx", "ppt", "txt", "csv"],
    ),
    ("Archives", &["zip", "rar", "7z", "tar", "gz"]),
    ("Executables", &["exe", "msi"]),
];

/// How files are grouped
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrganizeMode {
    /// Images, Videos, Documents, ...
    #[default]
    Category,
    /// One folder per extension (JPG, PDF, ...)
    Extension,
}

/// A validated organize request.
#[derive(Debug, Clone)]
pub struct OrganizeRequest {
    folder: PathBuf,
    mode: OrganizeMode,
}

impl OrganizeRequest {
    pub fn new(folder: impl Into<PathBuf>, mode: OrganizeMode) -> Result<Self, InputError> {
        let folder = folder.into();
        if !folder.is_dir() {
            return Err(InputError::NotADirectory { path: folder });
        }
        Ok(Self { folder, mode })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn mode(&self) -> OrganizeMode {
        self.mode
    }
}

/// Result of organizing a folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizeSummary {
    pub files_moved: usize,
    /// Files moved into each destination folder
    pub by_folder: BTreeMap<String, usize>,
}

/// Category folder for a lower-case extension without the dot.
pub fn category_for(extension: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_FOLDER)
}

fn folder_name(path: &Path, mode: OrganizeMode) -> String {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty());

    match (mode, extension) {
        (OrganizeMode::Category, Some(ext)) => category_for(&ext).to_string(),
        (OrganizeMode::Extension, Some(ext)) => ext.to_uppercase(),
        (_, None) => OTHER_FOLDER.to_string(),
    }
}

/// `group`, or `group (n)` when a plain file already holds that name.
fn group_folder(folder: &Path, group: &str) -> String {
    let usable = |name: &str| {
        let path = folder.join(name);
        !path.exists() || path.is_dir()
    };
    if usable(group) {
        return group.to_string();
    }
    (1..)
        .map(|n| format!("{} ({})", group, n))
        .find(|name| usable(name))
        .unwrap_or_else(|| group.to_string())
}

/// Pick `name`, or `stem (n).ext` if `name` is taken in `dir`.
fn unique_destination(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let original = Path::new(file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|n| dir.join(format!("{} ({}){}", stem, n, extension)))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::rename(source, destination).or_else(|_| {
        // rename fails across filesystems, fall back to copy+delete
        let source_size = fs::metadata(source)?.len();
        fs::copy(source, destination)?;

        let dest_size = fs::metadata(destination)?.len();
        if dest_size != source_size {
            let _ = fs::remove_file(destination);
            return Err(std::io::Error::other(format!(
                "Copy verification failed: source {} bytes, dest {} bytes",
                source_size, dest_size
            )));
        }

        fs::remove_file(source)
    })
}

/// Move every regular file directly inside the folder into its group folder.
///
/// Subdirectories are left alone. Clashing names get a ` (n)` suffix, and
/// so does a group folder whose name is taken by a file.
pub fn organize_folder(
    reporter: &ProgressReporter,
    request: &OrganizeRequest,
) -> Result<OrganizeSummary, ToolError> {
    let folder = request.folder();

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ToolError::Read {
            path: folder.to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let total = files.len() as u64;
    reporter.start(total, "Analyzing...");
    tracing::info!(folder = %folder.display(), files = files.len(), mode = ?request.mode(), "Organizing folder");

    // Resolve every group folder before the first move, so a file named
    // like a group cannot break the run halfway.
    let mut resolved: BTreeMap<String, String> = BTreeMap::new();
    let plan: Vec<(&PathBuf, String)> = files
        .iter()
        .map(|source| {
            let group = folder_name(source, request.mode());
            let name = resolved
                .entry(group)
                .or_insert_with_key(|group| group_folder(folder, group))
                .clone();
            (source, name)
        })
        .collect();

    let mut summary = OrganizeSummary::default();
    let mut throttle = ProgressThrottle::new(PROGRESS_INTERVAL);
    for (i, (source, group)) in plan.into_iter().enumerate() {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if throttle.ready() {
            reporter.status(i as u64, format!("Moving: {}", file_name));
        }

        let group_dir = folder.join(&group);
        fs::create_dir_all(&group_dir).map_err(|source| ToolError::Write {
            path: group_dir.clone(),
            source,
        })?;

        let destination = unique_destination(&group_dir, &file_name);
        move_file(source, &destination).map_err(|e| ToolError::Move {
            from: source.clone(),
            to: destination.clone(),
            source: e,
        })?;

        summary.files_moved += 1;
        *summary.by_folder.entry(group).or_default() += 1;
    }

    reporter.status(total, "Organization complete!");
    Ok(summary)
}
