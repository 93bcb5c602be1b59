//! CSV splitter: breaks a large CSV into parts that each repeat the header.
//!
//! Records are taken to be one per line. Quoted fields spanning several
//! lines are not supported. The file is handled as raw bytes, so line
//! endings and non-UTF-8 encodings (Latin-1 exports) are copied unchanged.

use super::{ProgressThrottle, PROGRESS_INTERVAL};
use crate::error::{InputError, ToolError};
use crate::events::ProgressReporter;
use std::fs;
use std::path::{Path, PathBuf};

/// A validated split request.
#[derive(Debug, Clone)]
pub struct SplitCsvRequest {
    file: PathBuf,
    rows_per_part: usize,
    destination: PathBuf,
}

impl SplitCsvRequest {
    pub fn new(
        file: impl Into<PathBuf>,
        rows_per_part: usize,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, InputError> {
        if rows_per_part == 0 {
            return Err(InputError::NotPositive {
                field: "Rows per file",
                value: rows_per_part.to_string(),
            });
        }
        let file = file.into();
        if !file.is_file() {
            return Err(InputError::NotAFile { path: file });
        }
        let destination = destination.into();
        if !destination.is_dir() {
            return Err(InputError::NotADirectory { path: destination });
        }
        Ok(Self {
            file,
            rows_per_part,
            destination,
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Output path of part `index` (1-based): `<stem>_part_<index><ext>`.
    pub fn part_path(&self, index: usize) -> PathBuf {
        let stem = self
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = self
            .file
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        self.destination
            .join(format!("{}_part_{}{}", stem, index, extension))
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| matches!(b, b'\r' | b'\n'))
}

/// Append `line`, terminating it if it is the unterminated last line.
fn push_line(output: &mut Vec<u8>, line: &[u8], terminator: &[u8]) {
    output.extend_from_slice(line);
    if !line.ends_with(b"\n") {
        output.extend_from_slice(terminator);
    }
}

/// Split the file, returning how many parts were written.
///
/// A file with a header but no data rows produces no parts.
pub fn split_csv(reporter: &ProgressReporter, request: &SplitCsvRequest) -> Result<usize, ToolError> {
    reporter.status(0, "Reading source file...");

    let contents = fs::read(request.file()).map_err(|source| ToolError::Read {
        path: request.file().to_path_buf(),
        source,
    })?;

    let mut lines = contents.split_inclusive(|&b| b == b'\n');
    let header = lines
        .next()
        .filter(|h| !is_blank(h))
        .ok_or_else(|| ToolError::MissingHeader {
            path: request.file().to_path_buf(),
        })?;
    let terminator: &[u8] = if header.ends_with(b"\r\n") {
        b"\r\n"
    } else {
        b"\n"
    };
    let rows: Vec<&[u8]> = lines.filter(|line| !is_blank(line)).collect();

    let parts = rows.len().div_ceil(request.rows_per_part);
    reporter.start(parts as u64, format!("{} rows in total.", rows.len()));
    tracing::info!(
        file = %request.file().display(),
        rows = rows.len(),
        parts,
        "Splitting CSV"
    );

    let mut throttle = ProgressThrottle::new(PROGRESS_INTERVAL);
    for (i, chunk) in rows.chunks(request.rows_per_part).enumerate() {
        if throttle.ready() {
            reporter.status(i as u64, format!("Writing part {}/{}...", i + 1, parts));
        }

        let mut output = Vec::new();
        push_line(&mut output, header, terminator);
        for row in chunk {
            push_line(&mut output, row, terminator);
        }

        let path = request.part_path(i + 1);
        fs::write(&path, output).map_err(|source| ToolError::Write { path, source })?;
    }

    reporter.status(parts as u64, "Split complete!");
    Ok(parts)
}
