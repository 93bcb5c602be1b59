//! File checksums computed in a single streaming pass.

use super::{ProgressThrottle, PROGRESS_INTERVAL};
use crate::error::{InputError, ToolError};
use crate::events::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use md5::Md5;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Read buffer size.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// A validated checksum request.
#[derive(Debug, Clone)]
pub struct ChecksumRequest {
    file: PathBuf,
}

impl ChecksumRequest {
    pub fn new(file: impl Into<PathBuf>) -> Result<Self, InputError> {
        let file = file.into();
        if !file.is_file() {
            return Err(InputError::NotAFile { path: file });
        }
        Ok(Self { file })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Digests of one file, as lower-case hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumReport {
    pub md5: String,
    pub sha256: String,
    pub bytes: u64,
}

/// Hash the file in `CHUNK_SIZE` pieces, reporting bytes read.
pub fn checksum(reporter: &ProgressReporter, request: &ChecksumRequest) -> Result<ChecksumReport, ToolError> {
    let path = request.file();
    let read_error = |source: std::io::Error| ToolError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_error)?;
    let total = file.metadata().map_err(read_error)?.len();
    reporter.start(total, "Calculating...");

    let mut md5 = Md5::new();
    let mut sha256 = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut read = 0u64;
    let mut throttle = ProgressThrottle::new(PROGRESS_INTERVAL);

    loop {
        let n = file.read(&mut buffer).map_err(read_error)?;
        if n == 0 {
            break;
        }
        md5.update(&buffer[..n]);
        sha256.update(&buffer[..n]);
        read += n as u64;
        if throttle.ready() {
            reporter.progress(read);
        }
    }

    reporter.status(read, "Calculation complete!");
    tracing::debug!(file = %path.display(), bytes = read, "Checksum computed");

    Ok(ChecksumReport {
        md5: format!("{:x}", md5.finalize()),
        sha256: format!("{:x}", sha256.finalize()),
        bytes: read,
    })
}
