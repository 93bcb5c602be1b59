//! # Tools Module
//!
//! The work functions behind each toolbox tab, plus the controller that
//! holds a tool's UI state.
//!
//! Every long-running tool is a plain function taking a
//! [`ProgressReporter`](crate::events::ProgressReporter) and a validated
//! request. Requests are validated on the UI thread when they are built,
//! so input problems never reach the task channel.
//!
//! ## Tools
//! - `organize` - Sort a folder's files into category or extension folders
//! - `rename` - Copy files under sequential numeric names
//! - `split_csv` - Split a CSV file into parts with a repeated header
//! - `checksum` - Streaming MD5 and SHA-256 digests of a file
//! - `split_list` - Chunk a pasted list into groups (runs inline)
//! - `dedupe_list` - Separate unique and repeated list items (runs inline)

mod checksum;
mod controller;
mod dedupe_list;
mod organize;
mod rename;
mod split_csv;
mod split_list;

pub use checksum::{checksum, ChecksumReport, ChecksumRequest, CHUNK_SIZE};
pub use controller::{ControlState, ToolController};
pub use dedupe_list::{dedupe_list, DedupeReport, DUPLICATES_FILE_NAME, UNIQUE_FILE_NAME};
pub use organize::{category_for, organize_folder, OrganizeMode, OrganizeRequest, OrganizeSummary};
pub use rename::{copy_renamed, NumberFormat, RenameRequest};
pub use split_csv::{split_csv, SplitCsvRequest};
pub use split_list::{render_groups, split_list};

use std::time::{Duration, Instant};

/// Minimum gap between two progress reports from a tool loop.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Limits how often a tight loop reports progress.
///
/// The UI drains one event per tick, so a report per file, part or chunk
/// would leave it lagging far behind the worker.
pub(crate) struct ProgressThrottle {
    last: Option<Instant>,
    interval: Duration,
}

impl ProgressThrottle {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            last: None,
            interval,
        }
    }

    /// True at most once per interval; the first call is always true.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_allows_first_and_blocks_burst() {
        let mut throttle = ProgressThrottle::new(Duration::from_secs(60));
        assert!(throttle.ready());
        assert!(!throttle.ready());
        assert!(!throttle.ready());
    }

    #[test]
    fn zero_interval_never_blocks() {
        let mut throttle = ProgressThrottle::new(Duration::ZERO);
        assert!(throttle.ready());
        assert!(throttle.ready());
    }
}
