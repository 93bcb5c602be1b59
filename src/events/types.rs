//! Event type definitions for progress reporting.

use crate::error::TaskFailure;
use serde::{Deserialize, Serialize};

/// Everything a worker can send back to the UI thread for one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskEvent<T> {
    /// Partial progress; any number may be sent
    Progress(ProgressUpdate),
    /// Terminal success carrying the work function's result
    Done(T),
    /// Terminal failure
    Failed(TaskFailure),
}

impl<T> TaskEvent<T> {
    /// `Done` and `Failed` end a session.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskEvent::Progress(_))
    }
}

/// A partial progress update.
///
/// `maximum` resets the bound of the progress indicator when present;
/// `message` replaces the status text when present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub current: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressUpdate {
    pub fn new(current: u64) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }

    pub fn with_maximum(mut self, maximum: u64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
