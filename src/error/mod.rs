//! # Error Module
//!
//! User-friendly error types for the toolbox.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Two failure paths** - input problems are reported before a task
//!   starts, work problems travel through the task channel as a
//!   [`TaskFailure`]

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum ToolboxError {
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Task failed: {0}")]
    Task(TaskFailure),
}

/// Validation failures detected before a task is started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Please select a valid folder: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Please select a valid file: {path}")]
    NotAFile { path: PathBuf },

    #[error("No files were selected")]
    NoFiles,

    #[error("{field} must be a whole number greater than 0 (got {value})")]
    NotPositive { field: &'static str, value: String },

    #[error("The list is empty")]
    EmptyList,

    #[error("{tool} is already running")]
    Busy { tool: &'static str },
}

/// Failures raised inside work functions.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} has no header row")]
    MissingHeader { path: PathBuf },

    #[error("{0}")]
    Input(#[from] InputError),
}

/// Errors loading or saving session preferences.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read preferences at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write preferences at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Broad classification of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input rejected by the work function itself
    Input,
    /// Filesystem or other I/O failure
    Io,
    /// Tool-specific failure that is not plain I/O
    Tool,
    /// The work function panicked
    Panicked,
    /// The worker went away without reporting an outcome
    Disconnected,
    Other,
}

/// The terminal failure of a work item, as delivered to the UI thread.
///
/// Keeps the kind next to the message so callers can tell validation
/// problems apart from I/O trouble; the user only ever sees `message`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build a failure from a panic payload caught at the worker boundary.
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "task panicked".to_string()
        };
        Self::new(FailureKind::Panicked, message)
    }
}

impl From<ToolError> for TaskFailure {
    fn from(error: ToolError) -> Self {
        let kind = match &error {
            ToolError::Read { .. } | ToolError::Write { .. } | ToolError::Move { .. } => {
                FailureKind::Io
            }
            ToolError::MissingHeader { .. } => FailureKind::Tool,
            ToolError::Input(_) => FailureKind::Input,
        };
        Self::new(kind, error.to_string())
    }
}

impl From<InputError> for TaskFailure {
    fn from(error: InputError) -> Self {
        Self::new(FailureKind::Input, error.to_string())
    }
}

impl From<std::io::Error> for TaskFailure {
    fn from(error: std::io::Error) -> Self {
        Self::new(FailureKind::Io, error.to_string())
    }
}

impl From<String> for TaskFailure {
    fn from(message: String) -> Self {
        Self::new(FailureKind::Other, message)
    }
}

impl From<&str> for TaskFailure {
    fn from(message: &str) -> Self {
        Self::new(FailureKind::Other, message)
    }
}

impl From<TaskFailure> for ToolboxError {
    fn from(failure: TaskFailure) -> Self {
        ToolboxError::Task(failure)
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ToolboxError>;
