//! # Core Module
//!
//! The GUI-agnostic toolbox engine.
//!
//! ## Modules
//! - `runner` - Runs work on worker threads and relays progress to the UI
//! - `event_loop` - Single-threaded timer loop the runner polls from
//! - `preferences` - Theme and remembered dialog directories
//! - `tools` - Work functions for each tool, and per-tool controllers

pub mod event_loop;
pub mod preferences;
pub mod runner;
pub mod tools;

// Re-export commonly used types
pub use event_loop::{EventLoop, Scheduler};
pub use preferences::{SessionPreferences, Theme};
pub use runner::{Completion, Sinks, TaskRunner};
pub use tools::ToolController;
