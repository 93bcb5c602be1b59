//! # Toolbox
//!
//! Desktop utilities that run their heavy lifting in the background.
//!
//! ## Core Philosophy
//! - **Never freeze the UI** - long work runs on a worker thread
//! - **Always report back** - every task ends in exactly one success or
//!   failure, delivered on the UI thread
//! - **Never crash on a failed task** - errors and panics are caught at the
//!   worker boundary and shown to the user
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - Task runner, event loop, preferences and the tools themselves
//! - `events` - The worker-to-UI progress channel
//! - `error` - User-friendly error types
//! - `cli` - Command-line interface

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{Result, ToolboxError};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Calling it twice leaves the first subscriber in place.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
