//! # Runner Module
//!
//! Background execution of long-running work with progress relayed to
//! the UI thread.
//!
//! ## Flow
//! 1. **Spawn** - the work function runs on its own worker thread and
//!    reports progress through a [`ProgressReporter`](crate::events::ProgressReporter)
//! 2. **Poll** - the UI event loop checks the session's channel at a fixed
//!    interval, draining at most one event per tick
//! 3. **Relay** - progress updates go to the bound sinks
//! 4. **Complete** - the single terminal event is handed to the completion
//!    callback; failures are shown to the user first
//!
//! Errors and panics inside the work function are caught at the worker
//! boundary and never reach the UI thread as a crash.

mod executor;
mod session;
mod sink;

pub use executor::{RunnerConfig, TaskRunner, TaskRunnerBuilder, DEFAULT_POLL_INTERVAL};
pub use session::{Completion, SessionId, Sinks};
pub use sink::{
    ConsoleNotifier, LogNotifier, Notifier, ProgressSink, ProgressState, StatusLine, StatusSink,
};
