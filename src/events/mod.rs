//! # Events Module
//!
//! The one-way channel between a worker thread and the UI thread.
//!
//! ## Design
//! Each task gets its own channel. The worker pushes [`TaskEvent`]s in
//! order; the UI thread drains them with non-blocking receives from its
//! event loop, so it never waits on the worker.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new::<u64>();
//!
//! std::thread::spawn(move || {
//!     sender.send(TaskEvent::Progress(ProgressUpdate::new(0).with_maximum(3)));
//!     sender.send(TaskEvent::Done(3));
//! });
//!
//! // Later, from a timer callback on the UI thread
//! if let Received::Event(event) = receiver.try_recv() {
//!     // update widgets
//! }
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, ProgressReporter, Received};
pub use types::*;
