//! Task channel implementation using crossbeam-channel.
//!
//! One channel per task: the worker thread owns the sending half, the UI
//! thread drains the receiving half without ever blocking.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

use super::{ProgressUpdate, TaskEvent};

/// Sends events from a worker thread.
///
/// This is a thin wrapper around crossbeam's Sender that can be
/// cloned and sent across threads.
pub struct EventSender<T> {
    inner: Sender<TaskEvent<T>>,
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> EventSender<T> {
    /// Send an event.
    ///
    /// If the receiver is dropped (the UI went away), the event is
    /// silently discarded.
    pub fn send(&self, event: TaskEvent<T>) {
        let _ = self.inner.send(event);
    }
}

/// Outcome of a non-blocking receive.
#[derive(Debug)]
pub enum Received<T> {
    Event(TaskEvent<T>),
    /// Nothing queued right now
    Empty,
    /// Every sender is gone and the queue is drained
    Closed,
}

/// Receives events on the UI thread.
pub struct EventReceiver<T> {
    inner: Receiver<TaskEvent<T>>,
}

impl<T> EventReceiver<T> {
    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Received<T> {
        match self.inner.try_recv() {
            Ok(event) => Received::Event(event),
            Err(TryRecvError::Empty) => Received::Empty,
            Err(TryRecvError::Disconnected) => Received::Closed,
        }
    }
}

/// Factory for task channels.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    ///
    /// Use this for most cases - progress events are small and the
    /// worker must never stall on a slow UI.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T>() -> (EventSender<T>, EventReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// The progress-only view of a task channel handed to work functions.
///
/// Work functions can report progress but cannot end the session;
/// the terminal event is always produced by the runner.
pub struct ProgressReporter {
    emit: Box<dyn Fn(ProgressUpdate) + Send>,
}

impl ProgressReporter {
    pub(crate) fn new<T: Send + 'static>(sender: EventSender<T>) -> Self {
        Self {
            emit: Box::new(move |update| sender.send(TaskEvent::Progress(update))),
        }
    }

    /// A reporter that discards everything, for running work inline.
    pub fn null() -> Self {
        Self {
            emit: Box::new(|_| {}),
        }
    }

    /// A reporter that forwards every update to `f`.
    ///
    /// Useful for driving work functions synchronously in tests.
    pub fn from_fn(f: impl Fn(ProgressUpdate) + Send + 'static) -> Self {
        Self { emit: Box::new(f) }
    }

    pub fn send(&self, update: ProgressUpdate) {
        (self.emit)(update);
    }

    /// Report the current position.
    pub fn progress(&self, current: u64) {
        self.send(ProgressUpdate::new(current));
    }

    /// Reset the bound and position, with a status message.
    pub fn start(&self, maximum: u64, message: impl Into<String>) {
        self.send(
            ProgressUpdate::new(0)
                .with_maximum(maximum)
                .with_message(message),
        );
    }

    /// Report the current position together with a status message.
    pub fn status(&self, current: u64, message: impl Into<String>) {
        self.send(ProgressUpdate::new(current).with_message(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new::<String>();

        let handle = thread::spawn(move || {
            sender.send(TaskEvent::Progress(ProgressUpdate::new(25).with_maximum(100)));
            sender.send(TaskEvent::Done("ok".to_string()));
        });
        handle.join().unwrap();

        match receiver.try_recv() {
            Received::Event(TaskEvent::Progress(p)) => {
                assert_eq!(p.current, 25);
                assert_eq!(p.maximum, Some(100));
            }
            other => panic!("Wrong event: {:?}", other),
        }
        assert!(matches!(receiver.try_recv(), Received::Event(TaskEvent::Done(ref s)) if s == "ok"));
        assert!(matches!(receiver.try_recv(), Received::Closed));
    }

    #[test]
    fn empty_is_distinct_from_closed() {
        let (sender, receiver) = EventChannel::new::<()>();
        assert!(matches!(receiver.try_recv(), Received::Empty));
        drop(sender);
        assert!(matches!(receiver.try_recv(), Received::Closed));
    }

    #[test]
    fn send_after_receiver_dropped_does_not_panic() {
        let (sender, receiver) = EventChannel::new::<u32>();
        drop(receiver);
        sender.send(TaskEvent::Done(1));
    }

    #[test]
    fn reporter_only_emits_progress() {
        let (sender, receiver) = EventChannel::new::<()>();
        let reporter = ProgressReporter::new(sender);

        reporter.start(10, "Reading...");
        reporter.progress(4);
        reporter.status(10, "Finished");
        drop(reporter);

        let mut seen = Vec::new();
        while let Received::Event(event) = receiver.try_recv() {
            match event {
                TaskEvent::Progress(p) => seen.push(p),
                _ => panic!("reporter produced a terminal event"),
            }
        }
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].maximum, Some(10));
        assert_eq!(seen[1], ProgressUpdate::new(4));
        assert_eq!(seen[2].message.as_deref(), Some("Finished"));
    }

    #[test]
    fn from_fn_reporter_collects_updates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let reporter = ProgressReporter::from_fn(move |u| sink.lock().unwrap().push(u.current));

        reporter.progress(1);
        reporter.progress(2);
        ProgressReporter::null().progress(99);

        assert_eq!(*log.lock().unwrap(), vec![1, 2]);
    }
}
