//! Per-task session state owned by the UI thread.

use super::sink::{ProgressSink, StatusSink};
use crate::error::TaskFailure;
use crate::events::{EventReceiver, ProgressUpdate};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;
use uuid::Uuid;

/// Identifies one `run` call.
pub type SessionId = Uuid;

/// What the completion callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<T> {
    /// The work function returned this value
    Success(T),
    /// The work function failed; the user has already been notified
    Failure(TaskFailure),
}

impl<T> Completion<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Success(_))
    }

    /// The result value, `None` on failure.
    pub fn result(&self) -> Option<&T> {
        match self {
            Completion::Success(value) => Some(value),
            Completion::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        match self {
            Completion::Success(_) => None,
            Completion::Failure(failure) => Some(failure),
        }
    }

    pub fn into_result(self) -> Result<T, TaskFailure> {
        match self {
            Completion::Success(value) => Ok(value),
            Completion::Failure(failure) => Err(failure),
        }
    }
}

/// Optional UI sinks bound to a session.
#[derive(Default)]
pub struct Sinks {
    pub(crate) progress: Option<Box<dyn ProgressSink>>,
    pub(crate) status: Option<Box<dyn StatusSink>>,
}

impl Sinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    pub fn status(mut self, sink: impl StatusSink + 'static) -> Self {
        self.status = Some(Box::new(sink));
        self
    }
}

/// Decrements the runner's live-session count when the session goes away,
/// whether it finished or was dropped by a torn-down loop.
pub(crate) struct ActiveGuard(Rc<Cell<usize>>);

impl ActiveGuard {
    pub(crate) fn enter(counter: &Rc<Cell<usize>>) -> Self {
        counter.set(counter.get() + 1);
        Self(Rc::clone(counter))
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Live state of one in-flight task.
pub(crate) struct RunnerSession<T> {
    pub(crate) id: SessionId,
    pub(crate) receiver: EventReceiver<T>,
    on_complete: Box<dyn FnOnce(Completion<T>)>,
    sinks: Sinks,
    started: Instant,
    progress_events: usize,
    _active: ActiveGuard,
}

impl<T> RunnerSession<T> {
    pub(crate) fn new(
        id: SessionId,
        receiver: EventReceiver<T>,
        on_complete: Box<dyn FnOnce(Completion<T>)>,
        sinks: Sinks,
        active: ActiveGuard,
    ) -> Self {
        Self {
            id,
            receiver,
            on_complete,
            sinks,
            started: Instant::now(),
            progress_events: 0,
            _active: active,
        }
    }

    /// Push one progress update into the bound sinks.
    pub(crate) fn apply(&mut self, update: &ProgressUpdate) {
        self.progress_events += 1;
        if let Some(progress) = self.sinks.progress.as_mut() {
            if let Some(maximum) = update.maximum {
                progress.set_maximum(maximum);
            }
            progress.set_value(update.current);
        }
        if let (Some(status), Some(message)) =
            (self.sinks.status.as_mut(), update.message.as_deref())
        {
            status.set_text(message);
        }
    }

    /// Consume the session and hand the outcome to the callback.
    pub(crate) fn complete(self, completion: Completion<T>) {
        tracing::debug!(
            session = %self.id,
            success = completion.is_success(),
            progress_events = self.progress_events,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Task session finished"
        );
        let RunnerSession {
            on_complete,
            _active,
            ..
        } = self;
        // Count the session as finished before the callback looks at the runner.
        drop(_active);
        on_complete(completion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runner::sink::{ProgressState, StatusLine};
    use crate::error::FailureKind;
    use crate::events::EventChannel;
    use std::cell::RefCell;

    #[test]
    fn completion_accessors() {
        let ok: Completion<&str> = Completion::Success("ok");
        assert!(ok.is_success());
        assert_eq!(ok.result(), Some(&"ok"));
        assert!(ok.failure().is_none());

        let failed: Completion<&str> =
            Completion::Failure(TaskFailure::new(FailureKind::Io, "disk full"));
        assert!(!failed.is_success());
        assert_eq!(failed.result(), None);
        assert_eq!(failed.into_result().unwrap_err().message, "disk full");
    }

    #[test]
    fn apply_keeps_previous_maximum_when_absent() {
        let progress = ProgressState::shared();
        let status = StatusLine::shared();
        let counter = Rc::new(Cell::new(0));
        let (_sender, receiver) = EventChannel::new::<()>();

        let mut session = RunnerSession::new(
            Uuid::new_v4(),
            receiver,
            Box::new(|_| {}),
            Sinks::new()
                .progress(Rc::clone(&progress))
                .status(Rc::clone(&status)),
            ActiveGuard::enter(&counter),
        );
        assert_eq!(counter.get(), 1);

        session.apply(&ProgressUpdate::new(0).with_maximum(40).with_message("Analyzing..."));
        session.apply(&ProgressUpdate::new(12));

        assert_eq!(progress.borrow().display(), "12/40");
        assert_eq!(status.borrow().text, "Analyzing...");

        let received = Rc::new(RefCell::new(None));
        let r = Rc::clone(&received);
        session.on_complete = Box::new(move |c| *r.borrow_mut() = Some(c.is_success()));
        session.complete(Completion::Success(()));

        assert_eq!(*received.borrow(), Some(true));
        assert_eq!(counter.get(), 0);
    }
}
