//! Task runner implementation.

use super::session::{ActiveGuard, Completion, RunnerSession, SessionId, Sinks};
use super::sink::{LogNotifier, Notifier};
use crate::core::event_loop::Scheduler;
use crate::error::{FailureKind, TaskFailure};
use crate::events::{EventChannel, ProgressReporter, Received, TaskEvent};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

/// Default gap between two polls of a session's channel.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How often the UI thread checks each session's channel
    pub poll_interval: Duration,
    /// Title of the notification shown when a task fails
    pub error_title: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            error_title: "Task error".to_string(),
        }
    }
}

/// Builder for the task runner
pub struct TaskRunnerBuilder {
    scheduler: Rc<dyn Scheduler>,
    notifier: Option<Rc<dyn Notifier>>,
    config: RunnerConfig,
}

impl TaskRunnerBuilder {
    /// Set the polling interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the notifier used to surface task failures
    pub fn notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Some(Rc::new(notifier));
        self
    }

    /// Share an existing notifier
    pub fn shared_notifier(mut self, notifier: Rc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the title of error notifications
    pub fn error_title(mut self, title: impl Into<String>) -> Self {
        self.config.error_title = title.into();
        self
    }

    /// Build the runner
    pub fn build(self) -> TaskRunner {
        TaskRunner {
            context: Rc::new(PollContext {
                scheduler: self.scheduler,
                notifier: self.notifier.unwrap_or_else(|| Rc::new(LogNotifier)),
                config: self.config,
            }),
            active: Rc::new(Cell::new(0)),
        }
    }
}

struct PollContext {
    scheduler: Rc<dyn Scheduler>,
    notifier: Rc<dyn Notifier>,
    config: RunnerConfig,
}

/// Runs work functions on worker threads and reports back on the UI thread.
///
/// The runner lives on the UI thread. Each [`run`](TaskRunner::run) spawns
/// exactly one worker and registers a repeating poll on the scheduler that
/// drains at most one event per tick until the task's terminal event has
/// been dispatched.
pub struct TaskRunner {
    context: Rc<PollContext>,
    active: Rc<Cell<usize>>,
}

impl TaskRunner {
    /// Create a runner with default settings
    pub fn new(scheduler: impl Scheduler + 'static) -> Self {
        Self::builder(scheduler).build()
    }

    /// Create a new runner builder
    pub fn builder(scheduler: impl Scheduler + 'static) -> TaskRunnerBuilder {
        TaskRunnerBuilder {
            scheduler: Rc::new(scheduler),
            notifier: None,
            config: RunnerConfig::default(),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.context.config
    }

    /// Number of sessions that have not dispatched their outcome yet
    pub fn active_sessions(&self) -> usize {
        self.active.get()
    }

    pub fn is_idle(&self) -> bool {
        self.active.get() == 0
    }

    /// Run `work` without progress sinks.
    pub fn run<T, E, W, C>(&self, work: W, on_complete: C) -> SessionId
    where
        T: Send + 'static,
        E: Into<TaskFailure> + 'static,
        W: FnOnce(&ProgressReporter) -> Result<T, E> + Send + 'static,
        C: FnOnce(Completion<T>) + 'static,
    {
        self.run_with(work, on_complete, Sinks::new())
    }

    /// Run `work` on a worker thread, relaying its progress into `sinks`.
    ///
    /// `on_complete` is called exactly once on the UI thread, unless the
    /// event loop is torn down first.
    pub fn run_with<T, E, W, C>(&self, work: W, on_complete: C, sinks: Sinks) -> SessionId
    where
        T: Send + 'static,
        E: Into<TaskFailure> + 'static,
        W: FnOnce(&ProgressReporter) -> Result<T, E> + Send + 'static,
        C: FnOnce(Completion<T>) + 'static,
    {
        let id = Uuid::new_v4();
        let (sender, receiver) = EventChannel::new::<T>();

        let spawned = thread::Builder::new()
            .name(format!("toolbox-task-{}", &id.simple().to_string()[..8]))
            .spawn(move || {
                let reporter = ProgressReporter::new(sender.clone());
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&reporter)));
                drop(reporter);

                let event = match outcome {
                    Ok(Ok(value)) => TaskEvent::Done(value),
                    Ok(Err(error)) => TaskEvent::Failed(error.into()),
                    Err(payload) => TaskEvent::Failed(TaskFailure::from_panic(payload.as_ref())),
                };
                sender.send(event);
            });

        // A failed spawn drops the sender, which the first poll reports
        // as a disconnected session.
        if let Err(e) = spawned {
            tracing::warn!(session = %id, error = %e, "Failed to spawn worker thread");
        } else {
            tracing::debug!(session = %id, "Task session started");
        }

        let session = RunnerSession::new(
            id,
            receiver,
            Box::new(on_complete),
            sinks,
            ActiveGuard::enter(&self.active),
        );
        schedule_poll(session, Rc::clone(&self.context));
        id
    }
}

fn schedule_poll<T: 'static>(session: RunnerSession<T>, context: Rc<PollContext>) {
    let scheduler = Rc::clone(&context.scheduler);
    let interval = context.config.poll_interval;
    scheduler.schedule(interval, Box::new(move || poll(session, context)));
}

/// One tick: drain at most one event and act on it.
fn poll<T: 'static>(mut session: RunnerSession<T>, context: Rc<PollContext>) {
    match session.receiver.try_recv() {
        Received::Empty => schedule_poll(session, context),
        Received::Event(TaskEvent::Progress(update)) => {
            tracing::trace!(session = %session.id, current = update.current, "Progress");
            session.apply(&update);
            schedule_poll(session, context);
        }
        Received::Event(TaskEvent::Done(value)) => {
            session.complete(Completion::Success(value));
        }
        Received::Event(TaskEvent::Failed(failure)) => fail(session, &context, failure),
        Received::Closed => {
            let failure = TaskFailure::new(
                FailureKind::Disconnected,
                "The task stopped without reporting a result",
            );
            fail(session, &context, failure);
        }
    }
}

fn fail<T>(session: RunnerSession<T>, context: &PollContext, failure: TaskFailure) {
    tracing::warn!(
        session = %session.id,
        kind = ?failure.kind,
        message = %failure.message,
        "Task failed"
    );
    context
        .notifier
        .show_error(&context.config.error_title, &failure.message);
    session.complete(Completion::Failure(failure));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_loop::EventLoop;
    use crate::core::runner::sink::ProgressState;
    use std::cell::RefCell;
    use std::sync::mpsc;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: RefCell<Vec<(String, String)>>,
    }

    impl Notifier for Rc<RecordingNotifier> {
        fn show_error(&self, title: &str, message: &str) {
            self.messages
                .borrow_mut()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn fast_runner(event_loop: &EventLoop, notifier: &Rc<RecordingNotifier>) -> TaskRunner {
        TaskRunner::builder(event_loop.clone())
            .poll_interval(Duration::from_millis(1))
            .notifier(Rc::clone(notifier))
            .build()
    }

    #[test]
    fn builder_defaults() {
        let runner = TaskRunner::new(EventLoop::new());
        assert_eq!(runner.config().poll_interval, Duration::from_millis(100));
        assert_eq!(runner.config().error_title, "Task error");
        assert!(runner.is_idle());
    }

    #[test]
    fn drains_one_event_per_tick() {
        let event_loop = EventLoop::new();
        let notifier = Rc::new(RecordingNotifier::default());
        let runner = TaskRunner::builder(event_loop.clone())
            .poll_interval(Duration::ZERO)
            .notifier(Rc::clone(&notifier))
            .build();
        let progress = ProgressState::shared();

        // Hold the worker until the burst is queued so every poll sees it.
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (queued_tx, queued_rx) = mpsc::channel::<()>();
        runner.run_with(
            move |reporter| {
                for i in 1..=5 {
                    reporter.progress(i);
                }
                queued_tx.send(()).ok();
                release_rx.recv().ok();
                Ok::<_, TaskFailure>(())
            },
            |_| {},
            Sinks::new().progress(Rc::clone(&progress)),
        );
        queued_rx.recv().unwrap();

        event_loop.run_pending();
        assert_eq!(progress.borrow().value, 1);
        event_loop.run_pending();
        assert_eq!(progress.borrow().value, 2);

        release_tx.send(()).unwrap();
        event_loop.run_until_idle();
        assert_eq!(progress.borrow().value, 5);
        assert!(runner.is_idle());
    }

    #[test]
    fn panic_in_work_becomes_failure() {
        let event_loop = EventLoop::new();
        let notifier = Rc::new(RecordingNotifier::default());
        let runner = fast_runner(&event_loop, &notifier);
        let received = Rc::new(RefCell::new(Vec::new()));

        let r = Rc::clone(&received);
        runner.run(
            |_reporter| -> Result<u32, TaskFailure> { panic!("index out of range") },
            move |completion| r.borrow_mut().push(completion),
        );
        event_loop.run_until_idle();

        let received = received.borrow();
        assert_eq!(received.len(), 1);
        let failure = received[0].failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Panicked);
        assert!(failure.message.contains("index out of range"));
        assert_eq!(notifier.messages.borrow().len(), 1);
    }

    #[test]
    fn teardown_stops_polling_silently() {
        let event_loop = EventLoop::new();
        let notifier = Rc::new(RecordingNotifier::default());
        let runner = fast_runner(&event_loop, &notifier);
        let called = Rc::new(Cell::new(false));

        let c = Rc::clone(&called);
        runner.run(
            |_| Ok::<_, TaskFailure>("late"),
            move |_| c.set(true),
        );
        assert_eq!(runner.active_sessions(), 1);

        event_loop.teardown();
        event_loop.run_until_idle();

        assert!(!called.get());
        assert!(runner.is_idle());
        assert!(notifier.messages.borrow().is_empty());
    }

    #[test]
    fn closed_channel_without_outcome_is_disconnected() {
        let event_loop = EventLoop::new();
        let notifier = Rc::new(RecordingNotifier::default());
        let context = Rc::new(PollContext {
            scheduler: Rc::new(event_loop.clone()),
            notifier: Rc::new(Rc::clone(&notifier)),
            config: RunnerConfig::default(),
        });
        let active = Rc::new(Cell::new(0));
        let received = Rc::new(RefCell::new(Vec::new()));

        let (sender, receiver) = EventChannel::new::<u32>();
        drop(sender);
        let r = Rc::clone(&received);
        let session = RunnerSession::new(
            Uuid::new_v4(),
            receiver,
            Box::new(move |completion: Completion<u32>| r.borrow_mut().push(completion)),
            Sinks::new(),
            ActiveGuard::enter(&active),
        );

        poll(session, context);

        let received = received.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].failure().unwrap().kind, FailureKind::Disconnected);
        assert_eq!(notifier.messages.borrow().len(), 1);
        assert_eq!(active.get(), 0);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn error_title_is_used_for_notifications() {
        let event_loop = EventLoop::new();
        let notifier = Rc::new(RecordingNotifier::default());
        let runner = TaskRunner::builder(event_loop.clone())
            .poll_interval(Duration::from_millis(1))
            .notifier(Rc::clone(&notifier))
            .error_title("Organizer")
            .build();

        runner.run(|_| Err::<(), _>("no such folder"), |_| {});
        event_loop.run_until_idle();

        let messages = notifier.messages.borrow();
        assert_eq!(messages[0], ("Organizer".to_string(), "no such folder".to_string()));
    }
}
