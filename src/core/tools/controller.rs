//! Per-tool UI state.
//!
//! A tool tab disables its controls while its task runs and re-enables
//! them when the outcome arrives. That state lives here as named fields;
//! the completion callback reaches it through a shared handle on the UI
//! thread.

use crate::core::runner::{Completion, SessionId, Sinks, TaskRunner};
use crate::error::{InputError, TaskFailure};
use crate::events::ProgressReporter;
use std::cell::RefCell;
use std::rc::Rc;

/// Whether a tool's controls accept input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    /// A task is in flight; controls are disabled
    Running,
}

/// Mutable state of one tool tab.
#[derive(Debug, Clone)]
pub struct ToolController {
    name: &'static str,
    state: ControlState,
    runs: usize,
    last_summary: Option<String>,
    last_failure: Option<TaskFailure>,
}

impl ToolController {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: ControlState::Idle,
            runs: 0,
            last_summary: None,
            last_failure: None,
        }
    }

    pub fn shared(name: &'static str) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(name)))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn controls_enabled(&self) -> bool {
        self.state == ControlState::Idle
    }

    /// Completed runs, successful or not
    pub fn runs(&self) -> usize {
        self.runs
    }

    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    pub fn last_failure(&self) -> Option<&TaskFailure> {
        self.last_failure.as_ref()
    }

    /// Disable controls for a new run.
    pub fn begin(&mut self) -> Result<(), InputError> {
        if self.state == ControlState::Running {
            return Err(InputError::Busy { tool: self.name });
        }
        self.state = ControlState::Running;
        self.last_failure = None;
        Ok(())
    }

    /// Re-enable controls and record the outcome.
    pub fn finish<T>(&mut self, completion: &Completion<T>, summarize: impl FnOnce(&T) -> String) {
        self.state = ControlState::Idle;
        self.runs += 1;
        match completion {
            Completion::Success(value) => {
                let summary = summarize(value);
                tracing::info!(tool = self.name, %summary, "Tool finished");
                self.last_summary = Some(summary);
            }
            Completion::Failure(failure) => {
                self.last_failure = Some(failure.clone());
            }
        }
    }

    /// Start `work` for the tool behind `this`, wiring the completion back
    /// into the controller.
    ///
    /// The controller is updated first; `on_complete` then receives the
    /// outcome itself. Refuses with [`InputError::Busy`] while a previous
    /// run is in flight.
    pub fn launch<T, W, S, C>(
        this: &Rc<RefCell<Self>>,
        runner: &TaskRunner,
        work: W,
        sinks: Sinks,
        summarize: S,
        on_complete: C,
    ) -> Result<SessionId, InputError>
    where
        T: Send + 'static,
        W: FnOnce(&ProgressReporter) -> Result<T, TaskFailure> + Send + 'static,
        S: FnOnce(&T) -> String + 'static,
        C: FnOnce(Completion<T>) + 'static,
    {
        this.borrow_mut().begin()?;
        let controller = Rc::clone(this);
        Ok(runner.run_with(
            work,
            move |completion| {
                controller.borrow_mut().finish(&completion, summarize);
                on_complete(completion);
            },
            sinks,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event_loop::EventLoop;
    use crate::error::FailureKind;
    use std::time::Duration;

    fn runner(event_loop: &EventLoop) -> TaskRunner {
        TaskRunner::builder(event_loop.clone())
            .poll_interval(Duration::from_millis(1))
            .build()
    }

    #[test]
    fn begin_refuses_while_running() {
        let mut controller = ToolController::new("Organizer");
        controller.begin().unwrap();
        assert!(!controller.controls_enabled());
        assert_eq!(
            controller.begin().unwrap_err(),
            InputError::Busy { tool: "Organizer" }
        );
    }

    #[test]
    fn launch_reenables_controls_on_success() {
        let event_loop = EventLoop::new();
        let runner = runner(&event_loop);
        let controller = ToolController::shared("Renamer");

        ToolController::launch(
            &controller,
            &runner,
            |reporter| {
                reporter.progress(1);
                Ok(4usize)
            },
            Sinks::new(),
            |copied| format!("{} files copied and renamed", copied),
            |_| {},
        )
        .unwrap();

        assert_eq!(controller.borrow().state(), ControlState::Running);
        assert!(ToolController::launch(
            &controller,
            &runner,
            |_| Ok(0usize),
            Sinks::new(),
            |_| String::new(),
            |_| {},
        )
        .is_err());

        event_loop.run_until_idle();

        let controller = controller.borrow();
        assert!(controller.controls_enabled());
        assert_eq!(controller.runs(), 1);
        assert_eq!(controller.last_summary(), Some("4 files copied and renamed"));
    }

    #[test]
    fn launch_records_failure() {
        let event_loop = EventLoop::new();
        let runner = runner(&event_loop);
        let controller = ToolController::shared("Splitter");
        let seen = Rc::new(RefCell::new(None));

        let s = Rc::clone(&seen);
        let c = Rc::clone(&controller);
        ToolController::launch(
            &controller,
            &runner,
            |_| Err::<usize, _>(TaskFailure::new(FailureKind::Tool, "no header row")),
            Sinks::new(),
            |parts| parts.to_string(),
            move |completion| {
                // The controller is already idle when the outcome arrives.
                *s.borrow_mut() = Some((completion.is_success(), c.borrow().controls_enabled()));
            },
        )
        .unwrap();
        event_loop.run_until_idle();

        assert_eq!(*seen.borrow(), Some((false, true)));
        let controller = controller.borrow();
        assert!(controller.controls_enabled());
        assert_eq!(controller.last_summary(), None);
        assert_eq!(controller.last_failure().unwrap().message, "no header row");
    }
}
