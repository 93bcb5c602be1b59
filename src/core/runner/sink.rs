//! UI-side targets the runner pushes progress into.
//!
//! All of these live on the UI thread. None of them is required to be
//! `Send`, and the runner never hands them to a worker.

use console::{style, Term};
use indicatif::ProgressBar;
use std::cell::RefCell;
use std::rc::Rc;

/// A progress indicator with a movable upper bound.
pub trait ProgressSink {
    fn set_maximum(&mut self, maximum: u64);
    fn set_value(&mut self, current: u64);
}

/// A status line showing a short message.
pub trait StatusSink {
    fn set_text(&mut self, text: &str);
}

/// Shows a dismissible, non-fatal error to the user.
pub trait Notifier {
    fn show_error(&self, title: &str, message: &str);
}

impl<S: ProgressSink + ?Sized> ProgressSink for Rc<RefCell<S>> {
    fn set_maximum(&mut self, maximum: u64) {
        self.borrow_mut().set_maximum(maximum);
    }

    fn set_value(&mut self, current: u64) {
        self.borrow_mut().set_value(current);
    }
}

impl<S: StatusSink + ?Sized> StatusSink for Rc<RefCell<S>> {
    fn set_text(&mut self, text: &str) {
        self.borrow_mut().set_text(text);
    }
}

impl ProgressSink for ProgressBar {
    fn set_maximum(&mut self, maximum: u64) {
        self.set_length(maximum);
    }

    fn set_value(&mut self, current: u64) {
        self.set_position(current);
    }
}

impl StatusSink for ProgressBar {
    fn set_text(&mut self, text: &str) {
        self.set_message(text.to_string());
    }
}

/// Plain model of a determinate progress bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub value: u64,
    pub maximum: u64,
    /// Every `(value, maximum)` pair the bar has displayed, oldest first
    pub history: Vec<(u64, u64)>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle suitable for binding to a runner session.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// `value/maximum`, e.g. `100/100`.
    pub fn display(&self) -> String {
        format!("{}/{}", self.value, self.maximum)
    }
}

impl ProgressSink for ProgressState {
    fn set_maximum(&mut self, maximum: u64) {
        self.maximum = maximum;
    }

    fn set_value(&mut self, current: u64) {
        self.value = current;
        self.history.push((self.value, self.maximum));
    }
}

/// Plain model of a status label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
}

impl StatusLine {
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::default()))
    }
}

impl StatusSink for StatusLine {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }
}

/// Prints errors to stderr, styled like the rest of the CLI.
pub struct ConsoleNotifier {
    term: Term,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn show_error(&self, title: &str, message: &str) {
        self.term
            .write_line(&format!(
                "{} {}: {}",
                style("✗").red().bold(),
                style(title).red().bold(),
                message
            ))
            .ok();
    }
}

/// Reports errors through `tracing` only; used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_error(&self, title: &str, message: &str) {
        tracing::error!(title, message, "Task error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_state_records_history() {
        let shared = ProgressState::shared();
        let mut handle = Rc::clone(&shared);

        handle.set_maximum(100);
        handle.set_value(0);
        handle.set_value(50);

        let state = shared.borrow();
        assert_eq!(state.display(), "50/100");
        assert_eq!(state.history, vec![(0, 100), (50, 100)]);
    }

    #[test]
    fn status_line_through_shared_handle() {
        let shared = StatusLine::shared();
        let mut handle = Rc::clone(&shared);
        handle.set_text("Reading source file...");
        assert_eq!(shared.borrow().text, "Reading source file...");
    }

    #[test]
    fn progress_bar_is_a_sink() {
        let mut bar = ProgressBar::hidden();
        ProgressSink::set_maximum(&mut bar, 10);
        ProgressSink::set_value(&mut bar, 4);
        StatusSink::set_text(&mut bar, "working");
        assert_eq!(bar.length(), Some(10));
        assert_eq!(bar.position(), 4);
        assert_eq!(bar.message(), "working");
    }
}
