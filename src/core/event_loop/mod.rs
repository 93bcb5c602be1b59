//! # Event Loop
//!
//! A single-threaded timer queue standing in for a UI toolkit main loop.
//!
//! Callbacks scheduled here always run on the thread that drives the loop,
//! which makes it the only place UI state may be touched. The handle is
//! `Rc`-based and therefore `!Send`: it cannot leak into a worker thread.

use std::cell::RefCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// Something that can run a callback later on the UI thread.
pub trait Scheduler {
    /// Run `callback` once, no earlier than `delay` from now.
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>);
}

struct Scheduled {
    due: Instant,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Default)]
struct LoopState {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
    torn_down: bool,
}

/// Handle to a UI event loop. Clones share the same queue.
#[derive(Clone, Default)]
pub struct EventLoop {
    state: Rc<RefCell<LoopState>>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.borrow().torn_down
    }

    /// Run callbacks in due order, sleeping until each is due, until
    /// nothing is left to run.
    ///
    /// Returns how many callbacks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while let Some(due) = self.next_due() {
            let now = Instant::now();
            if due > now {
                thread::sleep(due - now);
            }
            if self.run_next() {
                ran += 1;
            }
        }
        ran
    }

    /// Run only the callbacks that are already due, without sleeping.
    ///
    /// Callbacks scheduled while this runs are left for a later call, so
    /// one call is one tick of the loop.
    pub fn run_pending(&self) -> usize {
        let now = Instant::now();
        let horizon = self.state.borrow().next_seq;
        let mut ran = 0;
        loop {
            let ready = {
                let state = self.state.borrow();
                state
                    .queue
                    .peek()
                    .is_some_and(|Reverse(s)| s.due <= now && s.seq < horizon)
            };
            if !ready || !self.run_next() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// Drop every pending callback and refuse new ones.
    ///
    /// Mirrors destroying the UI: anything that was polling simply stops.
    pub fn teardown(&self) {
        let dropped = {
            let mut state = self.state.borrow_mut();
            state.torn_down = true;
            std::mem::take(&mut state.queue)
        };
        tracing::debug!(callbacks = dropped.len(), "Event loop torn down");
        drop(dropped);
    }

    fn next_due(&self) -> Option<Instant> {
        self.state.borrow().queue.peek().map(|Reverse(s)| s.due)
    }

    fn run_next(&self) -> bool {
        // The borrow must end before the callback runs: callbacks reschedule.
        let next = self.state.borrow_mut().queue.pop();
        match next {
            Some(Reverse(scheduled)) => {
                (scheduled.callback)();
                true
            }
            None => false,
        }
    }
}

impl Scheduler for EventLoop {
    fn schedule(&self, delay: Duration, callback: Box<dyn FnOnce()>) {
        let mut state = self.state.borrow_mut();
        if state.torn_down {
            return;
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.push(Reverse(Scheduled {
            due: Instant::now() + delay,
            seq,
            callback,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn callbacks_run_in_due_order() {
        let event_loop = EventLoop::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(20, "late"), (0, "first"), (0, "second"), (5, "middle")] {
            let order = Rc::clone(&order);
            event_loop.schedule(
                Duration::from_millis(delay),
                Box::new(move || order.borrow_mut().push(tag)),
            );
        }

        assert_eq!(event_loop.run_until_idle(), 4);
        assert_eq!(*order.borrow(), vec!["first", "second", "middle", "late"]);
    }

    #[test]
    fn callbacks_can_reschedule_themselves() {
        fn tick(event_loop: EventLoop, count: Rc<Cell<u32>>) {
            count.set(count.get() + 1);
            if count.get() < 3 {
                let next = event_loop.clone();
                event_loop.schedule(Duration::from_millis(1), Box::new(move || tick(next, count)));
            }
        }

        let event_loop = EventLoop::new();
        let count = Rc::new(Cell::new(0));
        let (l, c) = (event_loop.clone(), Rc::clone(&count));
        event_loop.schedule(Duration::ZERO, Box::new(move || tick(l, c)));

        event_loop.run_until_idle();
        assert_eq!(count.get(), 3);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn run_pending_skips_future_callbacks() {
        let event_loop = EventLoop::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        event_loop.schedule(Duration::ZERO, Box::new(move || h.set(h.get() + 1)));
        let h = Rc::clone(&hits);
        event_loop.schedule(Duration::from_secs(60), Box::new(move || h.set(h.get() + 10)));

        assert_eq!(event_loop.run_pending(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(event_loop.pending(), 1);
    }

    #[test]
    fn teardown_drops_pending_and_ignores_new_callbacks() {
        let event_loop = EventLoop::new();
        let hits = Rc::new(Cell::new(0));

        let h = Rc::clone(&hits);
        event_loop.schedule(Duration::ZERO, Box::new(move || h.set(1)));
        event_loop.teardown();

        let h = Rc::clone(&hits);
        event_loop.schedule(Duration::ZERO, Box::new(move || h.set(2)));

        assert!(event_loop.is_torn_down());
        assert_eq!(event_loop.run_until_idle(), 0);
        assert_eq!(hits.get(), 0);
    }
}
