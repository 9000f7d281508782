//! Deferred Execution
//!
//! Layouts run on a single UI thread driven by the host's event loop. The
//! only suspension they use is "run this on a later turn of the loop", either
//! as soon as possible (`defer`) or after a delay (`schedule`).
//!
//! - `EventLoop`: a manually pumped loop. Hosts call `run_pending()` once per
//!   turn and `advance()` as time passes. Time is virtual, which also makes it
//!   the scheduler of choice for deterministic tests.
//! - `TokioScheduler`: spawns onto the current `tokio::task::LocalSet`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// A unit of deferred work. Tasks are `!Send`; they run on the UI thread.
pub type Task = Box<dyn FnOnce()>;

/// Host hook for running work on a later turn of the event loop.
pub trait Scheduler {
    /// Run `task` on a later turn, ahead of any timers.
    fn defer(&self, task: Task);

    /// Run `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task);
}

// =========================================================================
// EventLoop
// =========================================================================

struct Timer {
    due: Duration,
    seq: u64,
    task: Task,
}

/// A manually pumped event loop with virtual time.
#[derive(Default)]
pub struct EventLoop {
    deferred: RefCell<VecDeque<Task>>,
    timers: RefCell<Vec<Timer>>,
    now: Cell<Duration>,
    seq: Cell<u64>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run deferred tasks until the queue is empty, including tasks deferred
    /// by the tasks being run. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.deferred.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Move virtual time forward, firing due timers in deadline order and
    /// draining deferred work after each one. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now.get() + by;
        let mut ran = self.run_pending();
        while let Some(timer) = self.take_due(target) {
            self.now.set(timer.due);
            (timer.task)();
            ran += 1 + self.run_pending();
        }
        self.now.set(target);
        ran
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of deferred tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.deferred.borrow().len()
    }

    /// Number of timers not yet fired.
    pub fn timers(&self) -> usize {
        self.timers.borrow().len()
    }

    fn take_due(&self, target: Duration) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.swap_remove(index))
    }
}

impl Scheduler for EventLoop {
    fn defer(&self, task: Task) {
        self.deferred.borrow_mut().push_back(task);
    }

    fn schedule(&self, delay: Duration, task: Task) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .field("timers", &self.timers())
            .finish()
    }
}

// =========================================================================
// TokioScheduler
// =========================================================================

/// Scheduler backed by `tokio::task::spawn_local`.
///
/// Must be used from within a `LocalSet` (spawning panics otherwise).
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn defer(&self, task: Task) {
        tokio::task::spawn_local(async move {
            task();
        });
    }

    fn schedule(&self, delay: Duration, task: Task) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}
