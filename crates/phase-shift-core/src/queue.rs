//! Main-thread run loop.
//!
//! Every deferred continuation in the crate (the "presentation started"
//! step, retry backoffs, animation frames) is a task on a `MainQueue`. The
//! queue runs on a virtual clock: nothing happens until the embedder drives
//! it with [`MainQueue::advance`] or [`MainQueue::run_until_idle`], which
//! keeps every ordering deterministic.
//!
//! Tasks due at the same instant run in the order they were scheduled. No
//! borrow of the queue is held while a task runs, so tasks may schedule more
//! tasks.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::warn;

/// Upper bound on tasks executed by a single `run_until_idle` call. A task
/// that keeps rescheduling itself (a retry against a host that never frees
/// up) would otherwise never let it return.
pub const MAX_IDLE_STEPS: usize = 10_000;

type Task = Box<dyn FnOnce()>;

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Task,
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
    // Reversed so the max-heap pops the earliest deadline first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct QueueState {
    now: Duration,
    next_seq: u64,
    tasks: BinaryHeap<Scheduled>,
}

/// Cloneable handle to the single-threaded task queue.
#[derive(Clone, Default)]
pub struct MainQueue {
    state: Rc<RefCell<QueueState>>,
}

impl fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MainQueue")
            .field("now", &state.now)
            .field("pending", &state.tasks.len())
            .finish()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Schedule a task for the next turn of the loop.
    pub fn dispatch(&self, task: impl FnOnce() + 'static) {
        self.dispatch_after(Duration::ZERO, task);
    }

    /// Schedule a task to run once `delay` has elapsed.
    pub fn dispatch_after(&self, delay: Duration, task: impl FnOnce() + 'static) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.tasks.push(Scheduled {
            due,
            seq,
            task: Box::new(task),
        });
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().tasks.len()
    }

    pub fn is_idle(&self) -> bool {
        self.state.borrow().tasks.is_empty()
    }

    /// Deadline of the next task, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state.borrow().tasks.peek().map(|scheduled| scheduled.due)
    }

    /// Run every task already due at the current time, including tasks they
    /// dispatch for the same instant. Returns the number of tasks run.
    pub fn turn(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Move the clock forward by `by`, running every task that falls due on
    /// the way in deadline order. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let deadline = self.now() + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(Some(deadline)) {
            task();
            ran += 1;
        }
        let mut state = self.state.borrow_mut();
        state.now = state.now.max(deadline);
        ran
    }

    /// Run tasks, jumping the clock from deadline to deadline, until the
    /// queue is empty or [`MAX_IDLE_STEPS`] tasks have run.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while ran < MAX_IDLE_STEPS {
            let Some(task) = self.pop_due(None) else {
                break;
            };
            task();
            ran += 1;
        }
        if ran == MAX_IDLE_STEPS && !self.is_idle() {
            warn!(pending = self.pending(), "run_until_idle hit its step bound");
        }
        ran
    }

    fn pop_due(&self, deadline: Option<Duration>) -> Option<Task> {
        let mut state = self.state.borrow_mut();
        let due = state.tasks.peek()?.due;
        if deadline.is_some_and(|deadline| due > deadline) {
            return None;
        }
        let scheduled = state.tasks.pop()?;
        state.now = state.now.max(scheduled.due);
        Some(scheduled.task)
    }
}
