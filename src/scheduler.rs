//! Single-threaded cooperative timer scheduler.
//!
//! Every callback runs on the thread that drives the scheduler, one at a time.
//! Entries fire in due-time order; entries due at the same instant fire in the
//! order they were (re)scheduled.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{trace, warn};

/// Shortest period a repeating entry runs at. Zero would re-arm an entry at
/// the instant it just fired and never let the clock move.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

type Callback = Box<dyn FnMut() + 'static>;

/// Handle to a scheduled callback, used to cancel it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Copy, Clone, Debug)]
enum Clock {
    Virtual,
    Real { origin: Instant },
}

struct TimerEntry {
    callback: Option<Callback>,
    period: Option<Duration>,
}

struct SchedulerState {
    clock: Clock,
    now: Duration,
    next_token: u64,
    next_seq: u64,
    queue: BinaryHeap<Reverse<(Duration, u64, TimerToken)>>,
    timers: HashMap<TimerToken, TimerEntry>,
}

impl SchedulerState {
    fn push(&mut self, due: Duration, token: TimerToken) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((due, seq, token)));
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, callback: Callback) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timers.insert(token, TimerEntry { callback: Some(callback), period });
        let due = self.now + delay;
        self.push(due, token);
        token
    }

    /// Pops the next live entry due at or before `deadline`.
    fn pop_due(&mut self, deadline: Duration) -> Option<(Duration, TimerToken)> {
        while let Some(Reverse((due, _, token))) = self.queue.peek().copied() {
            if due > deadline {
                return None;
            }
            self.queue.pop();
            if self.timers.contains_key(&token) {
                return Some((due, token));
            }
        }
        None
    }
}

/// Cheap clonable handle to a timer loop.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl Scheduler {
    fn with_clock(clock: Clock) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState {
                clock,
                now: Duration::ZERO,
                next_token: 0,
                next_seq: 0,
                queue: BinaryHeap::new(),
                timers: HashMap::new(),
            })),
        }
    }

    /// A scheduler whose clock only moves when driven. Nothing sleeps.
    pub fn virtual_time() -> Self {
        Self::with_clock(Clock::Virtual)
    }

    /// A scheduler that sleeps the current thread until each entry is due.
    pub fn real_time() -> Self {
        Self::with_clock(Clock::Real { origin: Instant::now() })
    }

    /// Logical time elapsed since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of live (not yet fired or cancelled) entries.
    pub fn pending(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn after(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerToken {
        let mut callback = Some(callback);
        let token = self.state.borrow_mut().insert(
            delay,
            None,
            Box::new(move || {
                if let Some(f) = callback.take() {
                    f()
                }
            }),
        );
        trace!(?token, ?delay, "scheduled one-shot");
        token
    }

    /// Runs `callback` every `period`, first after one period. Periods below
    /// [`MIN_PERIOD`] are raised to it.
    pub fn every(&self, period: Duration, callback: impl FnMut() + 'static) -> TimerToken {
        let period = if period < MIN_PERIOD {
            warn!(?period, min = ?MIN_PERIOD, "periodic timer below minimum period, clamped");
            MIN_PERIOD
        } else {
            period
        };
        let token = self.state.borrow_mut().insert(period, Some(period), Box::new(callback));
        trace!(?token, ?period, "scheduled periodic");
        token
    }

    /// Cancels a pending or repeating entry. Unknown, fired and already
    /// cancelled tokens are ignored.
    pub fn cancel(&self, token: TimerToken) {
        if self.state.borrow_mut().timers.remove(&token).is_some() {
            trace!(?token, "cancelled");
        }
    }

    /// Runs every entry due within the next `span`, then leaves the clock at
    /// `now + span`.
    pub fn advance_by(&self, span: Duration) {
        let deadline = self.now() + span;
        while let Some((due, token)) = self.next_due(deadline) {
            self.fire(due, token);
        }
        self.state.borrow_mut().now = deadline;
    }

    /// Drives the scheduler for `span` of logical time. A real-time scheduler
    /// sleeps until each entry is due; a virtual one does not.
    pub fn run_for(&self, span: Duration) {
        let deadline = self.now() + span;
        while let Some((due, token)) = self.next_due(deadline) {
            self.sleep_until(due);
            self.fire(due, token);
        }
        self.sleep_until(deadline);
        self.state.borrow_mut().now = deadline;
    }

    fn next_due(&self, deadline: Duration) -> Option<(Duration, TimerToken)> {
        self.state.borrow_mut().pop_due(deadline)
    }

    fn sleep_until(&self, due: Duration) {
        let clock = self.state.borrow().clock;
        if let Clock::Real { origin } = clock {
            let elapsed = origin.elapsed();
            if due > elapsed {
                std::thread::sleep(due - elapsed);
            }
        }
    }

    fn fire(&self, due: Duration, token: TimerToken) {
        let callback = {
            let mut state = self.state.borrow_mut();
            state.now = due;
            state.timers.get_mut(&token).and_then(|e| e.callback.take())
        };
        let Some(mut callback) = callback else { return };
        callback();

        let mut state = self.state.borrow_mut();
        match state.timers.get(&token).map(|entry| entry.period) {
            Some(Some(period)) => {
                if let Some(entry) = state.timers.get_mut(&token) {
                    entry.callback = Some(callback);
                }
                state.push(due + period, token);
            }
            Some(None) => {
                state.timers.remove(&token);
            }
            // cancelled from inside its own callback
            None => {}
        }
    }
}
