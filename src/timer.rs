use std::time::Duration;

use tracing::debug;

use crate::error::RxError;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::scheduler::Scheduler;
use crate::{BaseObserver, Subscription};

/// Cold source of `0, 1, 2, ...`, one value per period.
///
/// Every subscription owns its own run: its own counter and its own periodic
/// timer, both starting at subscribe time.
#[derive(Clone)]
pub struct Interval {
    scheduler: Scheduler,
    period: Duration,
}

impl Interval {
    /// Periods below [`MIN_PERIOD`](crate::MIN_PERIOD) tick at
    /// that minimum.
    pub fn new(scheduler: &Scheduler, period: Duration) -> Self {
        Self { scheduler: scheduler.clone(), period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// State of one interval run. Owned by the scheduler's timer entry and
/// reached through the subscription's timer token.
struct IntervalRun {
    counter: u64,
    observer: BaseObserver<u64, RxError>,
}

impl IntervalRun {
    fn tick(&mut self) {
        self.observer.on_next(self.counter);
        self.counter += 1;
    }
}

impl Observable for Interval {
    type Item = u64;
    type Error = RxError;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        let observer = BaseObserver::new(observer);
        let mut run = IntervalRun { counter: 0, observer: observer.clone() };
        let token = self.scheduler.every(self.period, move || run.tick());
        debug!(observer = observer.id(), ?token, period = ?self.period, "interval run started");
        let scheduler = self.scheduler;
        Subscription::new(move || {
            scheduler.cancel(token);
            debug!(observer = observer.id(), ?token, "interval run stopped");
            observer.dispose();
        })
    }
}

/// Emits `0` once after a delay, then completes.
#[derive(Clone)]
pub struct Timer {
    scheduler: Scheduler,
    delay: Duration,
}

impl Timer {
    pub fn new(scheduler: &Scheduler, delay: Duration) -> Self {
        Self { scheduler: scheduler.clone(), delay }
    }
}

impl Observable for Timer {
    type Item = u64;
    type Error = RxError;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        let observer = BaseObserver::new(observer);
        let token = {
            let observer = observer.clone();
            self.scheduler.after(self.delay, move || {
                observer.on_next(0);
                observer.on_completed();
            })
        };
        let scheduler = self.scheduler;
        Subscription::new(move || {
            scheduler.cancel(token);
            observer.dispose();
        })
    }
}
