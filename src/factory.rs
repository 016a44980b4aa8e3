use std::time::Duration;

use crate::observable::Observable;
use crate::observer::Observer;
use crate::{BaseObservable, BaseObserver, Interval, Scheduler, Subscription, Timer};

/// Source built from `subscribe`, called once per subscription. The returned
/// `Subscription` releases whatever that call started.
pub fn create<I, E>(subscribe: impl Fn(BaseObserver<I, E>) -> Subscription + 'static) -> BaseObservable<I, E> {
    BaseObservable::new(subscribe)
}

pub fn interval(scheduler: &Scheduler, period: Duration) -> Interval {
    Interval::new(scheduler, period)
}

pub fn timer(scheduler: &Scheduler, delay: Duration) -> Timer {
    Timer::new(scheduler, delay)
}

pub fn empty<I: 'static, E: 'static>() -> impl Observable<Item = I, Error = E> + Clone {
    create(move |sub: BaseObserver<I, E>| {
        sub.on_completed();
        Subscription::empty()
    })
}

pub fn never<I: 'static, E: 'static>() -> impl Observable<Item = I, Error = E> + Clone {
    create(move |_: BaseObserver<I, E>| Subscription::empty())
}

pub fn throw<I: 'static, E: Clone + 'static>(error: E) -> impl Observable<Item = I, Error = E> + Clone {
    create(move |sub: BaseObserver<I, E>| {
        sub.on_error(error.clone());
        Subscription::empty()
    })
}

pub fn from_iter<T, E>(iter: T) -> BaseObservable<T::Item, E>
where
    T: IntoIterator + Clone + 'static,
    E: 'static,
{
    create(move |sub: BaseObserver<T::Item, E>| {
        iter.clone().into_iter().for_each(|x| sub.on_next(x));
        sub.on_completed();
        Subscription::empty()
    })
}

pub fn from_result<I: Clone + 'static, E: Clone + 'static>(res: Result<I, E>) -> impl Observable<Item = I, Error = E> + Clone {
    create(move |sub: BaseObserver<I, E>| {
        match res.clone() {
            Ok(item) => {
                sub.on_next(item);
                sub.on_completed();
            }
            Err(err) => sub.on_error(err),
        }
        Subscription::empty()
    })
}
