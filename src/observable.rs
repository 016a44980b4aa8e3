use std::cell::RefCell;
use std::rc::Rc;

use crate::observer::Observer;
use crate::BaseObserver;

pub trait Observable {
    type Item: 'static;
    type Error: 'static;
    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription;
}

type Teardown = Box<dyn FnOnce() + 'static>;

/// Handle returned by `subscribe` and `connect`.
///
/// Clones share one teardown, which runs on the first `unsubscribe` call
/// through any of them.
#[derive(Clone)]
pub struct Subscription {
    teardown: Rc<RefCell<Option<Teardown>>>,
}

impl Subscription {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self { teardown: Rc::new(RefCell::new(Some(Box::new(f)))) }
    }

    /// An already closed handle.
    pub fn empty() -> Self {
        Self { teardown: Rc::new(RefCell::new(None)) }
    }

    pub fn is_closed(&self) -> bool {
        self.teardown.borrow().is_none()
    }

    pub fn unsubscribe(&self) {
        let teardown = self.teardown.borrow_mut().take();
        if let Some(teardown) = teardown {
            teardown()
        }
    }
}

/// Observable built from a subscribe function.
///
/// The function runs once per subscription, so every subscriber gets its own
/// run. The `Subscription` it returns tears that run down and is unsubscribed
/// together with the observer.
pub struct BaseObservable<I, E> {
    subscribe: Rc<dyn Fn(BaseObserver<I, E>) -> Subscription + 'static>,
}

impl<I, E> Clone for BaseObservable<I, E> {
    fn clone(&self) -> Self {
        Self { subscribe: self.subscribe.clone() }
    }
}

impl<I, E> BaseObservable<I, E> {
    pub fn new<F>(subscribe: F) -> Self
    where
        F: Fn(BaseObserver<I, E>) -> Subscription + 'static,
    {
        Self { subscribe: Rc::new(subscribe) }
    }
}

impl<I: 'static, E: 'static> Observable for BaseObservable<I, E> {
    type Item = I;
    type Error = E;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        let observer = BaseObserver::new(observer);
        let producer = (self.subscribe)(observer.clone());
        Subscription::new(move || {
            producer.unsubscribe();
            observer.dispose();
        })
    }
}
