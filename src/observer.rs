use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use rand::Rng;
use tracing::{trace, warn};

/// Receives notifications from an observable.
///
/// `on_error` and `on_completed` take `self`: an observer can see at most one
/// terminal notification.
pub trait Observer<I, E> {
    fn on_next(&self, item: I);
    fn on_error(self, error: E);
    fn on_completed(self);
}

/// A single notification, in value form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification<I, E> {
    Next(I),
    Error(E),
    Completed,
}

impl<I, E> Notification<I, E> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Routes the notification to the matching observer method.
    pub fn deliver<O>(self, observer: &O)
    where
        O: Observer<I, E> + Clone,
    {
        match self {
            Notification::Next(item) => observer.on_next(item),
            Notification::Error(error) => observer.clone().on_error(error),
            Notification::Completed => observer.clone().on_completed(),
        }
    }
}

impl<I: fmt::Display, E: fmt::Display> fmt::Display for Notification<I, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Next(item) => write!(f, "onNext: {item}"),
            Notification::Error(error) => write!(f, "onError: {error}"),
            Notification::Completed => f.write_str("onCompleted"),
        }
    }
}

struct Slot<I, E> {
    closed: Cell<bool>,
    observer: RefCell<Option<Box<dyn BoxedObserver<I, E>>>>,
    /// Terminal notification that arrived while `on_next` held the observer.
    pending: RefCell<Option<Notification<I, E>>>,
}

/// Shared, type-erased observer.
///
/// Clones point at the same slot. Once the slot is closed, by a terminal
/// notification or by [`BaseObserver::dispose`], every later notification is
/// dropped.
pub struct BaseObserver<I, E> {
    id: u32,
    slot: Rc<Slot<I, E>>,
}

impl<I, E> Clone for BaseObserver<I, E> {
    fn clone(&self) -> Self {
        Self { id: self.id, slot: self.slot.clone() }
    }
}

impl<I, E> BaseObserver<I, E> {
    pub fn new(observer: impl Observer<I, E> + 'static) -> Self {
        let id = rand::thread_rng().gen();
        Self {
            id,
            slot: Rc::new(Slot {
                closed: Cell::new(false),
                observer: RefCell::new(Some(Box::new(observer))),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.slot.closed.get()
    }

    /// Whether both handles wrap the same observer.
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.slot, &other.slot)
    }

    /// Closes the slot and drops the wrapped observer.
    pub fn dispose(self) {
        if self.slot.closed.replace(true) {
            return;
        }
        trace!(observer = self.id, "disposed");
        // still borrowed when disposed from inside its own on_next; the closed
        // flag already blocks delivery and the box goes with the last handle
        if let Ok(mut observer) = self.slot.observer.try_borrow_mut() {
            observer.take();
        }
    }

    fn terminate(&self, notification: Notification<I, E>) {
        if self.slot.closed.replace(true) {
            return;
        }
        let observer = match self.slot.observer.try_borrow_mut() {
            Ok(mut observer) => observer.take(),
            Err(_) => {
                // inside its own on_next, which delivers it on the way out
                *self.slot.pending.borrow_mut() = Some(notification);
                return;
            }
        };
        if let Some(observer) = observer {
            finish(observer, notification);
        }
    }

    fn flush_pending(&self) {
        if self.slot.pending.borrow().is_none() {
            return;
        }
        // an outer on_next still holds the observer
        let observer = match self.slot.observer.try_borrow_mut() {
            Ok(mut observer) => observer.take(),
            Err(_) => return,
        };
        let notification = self.slot.pending.borrow_mut().take();
        if let (Some(observer), Some(notification)) = (observer, notification) {
            finish(observer, notification);
        }
    }
}

fn finish<I, E>(observer: Box<dyn BoxedObserver<I, E>>, notification: Notification<I, E>) {
    match notification {
        Notification::Error(error) => observer.on_error_box(error),
        Notification::Completed => observer.on_completed_box(),
        Notification::Next(_) => {}
    }
}

impl<I, E> Observer<I, E> for BaseObserver<I, E> {
    fn on_next(&self, item: I) {
        if self.is_closed() {
            return;
        }
        if let Ok(observer) = self.slot.observer.try_borrow() {
            if let Some(observer) = observer.as_ref() {
                observer.on_next(item)
            }
        }
        self.flush_pending();
    }

    fn on_error(self, error: E) {
        self.terminate(Notification::Error(error));
    }

    fn on_completed(self) {
        self.terminate(Notification::Completed);
    }
}

impl<I, F, E> Observer<I, E> for F
where
    F: Fn(I),
{
    fn on_next(&self, item: I) {
        self(item);
    }

    fn on_error(self, _error: E) {
        warn!("error notification reached an observer without an error handler");
    }

    fn on_completed(self) {}
}

impl<I, N, E, Err> Observer<I, Err> for (N, E)
where
    N: Fn(I),
    E: FnOnce(Err),
{
    fn on_next(&self, item: I) {
        self.0(item);
    }

    fn on_error(self, error: Err) {
        self.1(error);
    }

    fn on_completed(self) {}
}

impl<I, N, C, E, Err> Observer<I, Err> for (N, E, C)
where
    N: Fn(I),
    C: FnOnce(),
    E: FnOnce(Err),
{
    fn on_next(&self, item: I) {
        self.0(item);
    }

    fn on_error(self, error: Err) {
        self.1(error);
    }

    fn on_completed(self) {
        self.2();
    }
}

trait BoxedObserver<I, E>: Observer<I, E> {
    fn on_completed_box(self: Box<Self>);
    fn on_error_box(self: Box<Self>, error: E);
}

impl<O, I, E> BoxedObserver<I, E> for O
where
    O: Observer<I, E>,
{
    fn on_completed_box(self: Box<Self>) {
        self.on_completed();
    }

    fn on_error_box(self: Box<Self>, error: E) {
        self.on_error(error);
    }
}
