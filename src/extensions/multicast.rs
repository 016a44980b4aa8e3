use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::extensions::ref_count::RefCount;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::{BaseObserver, Subject, Subscription};

type Connector<I, E> = Rc<dyn Fn(BaseObserver<I, E>) -> Subscription + 'static>;
type Connection = Rc<RefCell<Option<Subscription>>>;

/// Hot wrapper over a source: one shared run, started by [`Multicast::connect`].
///
/// Subscribing only attaches to the fan-out. Values produced before an
/// observer attached are not replayed to it.
pub struct Multicast<I, E> {
    source: Connector<I, E>,
    subject: Subject<I, E>,
    connection: Connection,
}

pub trait PublishExt: Observable + Clone + Sized + 'static {
    fn publish(self) -> Multicast<Self::Item, Self::Error>
    where
        Self::Item: Clone,
        Self::Error: Clone,
    {
        Multicast::new(self)
    }

    /// `publish().ref_count()`
    fn share(self) -> RefCount<Self::Item, Self::Error>
    where
        Self::Item: Clone,
        Self::Error: Clone,
    {
        self.publish().ref_count()
    }
}

impl<O> PublishExt for O where O: Observable + Clone + 'static {}

impl<I, E> Multicast<I, E>
where
    I: Clone + 'static,
    E: Clone + 'static,
{
    pub fn new<O>(source: O) -> Self
    where
        O: Observable<Item = I, Error = E> + Clone + 'static,
    {
        Self {
            source: Rc::new(move |observer: BaseObserver<I, E>| source.clone().subscribe(observer)),
            subject: Subject::new(),
            connection: Rc::new(RefCell::new(None)),
        }
    }

    pub fn fork(&self) -> Self {
        Self {
            source: self.source.clone(),
            subject: self.subject.fork(),
            connection: self.connection.clone(),
        }
    }

    pub fn ref_count(self) -> RefCount<I, E> {
        RefCount::new(self)
    }

    /// Starts the shared run unless one is already live, in which case the
    /// live connection is returned. Unsubscribing the result disconnects.
    pub fn connect(&self) -> Subscription {
        if let Some(connection) = self.live_connection() {
            return connection;
        }

        let finished = Rc::new(Cell::new(false));
        let next = {
            let subject = self.subject.fork();
            move |item: I| subject.on_next(item)
        };
        let error = {
            let subject = self.subject.fork();
            let connection = self.connection.clone();
            let finished = finished.clone();
            move |error: E| {
                finished.set(true);
                subject.on_error(error);
                teardown(&connection);
            }
        };
        let complete = {
            let subject = self.subject.fork();
            let connection = self.connection.clone();
            let finished = finished.clone();
            move || {
                finished.set(true);
                subject.on_completed();
                teardown(&connection);
            }
        };

        let connection = (self.source)(BaseObserver::new((next, error, complete)));
        if finished.get() {
            // source terminated while subscribing
            connection.unsubscribe();
            return connection;
        }
        debug!(observers = self.observer_count(), "connected");
        *self.connection.borrow_mut() = Some(connection.clone());
        connection
    }

    /// Stops the shared run. Attached observers stay attached.
    pub fn disconnect(&self) {
        if teardown(&self.connection) {
            debug!(observers = self.observer_count(), "disconnected");
        }
    }
}

impl<I, E> Multicast<I, E> {
    pub fn is_connected(&self) -> bool {
        self.live_connection().is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.subject.observer_count()
    }

    fn live_connection(&self) -> Option<Subscription> {
        self.connection.borrow().as_ref().filter(|c| !c.is_closed()).cloned()
    }
}

fn teardown(connection: &Connection) -> bool {
    let live = connection.borrow_mut().take();
    match live {
        Some(live) if !live.is_closed() => {
            live.unsubscribe();
            true
        }
        _ => false,
    }
}

impl<I, E> Observable for Multicast<I, E>
where
    I: 'static,
    E: 'static,
{
    type Item = I;
    type Error = E;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        self.subject.subscribe(observer)
    }
}
