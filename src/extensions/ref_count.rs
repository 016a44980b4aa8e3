use tracing::debug;

use crate::extensions::multicast::Multicast;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::Subscription;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RefCountState {
    /// No observers attached, not connected.
    Idle,
    /// At least one observer attached and the shared run is live.
    Active,
}

/// [`Multicast`] that connects on its first observer and disconnects when
/// the last one leaves.
///
/// The count is the inner connector's attachment count, so an observer
/// drained by a terminal notification no longer holds the run open. Every
/// connect after a full drain is a fresh run.
pub struct RefCount<I, E> {
    inner: Multicast<I, E>,
}

impl<I, E> RefCount<I, E>
where
    I: Clone + 'static,
    E: Clone + 'static,
{
    pub fn new(inner: Multicast<I, E>) -> Self {
        Self { inner }
    }

    pub fn fork(&self) -> Self {
        Self { inner: self.inner.fork() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.observer_count()
    }

    pub fn state(&self) -> RefCountState {
        if self.inner.is_connected() {
            RefCountState::Active
        } else {
            RefCountState::Idle
        }
    }
}

impl<I, E> Observable for RefCount<I, E>
where
    I: Clone + 'static,
    E: Clone + 'static,
{
    type Item = I;
    type Error = E;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        let attached = self.inner.fork().subscribe(observer);
        if !self.inner.is_connected() {
            debug!(observers = self.inner.observer_count(), "first observer, connecting");
            self.inner.connect();
        }
        let inner = self.inner;
        Subscription::new(move || {
            attached.unsubscribe();
            if inner.observer_count() == 0 && inner.is_connected() {
                debug!("last observer left, disconnecting");
                inner.disconnect();
            }
        })
    }
}
