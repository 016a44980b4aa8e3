use std::cell::RefCell;
use std::rc::Rc;

use crate::observable::Observable;
use crate::observer::Observer;
use crate::{BaseObserver, Subscription};

type ObserverBundle<I, E> = Rc<RefCell<Vec<BaseObserver<I, E>>>>;

/// Fan-out point: an observer that rebroadcasts to every attached observer in
/// attachment order.
///
/// A terminal notification drains the attached list; the subject itself stays
/// usable and new observers can attach afterwards.
pub struct Subject<I, E> {
    observers: ObserverBundle<I, E>,
}

impl<I, E> Default for Subject<I, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, E> Subject<I, E> {
    pub fn new() -> Self {
        Self { observers: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn fork(&self) -> Self {
        Self { observers: self.observers.clone() }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub(crate) fn attach(&self, observer: BaseObserver<I, E>) {
        self.observers.borrow_mut().push(observer);
    }

    pub(crate) fn detach(&self, observer: &BaseObserver<I, E>) {
        self.observers.borrow_mut().retain(|o| !o.same_as(observer));
    }

    fn snapshot(&self) -> Vec<BaseObserver<I, E>> {
        self.observers.borrow().clone()
    }

    fn drain(&self) -> Vec<BaseObserver<I, E>> {
        self.observers.borrow_mut().drain(..).collect()
    }
}

impl<I, E> Observable for Subject<I, E>
where
    I: 'static,
    E: 'static,
{
    type Item = I;
    type Error = E;

    fn subscribe(self, observer: impl Observer<Self::Item, Self::Error> + 'static) -> Subscription {
        let observer = BaseObserver::new(observer);
        self.attach(observer.clone());
        Subscription::new(move || {
            self.detach(&observer);
            observer.dispose();
        })
    }
}

impl<I: Clone, E: Clone> Observer<I, E> for Subject<I, E> {
    fn on_next(&self, item: I) {
        // observers unsubscribed mid fan-out are already closed and skip it
        for observer in self.snapshot() {
            observer.on_next(item.clone());
        }
    }

    fn on_error(self, error: E) {
        for observer in self.drain() {
            observer.on_error(error.clone());
        }
    }

    fn on_completed(self) {
        for observer in self.drain() {
            observer.on_completed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn it_works() {
        let input = Subject::<i64, ()>::new();
        let data = Rc::new(RefCell::new(Vec::new()));
        for tag in [10, 20] {
            let data = data.clone();
            input.fork().subscribe(move |x| {
                data.borrow_mut().push(tag + x);
            });
        }

        input.on_next(1);
        input.on_next(2);
        input.on_next(3);

        assert_eq!(&vec![11, 21, 12, 22, 13, 23], &*data.borrow());
    }

    #[test]
    fn terminal_drains() {
        let input = Subject::<i32, String>::new();
        let data = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let next = {
                let data = data.clone();
                move |x: i32| data.borrow_mut().push(format!("{tag} {x}"))
            };
            let error = {
                let data = data.clone();
                move |e: String| data.borrow_mut().push(format!("{tag} error {e}"))
            };
            input.fork().subscribe((next, error));
        }
        input.on_next(1);
        input.fork().on_error("boom".to_owned());
        input.on_next(2);
        assert_eq!(0, input.observer_count());
        assert_eq!(&vec!["a 1", "b 1", "a error boom", "b error boom"], &*data.borrow());
    }

    #[test]
    fn error_raised_by_an_observer_reaches_everyone() {
        let input = Subject::<i32, String>::new();
        let data = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let next = {
                let data = data.clone();
                let input = input.fork();
                move |x: i32| {
                    data.borrow_mut().push(format!("{tag} {x}"));
                    if tag == "a" {
                        input.fork().on_error("boom".to_owned());
                    }
                }
            };
            let error = {
                let data = data.clone();
                move |e: String| data.borrow_mut().push(format!("{tag} error {e}"))
            };
            input.fork().subscribe((next, error));
        }
        input.on_next(1);
        input.on_next(2);
        assert_eq!(&vec!["a 1", "b error boom", "a error boom"], &*data.borrow());
        assert_eq!(0, input.observer_count());
    }

    #[test]
    fn unsubscribe_mid_fan_out_skips_the_rest() {
        let input = Subject::<i32, ()>::new();
        let data = Rc::new(RefCell::new(Vec::new()));
        let second: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        {
            let data = data.clone();
            let second = second.clone();
            input.fork().subscribe(move |x| {
                data.borrow_mut().push(("first", x));
                if let Some(sub) = second.borrow().as_ref() {
                    sub.unsubscribe();
                }
            });
        }
        {
            let data = data.clone();
            let sub = input.fork().subscribe(move |x| data.borrow_mut().push(("second", x)));
            *second.borrow_mut() = Some(sub);
        }
        input.on_next(1);
        input.on_next(2);
        assert_eq!(&vec![("first", 1), ("first", 2)], &*data.borrow());
        assert_eq!(1, input.observer_count());
    }
}
