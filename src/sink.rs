//! Line sinks for observers that narrate what they receive.
//!
//! Each notification becomes one line, `"<name>: onNext: 3"`,
//! `"<name>: onError: <message>"` or `"<name>: onCompleted"`. Where the line
//! goes has no effect on scheduling.

use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use tracing::trace;

use crate::observer::{Notification, Observer};

pub trait Sink {
    fn line(&self, line: &str);
}

/// Prints every line to stdout.
#[derive(Default, Clone, Copy, Debug)]
pub struct ConsoleSink;

impl Sink for ConsoleSink {
    fn line(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps every line in memory, in arrival order.
#[derive(Default, Clone, Debug)]
pub struct RecordingSink {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Sink for RecordingSink {
    fn line(&self, line: &str) {
        self.lines.borrow_mut().push(line.to_owned());
    }
}

fn emit<I: Display, E: Display>(sink: &Rc<dyn Sink>, name: &str, notification: Notification<I, E>) {
    let line = format!("{name}: {notification}");
    trace!(%line, "notification");
    sink.line(&line);
}

/// An observer that writes one line per notification to `sink`.
pub fn narrating<I, E>(name: impl Into<String>, sink: &Rc<dyn Sink>) -> impl Observer<I, E>
where
    I: Display,
    E: Display,
{
    let name: String = name.into();
    let name: Rc<str> = Rc::from(name);
    let next = {
        let (name, sink) = (name.clone(), sink.clone());
        move |item: I| emit::<I, E>(&sink, &name, Notification::Next(item))
    };
    let error = {
        let (name, sink) = (name.clone(), sink.clone());
        move |error: E| emit::<I, E>(&sink, &name, Notification::Error(error))
    };
    let complete = {
        let sink = sink.clone();
        move || emit::<I, E>(&sink, &name, Notification::Completed)
    };
    (next, error, complete)
}
