mod observable;
mod observer;
mod scheduler;
mod subject;
mod timer;

pub mod config;
pub mod error;
pub mod extensions;
pub mod factory;
pub mod scenarios;
pub mod sink;

pub mod prelude {
    pub use crate::extensions::PublishExt;
    pub use crate::observable::Observable;
    pub use crate::observer::Observer;
}

pub use error::RxError;
pub use extensions::{Multicast, RefCount, RefCountState};
pub use observable::{BaseObservable, Subscription};
pub use observer::{BaseObserver, Notification};
pub use scheduler::{Scheduler, TimerToken, MIN_PERIOD};
pub use subject::Subject;
pub use timer::{Interval, Timer};
