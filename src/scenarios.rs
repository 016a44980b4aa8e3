//! Fixed timing scripts contrasting cold, hot and ref-counted sources.
//!
//! Each script subscribes narrating observers named `Observer 1`, `Observer 2`
//! and so on, schedules its joins and unsubscribes on the scheduler, and then
//! drives the scheduler until the last unsubscribe has run.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::config::ScenarioConfig;
use crate::prelude::*;
use crate::sink::{narrating, RecordingSink, Sink};
use crate::{Interval, RxError, Scheduler};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Two observers on one cold source, subscribed together.
    Control,
    /// Second observer joins a cold source late and gets its own run.
    Cold,
    /// Second observer joins a connected hot source late and shares its run.
    Hot,
    /// Ref-counted hot source drained to zero, then subscribed again.
    HotRefCount,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown scenario {0:?}, expected one of control, cold, hot, hotRefCount")]
pub struct UnknownScenario(String);

const CONTROL_EXPECTED: &[&str] = &[
    "Observer 1: onNext: 0",
    "Observer 2: onNext: 0",
    "Observer 1: onNext: 1",
    "Observer 2: onNext: 1",
    "Observer 1: onNext: 2",
    "Observer 2: onNext: 2",
    "Observer 1: onNext: 3",
    "Observer 2: onNext: 3",
];

const COLD_EXPECTED: &[&str] = &[
    "Observer 1: onNext: 0",
    "Observer 1: onNext: 1",
    "Observer 1: onNext: 2",
    "Observer 2: onNext: 0",
    "Observer 1: onNext: 3",
    "Observer 2: onNext: 1",
    "Observer 1: onNext: 4",
];

const HOT_EXPECTED: &[&str] = &[
    "Observer 1: onNext: 0",
    "Observer 1: onNext: 1",
    "Observer 1: onNext: 2",
    "Observer 2: onNext: 2",
    "Observer 1: onNext: 3",
    "Observer 2: onNext: 3",
    "Observer 1: onNext: 4",
    "Observer 2: onNext: 4",
];

const HOT_REF_COUNT_EXPECTED: &[&str] = &[
    "Observer 1: onNext: 0",
    "Observer 1: onNext: 1",
    "Observer 1: onNext: 2",
    "Observer 2: onNext: 2",
    "Observer 1: onNext: 3",
    "Observer 2: onNext: 3",
    "Observer 1: onNext: 4",
    "Observer 2: onNext: 4",
    "Observer 3: onNext: 0",
    "Observer 3: onNext: 1",
];

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::Control, Scenario::Cold, Scenario::Hot, Scenario::HotRefCount];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Control => "control",
            Scenario::Cold => "cold",
            Scenario::Hot => "hot",
            Scenario::HotRefCount => "hotRefCount",
        }
    }

    /// Lines the script produces with the default config.
    pub fn expected(&self) -> &'static [&'static str] {
        match self {
            Scenario::Control => CONTROL_EXPECTED,
            Scenario::Cold => COLD_EXPECTED,
            Scenario::Hot => HOT_EXPECTED,
            Scenario::HotRefCount => HOT_REF_COUNT_EXPECTED,
        }
    }

    /// Time from the first subscribe to the last unsubscribe.
    pub fn duration(&self, config: &ScenarioConfig) -> Duration {
        match self {
            Scenario::Control => config.control_window,
            Scenario::Cold | Scenario::Hot => config.join_after + config.hold_for,
            Scenario::HotRefCount => config.join_after + config.hold_for * 2,
        }
    }

    /// Schedules the script and drives `scheduler` to its end.
    pub fn run(&self, scheduler: &Scheduler, config: &ScenarioConfig, sink: &Rc<dyn Sink>) {
        info!(scenario = self.name(), "scenario started");
        match self {
            Scenario::Control => control(scheduler, config, sink),
            Scenario::Cold => cold(scheduler, config, sink),
            Scenario::Hot => hot(scheduler, config, sink),
            Scenario::HotRefCount => hot_ref_count(scheduler, config, sink),
        }
        scheduler.run_for(self.duration(config));
        info!(scenario = self.name(), pending = scheduler.pending(), "scenario finished");
    }

    /// Runs the script on a fresh virtual clock and returns its lines.
    pub fn record(&self, config: &ScenarioConfig) -> Vec<String> {
        let recording = RecordingSink::new();
        let sink: Rc<dyn Sink> = Rc::new(recording.clone());
        self.run(&Scheduler::virtual_time(), config, &sink);
        recording.lines()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| {
                let name = scenario.name();
                name.eq_ignore_ascii_case(s) || s.eq_ignore_ascii_case(&name.replace("RefCount", "-ref-count"))
            })
            .ok_or_else(|| UnknownScenario(s.to_owned()))
    }
}

fn observer(n: u32, sink: &Rc<dyn Sink>) -> impl Observer<u64, RxError> {
    narrating::<u64, RxError>(format!("Observer {n}"), sink)
}

fn control(scheduler: &Scheduler, config: &ScenarioConfig, sink: &Rc<dyn Sink>) {
    let source = Interval::new(scheduler, config.period);

    let first = source.clone().subscribe(observer(1, sink));
    let second = source.subscribe(observer(2, sink));

    scheduler.after(config.control_window, move || {
        first.unsubscribe();
        second.unsubscribe();
    });
}

fn cold(scheduler: &Scheduler, config: &ScenarioConfig, sink: &Rc<dyn Sink>) {
    let source = Interval::new(scheduler, config.period);

    let first = source.clone().subscribe(observer(1, sink));

    let later = scheduler.clone();
    let sink = sink.clone();
    let hold_for = config.hold_for;
    scheduler.after(config.join_after, move || {
        let second = source.subscribe(observer(2, &sink));
        later.after(hold_for, move || {
            first.unsubscribe();
            second.unsubscribe();
        });
    });
}

fn hot(scheduler: &Scheduler, config: &ScenarioConfig, sink: &Rc<dyn Sink>) {
    let hot = Interval::new(scheduler, config.period).publish();
    hot.connect();

    let first = hot.fork().subscribe(observer(1, sink));

    let later = scheduler.clone();
    let sink = sink.clone();
    let hold_for = config.hold_for;
    scheduler.after(config.join_after, move || {
        let second = hot.fork().subscribe(observer(2, &sink));
        later.after(hold_for, move || {
            first.unsubscribe();
            second.unsubscribe();
            hot.disconnect();
        });
    });
}

fn hot_ref_count(scheduler: &Scheduler, config: &ScenarioConfig, sink: &Rc<dyn Sink>) {
    let shared = Interval::new(scheduler, config.period).share();

    let first = shared.fork().subscribe(observer(1, sink));

    let later = scheduler.clone();
    let sink = sink.clone();
    let hold_for = config.hold_for;
    scheduler.after(config.join_after, move || {
        let second = shared.fork().subscribe(observer(2, &sink));
        let last = later.clone();
        later.after(hold_for, move || {
            first.unsubscribe();
            second.unsubscribe();

            let third = shared.subscribe(observer(3, &sink));
            last.after(hold_for, move || third.unsubscribe());
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scenario_matches_its_expected_lines() {
        let config = ScenarioConfig::default();
        for scenario in Scenario::ALL {
            assert_eq!(scenario.expected(), scenario.record(&config).as_slice(), "{scenario}");
        }
    }

    #[test]
    fn scenarios_leave_no_timers_behind() {
        let config = ScenarioConfig::default();
        for scenario in Scenario::ALL {
            let scheduler = Scheduler::virtual_time();
            let sink: Rc<dyn Sink> = Rc::new(RecordingSink::new());
            scenario.run(&scheduler, &config, &sink);
            assert_eq!(0, scheduler.pending(), "{scenario}");
            assert_eq!(scenario.duration(&config), scheduler.now());
        }
    }

    #[test]
    fn parses_names() {
        assert_eq!(Ok(Scenario::HotRefCount), "hotRefCount".parse());
        assert_eq!(Ok(Scenario::HotRefCount), "hot-ref-count".parse());
        assert_eq!(Ok(Scenario::Cold), "COLD".parse());
        assert!("lukewarm".parse::<Scenario>().is_err());
        for scenario in Scenario::ALL {
            assert_eq!(Ok(scenario), scenario.to_string().parse());
        }
    }
}
