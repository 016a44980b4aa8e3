use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rxtiming::config::ScenarioConfig;
use rxtiming::prelude::*;
use rxtiming::scenarios::Scenario;
use rxtiming::sink::{narrating, RecordingSink, Sink};
use rxtiming::{Interval, RefCountState, RxError, Scheduler, Subscription};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn collect(source: impl Observable<Item = u64, Error = RxError>, log: &Rc<RefCell<Vec<(usize, u64)>>>, tag: usize) -> Subscription {
    let log = log.clone();
    source.subscribe(move |x| log.borrow_mut().push((tag, x)))
}

#[test]
fn simultaneous_cold_subscriptions_see_identical_sequences() {
    let scheduler = Scheduler::virtual_time();
    let source = Interval::new(&scheduler, ms(100));
    let log = Rc::new(RefCell::new(Vec::new()));
    let subs: Vec<_> = (0..3).map(|tag| collect(source.clone(), &log, tag)).collect();

    scheduler.advance_by(ms(300));
    for sub in &subs {
        sub.unsubscribe();
    }

    let expected: Vec<(usize, u64)> = (0..3).flat_map(|x| (0..3).map(move |tag| (tag, x))).collect();
    assert_eq!(expected, *log.borrow());
}

#[test]
fn unsubscribing_one_cold_subscription_leaves_others_alone() {
    let scheduler = Scheduler::virtual_time();
    let source = Interval::new(&scheduler, ms(100));
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = collect(source.clone(), &log, 1);
    let _second = collect(source, &log, 2);

    scheduler.advance_by(ms(150));
    first.unsubscribe();
    scheduler.advance_by(ms(200));

    assert_eq!(vec![(1, 0), (2, 0), (2, 1), (2, 2)], *log.borrow());
}

#[test]
fn late_hot_observer_starts_mid_sequence() {
    let scheduler = Scheduler::virtual_time();
    let hot = Interval::new(&scheduler, ms(100)).publish();
    let log = Rc::new(RefCell::new(Vec::new()));
    hot.connect();

    scheduler.advance_by(ms(420));
    let _late = collect(hot.fork(), &log, 1);
    scheduler.advance_by(ms(200));

    assert_eq!(vec![(1, 4), (1, 5)], *log.borrow());
}

#[test]
fn ref_count_cycles_restart_at_zero() {
    let scheduler = Scheduler::virtual_time();
    let shared = Interval::new(&scheduler, ms(100)).share();
    let log = Rc::new(RefCell::new(Vec::new()));

    for tag in 0..3 {
        assert_eq!(RefCountState::Idle, shared.state());
        let sub = collect(shared.fork(), &log, tag);
        scheduler.advance_by(ms(100 * (tag as u64 + 1)));
        sub.unsubscribe();
        scheduler.advance_by(ms(50));
    }

    assert_eq!(vec![(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)], *log.borrow());
}

#[test]
fn scenarios_on_virtual_clock_match_expected_output() {
    let config = ScenarioConfig::default();
    for scenario in Scenario::ALL {
        let lines = scenario.record(&config);
        assert_eq!(scenario.expected(), lines.as_slice(), "{scenario}");
    }
}

#[test]
fn hot_ref_count_third_observer_starts_over() {
    let lines = Scenario::HotRefCount.record(&ScenarioConfig::default());
    let third: Vec<&str> = lines.iter().map(String::as_str).filter(|l| l.starts_with("Observer 3")).collect();
    assert_eq!(vec!["Observer 3: onNext: 0", "Observer 3: onNext: 1"], third);
}

#[test]
fn control_on_real_clock() {
    let config = ScenarioConfig::default().scaled(5);
    let scheduler = Scheduler::real_time();
    let recording = RecordingSink::new();
    let sink: Rc<dyn Sink> = Rc::new(recording.clone());

    let started = Instant::now();
    Scenario::Control.run(&scheduler, &config, &sink);

    assert!(started.elapsed() >= config.control_window);
    assert_eq!(Scenario::Control.expected(), recording.lines().as_slice());
}

#[test]
fn narrating_observer_reports_errors() {
    let recording = RecordingSink::new();
    let sink: Rc<dyn Sink> = Rc::new(recording.clone());
    let hot = rxtiming::factory::throw::<u64, _>(RxError::failed("source exploded")).publish();
    hot.fork().subscribe(narrating::<u64, RxError>("Observer 1", &sink));
    hot.fork().subscribe(narrating::<u64, RxError>("Observer 2", &sink));
    hot.connect();
    assert_eq!(
        vec!["Observer 1: onError: source exploded", "Observer 2: onError: source exploded"],
        recording.lines()
    );
}
