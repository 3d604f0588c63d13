use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use coinfeed_core::{
    CoinEntry, CoinId, CoinRecord, DataSource, RecordSink, SinkError, UnitOutcome, UnitTarget,
};
use time::macros::date;
use time::Date;

const TODAY: Date = date!(2024 - 03 - 01);

/// Data source that records the order of units and pacing calls.
#[derive(Default)]
struct RecordingSource {
    events: Mutex<Vec<String>>,
    outcome_for_current: Option<UnitOutcome>,
}

impl RecordingSource {
    fn events(&self) -> Vec<String> {
        self.events.lock().expect("event log poisoned").clone()
    }

    fn push(&self, event: String) {
        self.events.lock().expect("event log poisoned").push(event);
    }
}

impl DataSource for RecordingSource {
    fn fetch_unit<'a>(
        &'a self,
        coin: &'a CoinEntry,
        target: UnitTarget,
        _sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = UnitOutcome> + Send + 'a>> {
        self.push(format!("{}@{target}", coin.id));
        let outcome = match target {
            UnitTarget::Current => self.outcome_for_current.unwrap_or(UnitOutcome::Delivered),
            UnitTarget::Historical(_) => UnitOutcome::Delivered,
        };
        Box::pin(async move { outcome })
    }

    fn pace<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.push(String::from("pace"));
        Box::pin(async {})
    }
}

struct NullSink;

impl RecordSink for NullSink {
    fn accept<'a>(
        &'a self,
        _record: CoinRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

fn bitcoin() -> CoinEntry {
    CoinEntry::new(CoinId::parse("bitcoin").expect("valid coin id"), "Bitcoin", "btc")
}

#[test]
fn current_runs_one_unit_then_paces() {
    let source = RecordingSource::default();

    let outcome = block_on(source.current(&bitcoin(), &NullSink));

    assert_eq!(outcome, UnitOutcome::Delivered);
    assert_eq!(source.events(), vec!["bitcoin@current", "pace"]);
}

#[test]
fn current_paces_even_after_a_failed_unit() {
    let source = RecordingSource {
        outcome_for_current: Some(UnitOutcome::Exhausted { attempts: 10 }),
        ..RecordingSource::default()
    };

    let outcome = block_on(source.current(&bitcoin(), &NullSink));

    assert_eq!(outcome, UnitOutcome::Exhausted { attempts: 10 });
    assert_eq!(source.events(), vec!["bitcoin@current", "pace"]);
}

#[test]
fn history_window_interleaves_units_and_pacing_in_date_order() {
    let source = RecordingSource::default();

    let summary = block_on(source.history_window(&bitcoin(), 3, TODAY, &NullSink));

    assert_eq!(summary.delivered, 3);
    assert_eq!(
        source.events(),
        vec![
            "bitcoin@2024-02-28",
            "pace",
            "bitcoin@2024-02-29",
            "pace",
            "bitcoin@2024-03-01",
            "pace",
        ]
    );
}

#[test]
fn history_since_starts_the_day_after_the_checkpoint() {
    let source = RecordingSource::default();

    let summary = block_on(source.history_since(
        &bitcoin(),
        Some(date!(2024 - 02 - 28)),
        TODAY,
        &NullSink,
    ));

    assert_eq!(summary.units(), 2);
    assert_eq!(source.events()[0], "bitcoin@2024-02-29");
}

#[test]
fn history_since_with_an_up_to_date_checkpoint_does_nothing() {
    let source = RecordingSource::default();

    let summary = block_on(source.history_since(&bitcoin(), Some(TODAY), TODAY, &NullSink));

    assert_eq!(summary.units(), 0);
    assert!(source.events().is_empty());
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_noop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_noop,
    noop_raw_waker_noop,
    noop_raw_waker_noop,
);
