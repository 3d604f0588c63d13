//! Upstream data source contract and the ingestion patterns built on it.
//!
//! A *unit of work* is one retried fetch, normalize and deliver cycle for a
//! single coin and target (current snapshot or one historical date). Adapters
//! implement [`DataSource::fetch_unit`] and [`DataSource::pace`]; the three
//! access patterns are provided on top of those two.
//!
//! | Pattern | Method | Units per coin |
//! |---------|--------|----------------|
//! | Current | [`DataSource::current`] | 1 |
//! | Resumed history | [`DataSource::history_since`] | checkpoint + 1 ..= today |
//! | Fixed window | [`DataSource::history_window`] | last `days` days |
//!
//! Every unit, whatever its outcome, is followed by exactly one `pace` call.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use thiserror::Error;
use time::{Date, Duration};
use tracing::info;

use crate::backend::GatewayError;
use crate::config::CoinEntry;
use crate::domain::{CoinId, CoinRecord};
use crate::error::ValidationError;
use crate::transport::TransportError;

/// Oldest day the upstream history endpoint serves, counted back from today.
pub const MAX_LOOKBACK_DAYS: i64 = 365;

/// What a unit of work fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitTarget {
    Current,
    Historical(Date),
}

impl UnitTarget {
    pub const fn is_historical(self) -> bool {
        matches!(self, Self::Historical(_))
    }
}

impl Display for UnitTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Current => f.write_str("current"),
            Self::Historical(date) => write!(f, "{date}"),
        }
    }
}

/// Terminal state of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Delivered,
    /// Fetched and built, but the sink rejected the record.
    SinkFailed,
    /// 401/403 on a historical request.
    PermissionDenied,
    /// A 2xx body that lacks the coin, its identity or its timestamp.
    Unusable,
    Exhausted { attempts: u32 },
}

/// Per-pass tally of unit outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub delivered: u32,
    pub sink_failed: u32,
    pub permission_denied: u32,
    pub unusable: u32,
    pub exhausted: u32,
}

impl PassSummary {
    pub fn record(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Delivered => self.delivered += 1,
            UnitOutcome::SinkFailed => self.sink_failed += 1,
            UnitOutcome::PermissionDenied => self.permission_denied += 1,
            UnitOutcome::Unusable => self.unusable += 1,
            UnitOutcome::Exhausted { .. } => self.exhausted += 1,
        }
    }

    pub fn merge(&mut self, other: PassSummary) {
        self.delivered += other.delivered;
        self.sink_failed += other.sink_failed;
        self.permission_denied += other.permission_denied;
        self.unusable += other.unusable;
        self.exhausted += other.exhausted;
    }

    pub fn units(&self) -> u32 {
        self.delivered
            + self.sink_failed
            + self.permission_denied
            + self.unusable
            + self.exhausted
    }
}

impl FromIterator<UnitOutcome> for PassSummary {
    fn from_iter<I: IntoIterator<Item = UnitOutcome>>(iter: I) -> Self {
        let mut summary = Self::default();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}

/// Why a single attempt produced no record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unusable response: {0}")]
    Build(#[from] ValidationError),
}

impl FetchError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Transport(error) if error.is_permission_denied())
    }
}

/// Delivery failure reported by a [`RecordSink`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Accepts one finished record.
pub trait RecordSink: Send + Sync {
    fn accept<'a>(
        &'a self,
        record: CoinRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>>;
}

/// Answers "last date already ingested" for a coin.
pub trait CheckpointSource: Send + Sync {
    fn last_valid_date<'a>(
        &'a self,
        coin_id: &'a CoinId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Date>, GatewayError>> + Send + 'a>>;
}

/// Upstream adapter contract.
pub trait DataSource: Send + Sync {
    /// Runs one unit of work to a terminal outcome. Never fails: every fault
    /// is folded into the returned [`UnitOutcome`].
    fn fetch_unit<'a>(
        &'a self,
        coin: &'a CoinEntry,
        target: UnitTarget,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = UnitOutcome> + Send + 'a>>;

    /// Waits for the upstream rate limit to allow the next unit.
    fn pace<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

    fn current<'a>(
        &'a self,
        coin: &'a CoinEntry,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = UnitOutcome> + Send + 'a>> {
        Box::pin(async move {
            let outcome = self.fetch_unit(coin, UnitTarget::Current, sink).await;
            self.pace().await;
            outcome
        })
    }

    /// Fetches every day from the resumption start through `today`.
    fn history_since<'a>(
        &'a self,
        coin: &'a CoinEntry,
        checkpoint: Option<Date>,
        today: Date,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = PassSummary> + Send + 'a>> {
        Box::pin(async move {
            let start = resume_start_date(&coin.id, checkpoint, today);
            self.history_range(coin, days_between(start, today), sink)
                .await
        })
    }

    /// Fetches the `days` most recent days ending with `today`.
    fn history_window<'a>(
        &'a self,
        coin: &'a CoinEntry,
        days: u32,
        today: Date,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = PassSummary> + Send + 'a>> {
        Box::pin(async move { self.history_range(coin, window_dates(days, today), sink).await })
    }

    fn history_range<'a>(
        &'a self,
        coin: &'a CoinEntry,
        dates: Vec<Date>,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = PassSummary> + Send + 'a>> {
        Box::pin(async move {
            let mut summary = PassSummary::default();
            for date in dates {
                let outcome = self
                    .fetch_unit(coin, UnitTarget::Historical(date), sink)
                    .await;
                summary.record(outcome);
                self.pace().await;
            }
            summary
        })
    }
}

/// First day to fetch when resuming from `checkpoint`.
///
/// | Checkpoint | Start |
/// |------------|-------|
/// | within the last 365 days | checkpoint + 1 |
/// | older | today - 364 |
/// | none | today - 365 |
pub fn start_date(checkpoint: Option<Date>, today: Date) -> Date {
    let oldest = days_before(today, MAX_LOOKBACK_DAYS);
    match checkpoint {
        Some(date) if date >= oldest => date.next_day().unwrap_or(date),
        Some(_) => days_before(today, MAX_LOOKBACK_DAYS - 1),
        None => oldest,
    }
}

fn resume_start_date(coin_id: &CoinId, checkpoint: Option<Date>, today: Date) -> Date {
    let start = start_date(checkpoint, today);
    if let Some(date) = checkpoint {
        if date < days_before(today, MAX_LOOKBACK_DAYS) {
            info!(
                coin = %coin_id,
                checkpoint = %date,
                start = %start,
                "checkpoint older than the upstream look-back window; clamping"
            );
        }
    }
    start
}

/// Ascending dates of the `days`-long window ending at `today`.
pub fn window_dates(days: u32, today: Date) -> Vec<Date> {
    if days == 0 {
        return Vec::new();
    }
    let start = days_before(today, i64::from(days) - 1);
    days_between(start, today)
}

/// Every date in `start..=end`; empty when `start > end`.
pub fn days_between(start: Date, end: Date) -> Vec<Date> {
    let mut dates = Vec::new();
    let mut cursor = Some(start);
    while let Some(date) = cursor.filter(|date| *date <= end) {
        dates.push(date);
        cursor = date.next_day();
    }
    dates
}

fn days_before(date: Date, days: i64) -> Date {
    date.checked_sub(Duration::days(days)).unwrap_or(Date::MIN)
}
