//! Ingestion passes over the coin catalog.
//!
//! One coin at a time, one unit at a time. A pass never stops because of a
//! single unit; only a failed checkpoint read ends the resumed-history pass
//! early, since guessing "no checkpoint" would replay a full year.

use std::sync::Arc;

use thiserror::Error;
use time::{Date, OffsetDateTime};
use tracing::{error, info};

use crate::adapters::CoinGeckoAdapter;
use crate::backend::{BackendGateway, GatewayError};
use crate::config::{CoinCatalog, IngestConfig};
use crate::data_source::{CheckpointSource, DataSource, PassSummary, RecordSink};
use crate::error::ValidationError;
use crate::http_client::HttpClient;
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Units already finished before the fault are reported in `completed`.
    #[error("history pass aborted: {source}")]
    Checkpoint {
        #[source]
        source: GatewayError,
        completed: PassSummary,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

type Clock = Arc<dyn Fn() -> Date + Send + Sync>;

/// Drives a [`DataSource`] over every catalog coin.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn DataSource>,
    sink: Arc<dyn RecordSink>,
    checkpoints: Arc<dyn CheckpointSource>,
    coins: CoinCatalog,
    clock: Clock,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn DataSource>,
        sink: Arc<dyn RecordSink>,
        checkpoints: Arc<dyn CheckpointSource>,
        coins: CoinCatalog,
    ) -> Self {
        Self {
            source,
            sink,
            checkpoints,
            coins,
            clock: Arc::new(|| OffsetDateTime::now_utc().date()),
        }
    }

    /// CoinGecko upstream and the HTTP backend, both over `http_client`.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &IngestConfig) -> Self {
        let source = Arc::new(CoinGeckoAdapter::from_config(http_client.clone(), config));
        let gateway = Arc::new(BackendGateway::new(
            Transport::new(http_client).with_timeout(config.request_timeout()),
            &config.backend_url,
        ));

        Self::new(source, gateway.clone(), gateway, config.coins.clone())
    }

    /// Replaces the UTC wall-clock date used as "today".
    pub fn with_clock(mut self, clock: impl Fn() -> Date + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn coins(&self) -> &CoinCatalog {
        &self.coins
    }

    pub fn today(&self) -> Date {
        (self.clock)()
    }

    /// One current snapshot per coin.
    pub async fn run_current(&self) -> PassSummary {
        info!(coins = self.coins.len(), "current pass started");
        let mut summary = PassSummary::default();
        for coin in self.coins.entries() {
            summary.record(self.source.current(coin, self.sink.as_ref()).await);
        }
        log_summary("current", &summary);
        summary
    }

    /// Resumes every coin from its backend checkpoint through today.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Checkpoint`] on the first checkpoint read that
    /// fails; remaining coins are not visited.
    pub async fn run_history(&self) -> Result<PassSummary, IngestError> {
        let today = self.today();
        info!(coins = self.coins.len(), %today, "history pass started");

        let mut summary = PassSummary::default();
        for coin in self.coins.entries() {
            let checkpoint = match self.checkpoints.last_valid_date(&coin.id).await {
                Ok(checkpoint) => checkpoint,
                Err(source) => {
                    error!(
                        coin = %coin.id,
                        error = %source,
                        "checkpoint unavailable; aborting pass"
                    );
                    log_summary("history", &summary);
                    return Err(IngestError::Checkpoint {
                        source,
                        completed: summary,
                    });
                }
            };

            let coin_summary = self
                .source
                .history_since(coin, checkpoint, today, self.sink.as_ref())
                .await;
            summary.merge(coin_summary);
        }

        log_summary("history", &summary);
        Ok(summary)
    }

    /// Fetches the last `days` days (today included) for every coin.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLookback`] when `days` is zero.
    pub async fn run_backfill(&self, days: u32) -> Result<PassSummary, IngestError> {
        if days == 0 {
            return Err(ValidationError::EmptyLookback.into());
        }
        let today = self.today();
        info!(coins = self.coins.len(), days, %today, "backfill pass started");

        let mut summary = PassSummary::default();
        for coin in self.coins.entries() {
            let coin_summary = self
                .source
                .history_window(coin, days, today, self.sink.as_ref())
                .await;
            summary.merge(coin_summary);
        }

        log_summary("backfill", &summary);
        Ok(summary)
    }
}

fn log_summary(pass: &'static str, summary: &PassSummary) {
    info!(
        pass,
        delivered = summary.delivered,
        sink_failed = summary.sink_failed,
        permission_denied = summary.permission_denied,
        unusable = summary.unusable,
        exhausted = summary.exhausted,
        "pass finished"
    );
}
