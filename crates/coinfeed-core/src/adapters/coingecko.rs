use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{CoinEntry, CurrentEndpoint, IngestConfig, DEFAULT_UPSTREAM_URL};
use crate::data_source::{DataSource, FetchError, RecordSink, UnitOutcome, UnitTarget};
use crate::domain::{format_history_date, CoinRecord};
use crate::error::ValidationError;
use crate::http_client::{HttpAuth, HttpClient};
use crate::normalize;
use crate::retry::RetryConfig;
use crate::throttling::RateLimiter;
use crate::transport::Transport;

const VS_CURRENCIES: &str = "eur,btc,eth,usd";

/// CoinGecko v3 adapter.
///
/// Owns the retry loop around transport, parsing and record building, and the
/// single rate limiter shared by every unit it runs.
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    transport: Transport,
    base_url: String,
    current_endpoint: CurrentEndpoint,
    retry: RetryConfig,
    limiter: RateLimiter,
}

impl CoinGeckoAdapter {
    pub fn new(transport: Transport, limiter: RateLimiter) -> Self {
        Self {
            transport,
            base_url: String::from(DEFAULT_UPSTREAM_URL),
            current_endpoint: CurrentEndpoint::default(),
            retry: RetryConfig::default(),
            limiter,
        }
    }

    /// Builds the adapter the way the ingestion process runs it.
    pub fn from_config(http_client: Arc<dyn HttpClient>, config: &IngestConfig) -> Self {
        let auth = match &config.api_key {
            Some(key) => HttpAuth::api_key(config.api_key_header.as_str(), key.as_str()),
            None => HttpAuth::None,
        };
        let transport = Transport::new(http_client)
            .with_timeout(config.request_timeout())
            .with_auth(auth);

        let mut limiter = RateLimiter::new(config.rate_limit_delay());
        if let Some(calls_per_minute) = config.upstream_calls_per_minute {
            limiter = limiter.with_ceiling_per_minute(calls_per_minute);
        }

        Self::new(transport, limiter)
            .with_base_url(&config.upstream_url)
            .with_current_endpoint(config.current_endpoint)
            .with_retry(RetryConfig::from_config(config))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_owned();
        self
    }

    pub fn with_current_endpoint(mut self, endpoint: CurrentEndpoint) -> Self {
        self.current_endpoint = endpoint;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry(&self) -> RetryConfig {
        self.retry
    }

    /// Upstream URL for `target`.
    pub fn url_for(&self, coin: &CoinEntry, target: UnitTarget) -> String {
        let id = urlencoding::encode(coin.id.as_str());
        match (target, self.current_endpoint) {
            (UnitTarget::Current, CurrentEndpoint::Detail) => {
                format!("{}/coins/{id}", self.base_url)
            }
            (UnitTarget::Current, CurrentEndpoint::SimplePrice) => format!(
                "{}/simple/price?ids={id}&vs_currencies={VS_CURRENCIES}\
                 &include_market_cap=true&include_24hr_vol=true&include_last_updated_at=true",
                self.base_url
            ),
            (UnitTarget::Historical(date), _) => format!(
                "{}/coins/{id}/history?date={}",
                self.base_url,
                format_history_date(date)
            ),
        }
    }

    async fn attempt(
        &self,
        url: &str,
        coin: &CoinEntry,
        target: UnitTarget,
    ) -> Result<CoinRecord, FetchError> {
        let body = self.transport.get(url).await?;
        let document = normalize::parse_document(&body)?;
        let record = self.build(coin, target, &document)?;
        Ok(record)
    }

    fn build(
        &self,
        coin: &CoinEntry,
        target: UnitTarget,
        document: &serde_json::Value,
    ) -> Result<CoinRecord, ValidationError> {
        let record = match (target, self.current_endpoint) {
            (UnitTarget::Current, CurrentEndpoint::SimplePrice) => {
                return CoinRecord::from_simple_price(&coin.id, &coin.name, &coin.symbol, document);
            }
            (UnitTarget::Current, CurrentEndpoint::Detail) => {
                CoinRecord::from_coin_detail(document, None)?
            }
            (UnitTarget::Historical(date), _) => {
                CoinRecord::from_coin_detail(document, Some(date))?
            }
        };

        if record.coin_id != coin.id {
            return Err(ValidationError::CoinIdMismatch {
                expected: coin.id.to_string(),
                found: record.coin_id.to_string(),
            });
        }
        Ok(record)
    }

    async fn run_unit(
        &self,
        coin: &CoinEntry,
        target: UnitTarget,
        sink: &dyn RecordSink,
    ) -> UnitOutcome {
        let url = self.url_for(coin, target);
        let attempts = self.retry.attempts();

        for attempt in 0..attempts {
            match self.attempt(&url, coin, target).await {
                Ok(record) => {
                    return match sink.accept(record).await {
                        Ok(()) => {
                            info!(
                                coin = %coin.id,
                                unit = %target,
                                attempt = attempt + 1,
                                "unit delivered"
                            );
                            UnitOutcome::Delivered
                        }
                        Err(error) => {
                            error!(
                                coin = %coin.id,
                                unit = %target,
                                %error,
                                "sink rejected record"
                            );
                            UnitOutcome::SinkFailed
                        }
                    };
                }
                Err(error) if target.is_historical() && error.is_permission_denied() => {
                    warn!(
                        coin = %coin.id,
                        unit = %target,
                        %error,
                        "no access to this historical date; skipping"
                    );
                    return UnitOutcome::PermissionDenied;
                }
                Err(FetchError::Build(error)) => {
                    warn!(
                        coin = %coin.id,
                        unit = %target,
                        %error,
                        "response cannot be built into a record; skipping"
                    );
                    return UnitOutcome::Unusable;
                }
                Err(error) if self.retry.is_last_attempt(attempt) => {
                    error!(coin = %coin.id, unit = %target, attempts, %error, "retries exhausted");
                    return UnitOutcome::Exhausted { attempts };
                }
                Err(error) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(
                        coin = %coin.id,
                        unit = %target,
                        attempt = attempt + 1,
                        attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        %error,
                        "attempt failed; backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        UnitOutcome::Exhausted { attempts }
    }
}

impl DataSource for CoinGeckoAdapter {
    fn fetch_unit<'a>(
        &'a self,
        coin: &'a CoinEntry,
        target: UnitTarget,
        sink: &'a dyn RecordSink,
    ) -> Pin<Box<dyn Future<Output = UnitOutcome> + Send + 'a>> {
        Box::pin(self.run_unit(coin, target, sink))
    }

    fn pace<'a>(&'a self) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(self.limiter.acquire())
    }
}
