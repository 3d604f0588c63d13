//! # Coinfeed Core
//!
//! Market-data ingestion for a fixed catalog of CoinGecko coins.
//!
//! ## Overview
//!
//! - **Record builder**: turns either upstream response shape into one flat [`CoinRecord`]
//! - **Data source**: retried, rate-limited units of work behind the [`DataSource`] trait
//! - **Backend gateway**: record delivery and per-coin resumption checkpoints
//! - **Orchestrator**: current, resumed-history and fixed-window passes over the catalog
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | CoinGecko adapter (URLs, retry loop) |
//! | [`backend`] | Backend gateway (ingest POST, checkpoint GET) |
//! | [`config`] | Ingestion settings and the coin catalog |
//! | [`data_source`] | Data source trait, unit outcomes, date windows |
//! | [`domain`] | Domain models (CoinRecord, CoinId, UtcDateTime) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Defensive JSON field extraction |
//! | [`orchestrator`] | Ingestion passes |
//! | [`retry`] | Linear retry policy |
//! | [`throttling`] | Upstream rate limiter |
//! | [`transport`] | Status-aware GET/POST |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use coinfeed_core::{IngestConfig, Orchestrator, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = IngestConfig::default().with_env_overrides();
//!     config.validate()?;
//!
//!     let orchestrator = Orchestrator::from_config(Arc::new(ReqwestHttpClient::new()), &config);
//!     let summary = orchestrator.run_history().await?;
//!     println!("delivered {} records", summary.delivered);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Orchestrator   │────────────────────────────┐
//! └────────┬────────┘                            │ checkpoints
//!          │                                     ▼
//!          ▼                            ┌──────────────────┐
//! ┌─────────────────┐                   │ Backend Gateway  │
//! │ Data Source     │──── records ─────▶│ (RecordSink)     │
//! │ (CoinGecko)     │                   └──────────────────┘
//! └────────┬────────┘
//!          │ retry + rate limit
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Transport       │────▶│ HTTP Client      │
//! └────────┬────────┘     │ (reqwest)        │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ Normalizer +    │
//! │ Record Builder  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Unit-level faults never escape a pass; they are logged and counted in the
//! returned [`PassSummary`]. Only a checkpoint read failure aborts a pass:
//!
//! ```rust
//! use coinfeed_core::IngestError;
//!
//! fn report(error: &IngestError) -> String {
//!     match error {
//!         IngestError::Checkpoint { source, completed } => {
//!             format!("stopped at {} after {} units", source.coin_id(), completed.units())
//!         }
//!         IngestError::Validation(error) => error.to_string(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - The upstream API key is read from configuration or `COINGECKO_API_KEY` and never logged

pub mod adapters;
pub mod backend;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod orchestrator;
pub mod retry;
pub mod throttling;
pub mod transport;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::CoinGeckoAdapter;

// Backend gateway
pub use backend::{BackendGateway, GatewayError};

// Configuration
pub use config::{CoinCatalog, CoinEntry, ConfigError, CurrentEndpoint, IngestConfig};

// Data source trait and types
pub use data_source::{
    start_date, window_dates, CheckpointSource, DataSource, FetchError, PassSummary, RecordSink,
    SinkError, UnitOutcome, UnitTarget,
};

// Domain models
pub use domain::{CoinId, CoinRecord, UtcDateTime};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpMethod, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Orchestration
pub use orchestrator::{IngestError, Orchestrator};

// Retry logic
pub use retry::RetryConfig;

// Throttling
pub use throttling::RateLimiter;

// Transport
pub use transport::{Transport, TransportError};
