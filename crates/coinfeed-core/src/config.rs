//! Ingestion configuration and the tracked coin catalog.
//!
//! Configuration is an immutable value: build it once (defaults, optional JSON
//! file, environment overrides), validate it, then hand clones to the adapter,
//! gateway and orchestrator.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CoinId;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api/v1/coins";
pub const DEFAULT_MAX_RETRIES: u32 = 10;
pub const DEFAULT_RATE_LIMIT_DELAY_MS: u64 = 5_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub const ENV_UPSTREAM_URL: &str = "COINFEED_UPSTREAM_URL";
pub const ENV_BACKEND_URL: &str = "COINFEED_BACKEND_URL";
pub const ENV_API_KEY: &str = "COINGECKO_API_KEY";

/// Configuration load and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{field}' must not be empty")]
    EmptyValue { field: &'static str },
    #[error("max_retries must be at least 1")]
    ZeroRetries,
    #[error("coin catalog must contain at least one coin")]
    EmptyCatalog,
    #[error("coin '{coin_id}' appears more than once in the catalog")]
    DuplicateCoin { coin_id: String },
    #[error("coin '{coin_id}' is not in the catalog")]
    UnknownCoin { coin_id: String },
}

/// Which upstream endpoint serves the current-data pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentEndpoint {
    /// `GET /coins/{id}`, nested detail shape.
    #[default]
    Detail,
    /// `GET /simple/price?ids={id}...`, compact shape keyed by coin id.
    SimplePrice,
}

/// One tracked coin. Name and symbol are only needed by the compact endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinEntry {
    pub id: CoinId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

impl CoinEntry {
    pub fn new(id: CoinId, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Ordered, read-only set of tracked coins; the iteration universe of every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinCatalog {
    entries: Vec<CoinEntry>,
}

const DEFAULT_COINS: [(&str, &str, &str); 24] = [
    ("bitcoin", "Bitcoin", "btc"),
    ("ethereum", "Ethereum", "eth"),
    ("cardano", "Cardano", "ada"),
    ("polkadot", "Polkadot", "dot"),
    ("chainlink", "Chainlink", "link"),
    ("stellar", "Stellar", "xlm"),
    ("zcash", "Zcash", "zec"),
    ("algorand", "Algorand", "algo"),
    ("bitcoin-diamond", "Bitcoin Diamond", "bcd"),
    ("litecoin", "Litecoin", "ltc"),
    ("compound-ether", "cETH", "ceth"),
    ("compound-coin", "Compound Coin", "comp"),
    ("bzx-protocol", "bZx Protocol", "bzrx"),
    ("band-protocol", "Band Protocol", "band"),
    ("ampleforth", "Ampleforth", "ampl"),
    ("zilliqa", "Zilliqa", "zil"),
    ("vechain", "VeChain", "vet"),
    ("waves", "Waves", "waves"),
    ("uma", "UMA", "uma"),
    ("ocean-protocol", "Ocean Protocol", "ocean"),
    ("theta-token", "Theta Network", "theta"),
    ("singularitynet", "SingularityNET", "agix"),
    ("thorchain", "THORChain", "rune"),
    ("kava", "Kava", "kava"),
];

impl CoinCatalog {
    pub fn new(entries: Vec<CoinEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::DuplicateCoin {
                    coin_id: entry.id.to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CoinEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &CoinId> {
        self.entries.iter().map(|entry| &entry.id)
    }

    pub fn get(&self, id: &CoinId) -> Option<&CoinEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps only the listed coins, in catalog order.
    pub fn restrict_to(&self, ids: &[CoinId]) -> Result<Self, ConfigError> {
        if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
            return Err(ConfigError::UnknownCoin {
                coin_id: unknown.to_string(),
            });
        }

        Self::new(
            self.entries
                .iter()
                .filter(|entry| ids.contains(&entry.id))
                .cloned()
                .collect(),
        )
    }
}

impl Default for CoinCatalog {
    fn default() -> Self {
        let entries = DEFAULT_COINS
            .iter()
            .filter_map(|(id, name, symbol)| {
                CoinId::parse(id)
                    .ok()
                    .map(|id| CoinEntry::new(id, *name, *symbol))
            })
            .collect();
        Self { entries }
    }
}

/// Static settings for one ingestion process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub upstream_url: String,
    pub backend_url: String,
    /// Attempts per unit of work, including the first one.
    pub max_retries: u32,
    /// Minimum spacing between consecutive units against the upstream.
    pub rate_limit_delay_ms: u64,
    /// Linear backoff step: attempt `n` (0-based) waits `step * (n + 1)`.
    /// Unset means the rate-limit delay.
    pub backoff_step_ms: Option<u64>,
    pub request_timeout_ms: u64,
    /// Optional provider-wide ceiling, enforced in addition to the spacing.
    pub upstream_calls_per_minute: Option<u32>,
    pub current_endpoint: CurrentEndpoint,
    pub api_key: Option<String>,
    pub api_key_header: String,
    pub coins: CoinCatalog,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upstream_url: String::from(DEFAULT_UPSTREAM_URL),
            backend_url: String::from(DEFAULT_BACKEND_URL),
            max_retries: DEFAULT_MAX_RETRIES,
            rate_limit_delay_ms: DEFAULT_RATE_LIMIT_DELAY_MS,
            backoff_step_ms: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            upstream_calls_per_minute: None,
            current_endpoint: CurrentEndpoint::default(),
            api_key: None,
            api_key_header: String::from(DEFAULT_API_KEY_HEADER),
            coins: CoinCatalog::default(),
        }
    }
}

impl IngestConfig {
    /// Reads a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Applies `COINFEED_UPSTREAM_URL`, `COINFEED_BACKEND_URL` and `COINGECKO_API_KEY`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(ENV_UPSTREAM_URL) {
            self.upstream_url = url;
        }
        if let Some(url) = non_empty(ENV_BACKEND_URL) {
            self.backend_url = url;
        }
        if let Some(key) = non_empty(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                field: "upstream_url",
            });
        }
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                field: "backend_url",
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        CoinCatalog::new(self.coins.entries().to_vec()).map(|_| ())
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms.unwrap_or(self.rate_limit_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
