use thiserror::Error;

/// Validation and contract errors exposed by `coinfeed-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("coin id cannot be empty")]
    EmptyCoinId,
    #[error("coin id length {len} exceeds max {max}")]
    CoinIdTooLong { len: usize, max: usize },
    #[error("coin id contains invalid character '{ch}' at index {index}")]
    CoinIdInvalidChar { ch: char, index: usize },
    #[error("coin id '{value}' has a leading, trailing or doubled hyphen")]
    CoinIdMisplacedHyphen { value: String },

    #[error("required field '{field}' is missing")]
    MissingField { field: &'static str },
    #[error("response has no entry for coin '{coin_id}'")]
    MissingCoinEntry { coin_id: String },
    #[error("response describes coin '{found}', expected '{expected}'")]
    CoinIdMismatch { expected: String, found: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("epoch seconds out of range: {value}")]
    EpochOutOfRange { value: i64 },
    #[error("date must be formatted as yyyy-MM-dd: '{value}'")]
    InvalidDate { value: String },

    #[error("lookback window must cover at least one day")]
    EmptyLookback,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Ingest(#[from] crate::orchestrator::IngestError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
