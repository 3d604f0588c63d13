//! Client for the ingestion backend.
//!
//! The backend exposes two endpoints:
//!
//! | Call | Request | Failure handling |
//! |------|---------|------------------|
//! | Ingest | `POST {backend}` with one record | logged, never propagated |
//! | Checkpoint | `GET {backend}/{coin}/lastValidDate` | propagated as [`GatewayError`] |
//!
//! A checkpoint envelope looks like
//! `{"success":true,"data":"2023-05-01","message":"..."}`. A missing, null or
//! unparseable `data` means "no checkpoint".

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::{debug, error, info, warn};

use crate::config::CoinCatalog;
use crate::data_source::{CheckpointSource, RecordSink, SinkError};
use crate::domain::{parse_iso_date, CoinId, CoinRecord};
use crate::normalize;
use crate::transport::{Transport, TransportError};

/// Checkpoint query failure. Stops the resumed-history pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("checkpoint query for '{coin_id}' failed: {source}")]
    Transport {
        coin_id: CoinId,
        #[source]
        source: TransportError,
    },
    #[error("checkpoint response for '{coin_id}' is not JSON: {message}")]
    Envelope { coin_id: CoinId, message: String },
}

impl GatewayError {
    pub fn coin_id(&self) -> &CoinId {
        match self {
            Self::Transport { coin_id, .. } | Self::Envelope { coin_id, .. } => coin_id,
        }
    }
}

#[derive(Clone)]
pub struct BackendGateway {
    transport: Transport,
    base_url: String,
}

impl BackendGateway {
    pub fn new(transport: Transport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn checkpoint_url(&self, coin_id: &CoinId) -> String {
        format!(
            "{}/{}/lastValidDate",
            self.base_url,
            urlencoding::encode(coin_id.as_str())
        )
    }

    /// Posts `record` and logs the result. Never fails.
    pub async fn send(&self, record: &CoinRecord) {
        if let Err(error) = self.deliver(record).await {
            error!(coin = %record.coin_id, %error, "record not delivered to the backend");
        }
    }

    /// Posts `record`, reporting a serialization or HTTP failure to the caller.
    pub async fn deliver(&self, record: &CoinRecord) -> Result<(), SinkError> {
        let body = serde_json::to_string(record)
            .map_err(|error| SinkError::new(format!("could not serialize record: {error}")))?;
        debug!(coin = %record.coin_id, %body, "posting record");

        let response = self
            .transport
            .post(&self.base_url, body)
            .await
            .map_err(|error| SinkError::new(error.to_string()))?;

        info!(
            coin = %record.coin_id,
            timestamp = %record.timestamp,
            status = response.status,
            "record accepted by the backend"
        );
        Ok(())
    }

    /// Last date the backend already holds for `coin_id`.
    pub async fn last_valid_date(&self, coin_id: &CoinId) -> Result<Option<Date>, GatewayError> {
        let url = self.checkpoint_url(coin_id);
        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|source| {
                error!(coin = %coin_id, error = %source, "checkpoint query failed");
                GatewayError::Transport {
                    coin_id: coin_id.clone(),
                    source,
                }
            })?;

        let envelope = normalize::parse_document(&body).map_err(|error| GatewayError::Envelope {
            coin_id: coin_id.clone(),
            message: error.to_string(),
        })?;

        Ok(checkpoint_from_envelope(coin_id, &envelope))
    }

    /// Checkpoints for every catalog coin that has one, in catalog order.
    ///
    /// The first failing query aborts the whole lookup.
    pub async fn last_valid_dates(
        &self,
        catalog: &CoinCatalog,
    ) -> Result<BTreeMap<CoinId, Date>, GatewayError> {
        let mut checkpoints = BTreeMap::new();
        for coin_id in catalog.ids() {
            if let Some(date) = self.last_valid_date(coin_id).await? {
                checkpoints.insert(coin_id.clone(), date);
            }
        }
        Ok(checkpoints)
    }
}

fn checkpoint_from_envelope(coin_id: &CoinId, envelope: &Value) -> Option<Date> {
    let raw = match envelope.get("data") {
        Some(Value::Null) | None => {
            info!(coin = %coin_id, "backend has no checkpoint");
            return None;
        }
        Some(_) => normalize::text(envelope, "data"),
    };

    match parse_iso_date(&raw) {
        Ok(date) => {
            info!(coin = %coin_id, checkpoint = %date, "checkpoint loaded");
            Some(date)
        }
        Err(error) => {
            warn!(coin = %coin_id, value = %raw, %error, "ignoring malformed checkpoint date");
            None
        }
    }
}

impl RecordSink for BackendGateway {
    fn accept<'a>(
        &'a self,
        record: CoinRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>> {
        Box::pin(async move { self.deliver(&record).await })
    }
}

impl CheckpointSource for BackendGateway {
    fn last_valid_date<'a>(
        &'a self,
        coin_id: &'a CoinId,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Date>, GatewayError>> + Send + 'a>> {
        Box::pin(async move { BackendGateway::last_valid_date(self, coin_id).await })
    }
}
