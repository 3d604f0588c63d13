//! Status-aware GET/POST on top of an [`HttpClient`].
//!
//! A status in `[200, 300)` is success; everything else, including connection
//! faults, becomes a [`TransportError`]. Nothing is retried here: the caller
//! owns the retry policy because only it knows what a 401 or 403 means for
//! the request it made.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::http_client::{HttpAuth, HttpClient, HttpErrorKind, HttpRequest, HttpResponse};

const JSON: &str = "application/json";

/// Failure of a single HTTP exchange.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("{url} timed out: {message}")]
    Timeout { url: String, message: String },
    #[error("{url} unreachable: {message}")]
    Network { url: String, message: String },
}

impl TransportError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::Network { .. } => None,
        }
    }

    /// 401 or 403: the caller lacks access to the resource.
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// Shared HTTP transport with a per-request timeout and optional auth.
#[derive(Clone)]
pub struct Transport {
    client: Arc<dyn HttpClient>,
    timeout: Duration,
    auth: HttpAuth,
}

impl Transport {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            timeout: Duration::from_millis(crate::config::DEFAULT_REQUEST_TIMEOUT_MS),
            auth: HttpAuth::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    /// GETs `url` and returns the body of a 2xx response.
    pub async fn get(&self, url: &str) -> Result<String, TransportError> {
        let request = HttpRequest::get(url).with_header("accept", JSON);
        self.execute(request).await.map(|response| response.body)
    }

    /// POSTs a JSON `body` to `url` and returns the 2xx response.
    pub async fn post(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        let request = HttpRequest::post(url, body)
            .with_header("accept", JSON)
            .with_header("content-type", JSON);
        self.execute(request).await
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.clone();
        let request = request.with_auth(&self.auth).with_timeout(self.timeout);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|error| match error.kind() {
                HttpErrorKind::Timeout => TransportError::Timeout {
                    url: url.clone(),
                    message: error.message().to_owned(),
                },
                _ => TransportError::Network {
                    url: url.clone(),
                    message: error.message().to_owned(),
                },
            })?;

        if response.is_success() {
            return Ok(response);
        }

        debug!(%url, status = response.status, body = %response.body, "non-success response");
        Err(TransportError::Status {
            url,
            status: response.status,
            body: response.body,
        })
    }
}
