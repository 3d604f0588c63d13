//! Shared fakes for the behavior tests: a scripted HTTP client and a
//! collecting record sink.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use coinfeed_core::{
    CoinCatalog, CoinEntry, CoinId, CoinRecord, HttpClient, HttpError, HttpRequest, HttpResponse,
    IngestConfig, RecordSink, SinkError,
};
use serde_json::json;

pub const UPSTREAM_URL: &str = "https://upstream.test/api/v3";
pub const BACKEND_URL: &str = "http://backend.test/api/v1/coins";

pub type Reply = Result<HttpResponse, HttpError>;

struct Route {
    pattern: String,
    queued: VecDeque<Reply>,
    sticky: Option<Reply>,
}

/// Replays canned replies by URL substring and records every request.
///
/// Routes are matched in registration order; a route first drains its queued
/// replies, then keeps answering with its sticky reply.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a one-shot reply for URLs containing `pattern`.
    pub fn then(self, pattern: &str, reply: Reply) -> Self {
        self.with_route(pattern, |route| route.queued.push_back(reply));
        self
    }

    /// Answers every later request containing `pattern` with `reply`.
    pub fn always(self, pattern: &str, reply: Reply) -> Self {
        self.with_route(pattern, |route| route.sticky = Some(reply));
        self
    }

    /// Answers `/coins/{id}` and its history with a detail body describing `id`,
    /// for each of `ids`.
    pub fn serving_details(self, ids: &[&str]) -> Self {
        ids.iter().fold(self, |client, id| {
            client.always(&format!("/coins/{id}"), ok(detail_body(id)))
        })
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn urls_containing(&self, pattern: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| request.url)
            .filter(|url| url.contains(pattern))
            .collect()
    }

    pub fn count(&self, pattern: &str) -> usize {
        self.urls_containing(pattern).len()
    }

    fn with_route(&self, pattern: &str, update: impl FnOnce(&mut Route)) {
        let mut routes = self.routes.lock().expect("routes poisoned");
        if let Some(route) = routes.iter_mut().find(|route| route.pattern == pattern) {
            update(route);
            return;
        }
        let mut route = Route {
            pattern: pattern.to_owned(),
            queued: VecDeque::new(),
            sticky: None,
        };
        update(&mut route);
        routes.push(route);
    }

    fn reply_for(&self, url: &str) -> Reply {
        let mut routes = self.routes.lock().expect("routes poisoned");
        let route = routes.iter_mut().find(|route| url.contains(&route.pattern));
        match route {
            Some(route) => route
                .queued
                .pop_front()
                .or_else(|| route.sticky.clone())
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "script exhausted"))),
            None => Ok(HttpResponse::new(404, "no route")),
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let reply = self.reply_for(&request.url);
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);
        Box::pin(async move { reply })
    }
}

/// Keeps every accepted record; optionally rejects them all.
#[derive(Default)]
pub struct CollectingSink {
    records: Mutex<Vec<CoinRecord>>,
    reject: bool,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sees every record but reports each delivery as failed.
    pub fn rejecting() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            reject: true,
        }
    }

    pub fn records(&self) -> Vec<CoinRecord> {
        self.records.lock().expect("sink poisoned").clone()
    }
}

impl RecordSink for CollectingSink {
    fn accept<'a>(
        &'a self,
        record: CoinRecord,
    ) -> Pin<Box<dyn Future<Output = Result<(), SinkError>> + Send + 'a>> {
        Box::pin(async move {
            self.records.lock().expect("sink poisoned").push(record);
            if self.reject {
                Err(SinkError::new("backend unavailable"))
            } else {
                Ok(())
            }
        })
    }
}

pub fn ok(body: impl Into<String>) -> Reply {
    Ok(HttpResponse::ok_json(body))
}

pub fn status(code: u16) -> Reply {
    Ok(HttpResponse::new(code, format!("status {code}")))
}

pub fn offline() -> Reply {
    Err(HttpError::connect("connection refused"))
}

pub fn coin(id: &str) -> CoinEntry {
    let coin_id = CoinId::parse(id).expect("valid coin id");
    CoinCatalog::default()
        .get(&coin_id)
        .cloned()
        .unwrap_or_else(|| CoinEntry::new(coin_id, id, id))
}

/// Fast config pointed at the test hosts, restricted to `coins`.
pub fn config_for(coins: &[&str]) -> IngestConfig {
    let ids: Vec<CoinId> = coins
        .iter()
        .map(|id| CoinId::parse(id).expect("valid coin id"))
        .collect();
    IngestConfig {
        upstream_url: String::from(UPSTREAM_URL),
        backend_url: String::from(BACKEND_URL),
        max_retries: 3,
        rate_limit_delay_ms: 0,
        backoff_step_ms: Some(1),
        coins: CoinCatalog::default()
            .restrict_to(&ids)
            .expect("coins are in the default catalog"),
        ..IngestConfig::default()
    }
}

/// Minimal detail-shape body, as served by `/coins/{id}` and `/history`.
pub fn detail_body(id: &str) -> String {
    json!({
        "id": id,
        "symbol": id.chars().take(3).collect::<String>(),
        "name": id,
        "market_data": {
            "current_price": {"eur": 42000, "usd": 50000, "btc": 1, "eth": 15.5},
            "market_cap": {"eur": 8.4e11, "usd": 9.4e11, "btc": 18800000, "eth": 291000000},
            "total_volume": {"eur": 2.1e10, "usd": 2.5e10, "btc": 500000, "eth": 7750000},
            "last_updated": "2021-09-10T20:14:06.165Z"
        },
        "community_data": {"twitter_followers": 5000000, "reddit_subscribers": 3900000},
        "developer_data": {"forks": 31000, "stars": 61000},
        "public_interest_stats": {"alexa_rank": 9440}
    })
    .to_string()
}

pub fn checkpoint_body(date: &str) -> String {
    json!({"success": true, "data": date, "message": "Last valid date retrieved successfully"})
        .to_string()
}
