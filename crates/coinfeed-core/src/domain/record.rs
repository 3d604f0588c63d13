use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;

use crate::normalize::{decimal, integer, section, text};
use crate::{CoinId, UtcDateTime, ValidationError};

const QUOTE_CURRENCIES: [&str; 4] = ["eur", "usd", "btc", "eth"];

/// Canonical normalized snapshot of one coin, as posted to the ingestion backend.
///
/// Built once from a single upstream response by [`CoinRecord::from_simple_price`]
/// or [`CoinRecord::from_coin_detail`], sent once, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRecord {
    pub coin_id: CoinId,
    pub coin_name: String,
    pub symbol: String,
    pub timestamp: UtcDateTime,

    pub price_eur: Decimal,
    pub price_usd: Decimal,
    pub price_btc: Decimal,
    pub price_eth: Decimal,

    pub market_cap_eur: Decimal,
    pub market_cap_usd: Decimal,
    pub market_cap_btc: Decimal,
    pub market_cap_eth: Decimal,

    pub total_volume_eur: Decimal,
    pub total_volume_usd: Decimal,
    pub total_volume_btc: Decimal,
    pub total_volume_eth: Decimal,

    pub twitter_followers: i64,
    pub reddit_avg_posts_48_hours: Decimal,
    pub reddit_avg_comments_48_hours: Decimal,
    pub reddit_subscribers: i64,
    pub reddit_accounts_active_48_hours: Decimal,

    pub dev_forks: i64,
    pub dev_stars: i64,
    pub dev_total_issues: i64,
    pub dev_closed_issues: i64,
    pub dev_pull_requests_merged: i64,
    pub dev_pull_request_contributors: i64,
    pub dev_commit_count_4_weeks: i64,
    pub dev_code_additions_4_weeks: i64,
    pub dev_code_deletions_4_weeks: i64,

    pub public_alexa_rank: i64,
}

/// One value per quote currency, in `eur, usd, btc, eth` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Quartet([Decimal; 4]);

impl Quartet {
    /// Reads `eur`, `usd`, ... from a nested detail section such as `current_price`.
    fn from_section(node: Option<&Value>) -> Self {
        let Some(node) = node else {
            return Self::default();
        };
        Self(QUOTE_CURRENCIES.map(|currency| decimal(node, currency)))
    }

    /// Reads `eur{suffix}`, `usd{suffix}`, ... from a flat simple-price entry.
    fn from_flat(node: &Value, suffix: &str) -> Self {
        Self(QUOTE_CURRENCIES.map(|currency| decimal(node, &format!("{currency}{suffix}"))))
    }
}

impl CoinRecord {
    fn empty(coin_id: CoinId, coin_name: String, symbol: String, timestamp: UtcDateTime) -> Self {
        Self {
            coin_id,
            coin_name,
            symbol,
            timestamp,
            price_eur: Decimal::ZERO,
            price_usd: Decimal::ZERO,
            price_btc: Decimal::ZERO,
            price_eth: Decimal::ZERO,
            market_cap_eur: Decimal::ZERO,
            market_cap_usd: Decimal::ZERO,
            market_cap_btc: Decimal::ZERO,
            market_cap_eth: Decimal::ZERO,
            total_volume_eur: Decimal::ZERO,
            total_volume_usd: Decimal::ZERO,
            total_volume_btc: Decimal::ZERO,
            total_volume_eth: Decimal::ZERO,
            twitter_followers: 0,
            reddit_avg_posts_48_hours: Decimal::ZERO,
            reddit_avg_comments_48_hours: Decimal::ZERO,
            reddit_subscribers: 0,
            reddit_accounts_active_48_hours: Decimal::ZERO,
            dev_forks: 0,
            dev_stars: 0,
            dev_total_issues: 0,
            dev_closed_issues: 0,
            dev_pull_requests_merged: 0,
            dev_pull_request_contributors: 0,
            dev_commit_count_4_weeks: 0,
            dev_code_additions_4_weeks: 0,
            dev_code_deletions_4_weeks: 0,
            public_alexa_rank: 0,
        }
    }

    /// Builds a record from a compact `/simple/price` response keyed by coin id.
    ///
    /// The compact shape carries no name or symbol, so both come from the caller.
    ///
    /// # Errors
    ///
    /// Fails when the response has no entry for `coin_id` or the entry lacks a
    /// usable `last_updated_at`.
    pub fn from_simple_price(
        coin_id: &CoinId,
        coin_name: &str,
        symbol: &str,
        document: &Value,
    ) -> Result<Self, ValidationError> {
        let entry = section(document, coin_id.as_str()).ok_or_else(|| {
            ValidationError::MissingCoinEntry {
                coin_id: coin_id.to_string(),
            }
        })?;

        let last_updated_at = entry
            .get("last_updated_at")
            .and_then(Value::as_i64)
            .ok_or(ValidationError::MissingField {
                field: "last_updated_at",
            })?;
        let timestamp = UtcDateTime::from_unix_seconds(last_updated_at)?;

        let mut record = Self::empty(
            coin_id.clone(),
            coin_name.to_owned(),
            symbol.to_owned(),
            timestamp,
        );
        record.set_prices(Quartet::from_flat(entry, ""));
        record.set_market_caps(Quartet::from_flat(entry, "_market_cap"));
        record.set_total_volumes(Quartet::from_flat(entry, "_24h_vol"));

        Ok(record)
    }

    /// Builds a record from a `/coins/{id}` or `/coins/{id}/history` detail response.
    ///
    /// With `observed_on` set the timestamp is midnight UTC of that date (history
    /// requests); otherwise it is `market_data.last_updated`. Missing
    /// `market_data`, `community_data`, `developer_data` or
    /// `public_interest_stats` sections leave their fields at zero.
    ///
    /// # Errors
    ///
    /// Fails when `id` is absent or invalid, or when no timestamp can be derived.
    pub fn from_coin_detail(
        document: &Value,
        observed_on: Option<Date>,
    ) -> Result<Self, ValidationError> {
        let raw_id = text(document, "id");
        if raw_id.is_empty() {
            return Err(ValidationError::MissingField { field: "id" });
        }
        let coin_id = CoinId::parse(&raw_id)?;

        let market_data = section(document, "market_data");
        let timestamp = match observed_on {
            Some(date) => UtcDateTime::at_midnight(date),
            None => {
                let last_updated = market_data
                    .map(|node| text(node, "last_updated"))
                    .unwrap_or_default();
                if last_updated.is_empty() {
                    return Err(ValidationError::MissingField {
                        field: "market_data.last_updated",
                    });
                }
                UtcDateTime::parse(&last_updated)?
            }
        };

        let mut record = Self::empty(
            coin_id,
            text(document, "name"),
            text(document, "symbol"),
            timestamp,
        );

        if let Some(market_data) = market_data {
            record.set_prices(Quartet::from_section(section(market_data, "current_price")));
            record.set_market_caps(Quartet::from_section(section(market_data, "market_cap")));
            record.set_total_volumes(Quartet::from_section(section(market_data, "total_volume")));
        }

        if let Some(community) = section(document, "community_data") {
            record.twitter_followers = integer(community, "twitter_followers");
            record.reddit_avg_posts_48_hours = decimal(community, "reddit_average_posts_48h");
            record.reddit_avg_comments_48_hours =
                decimal(community, "reddit_average_comments_48h");
            record.reddit_subscribers = integer(community, "reddit_subscribers");
            record.reddit_accounts_active_48_hours =
                decimal(community, "reddit_accounts_active_48h");
        }

        if let Some(developer) = section(document, "developer_data") {
            record.dev_forks = integer(developer, "forks");
            record.dev_stars = integer(developer, "stars");
            record.dev_total_issues = integer(developer, "total_issues");
            record.dev_closed_issues = integer(developer, "closed_issues");
            record.dev_pull_requests_merged = integer(developer, "pull_requests_merged");
            record.dev_pull_request_contributors = integer(developer, "pull_request_contributors");
            record.dev_commit_count_4_weeks = integer(developer, "commit_count_4_weeks");

            if let Some(churn) = section(developer, "code_additions_deletions_4_weeks") {
                record.dev_code_additions_4_weeks = integer(churn, "additions");
                record.dev_code_deletions_4_weeks = integer(churn, "deletions");
            }
        }

        if let Some(interest) = section(document, "public_interest_stats") {
            record.public_alexa_rank = integer(interest, "alexa_rank");
        }

        Ok(record)
    }

    fn set_prices(&mut self, Quartet([eur, usd, btc, eth]): Quartet) {
        self.price_eur = eur;
        self.price_usd = usd;
        self.price_btc = btc;
        self.price_eth = eth;
    }

    fn set_market_caps(&mut self, Quartet([eur, usd, btc, eth]): Quartet) {
        self.market_cap_eur = eur;
        self.market_cap_usd = usd;
        self.market_cap_btc = btc;
        self.market_cap_eth = eth;
    }

    fn set_total_volumes(&mut self, Quartet([eur, usd, btc, eth]): Quartet) {
        self.total_volume_eur = eur;
        self.total_volume_usd = usd;
        self.total_volume_btc = btc;
        self.total_volume_eth = eth;
    }
}
