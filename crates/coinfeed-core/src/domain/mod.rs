//! # Domain Models
//!
//! Canonical domain types for coinfeed.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CoinRecord`] | Flat, normalized coin snapshot posted to the backend |
//! | [`CoinId`] | Validated upstream coin identifier |
//! | [`UtcDateTime`] | UTC observation instant |
//!
//! Records are built from upstream JSON through two named constructors, one per
//! response shape:
//!
//! ```rust,ignore
//! use coinfeed_core::{CoinId, CoinRecord};
//!
//! let body = serde_json::json!({"bitcoin": {"usd": 50000, "last_updated_at": 1631304846}});
//! let id = CoinId::parse("bitcoin")?;
//! let record = CoinRecord::from_simple_price(&id, "Bitcoin", "btc", &body)?;
//! assert_eq!(record.price_usd, 50000.into());
//! ```

mod coin_id;
mod record;
mod timestamp;

pub use coin_id::CoinId;
pub use record::CoinRecord;
pub use timestamp::{format_history_date, parse_iso_date, UtcDateTime};
