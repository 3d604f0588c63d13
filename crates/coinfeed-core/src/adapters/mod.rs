//! Upstream provider adapters.

mod coingecko;

pub use coingecko::CoinGeckoAdapter;
