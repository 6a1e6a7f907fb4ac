// =============================================================================
// Candle Source — cached kline retrieval
// =============================================================================
//
// Sits between the API layer and the Binance client. Fetches are memoized in
// a TTL cache keyed by (symbol, interval); a cached window is served only
// when it holds at least as many bars as the request asks for, otherwise the
// source refetches and overwrites the entry.

use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::binance::BinanceClient;
use crate::cache::TtlCache;
use crate::types::{Candle, CandleKey};

pub struct CandleSource {
    client: BinanceClient,
    cache: TtlCache<CandleKey, Vec<Candle>>,
}

impl CandleSource {
    pub fn new(client: BinanceClient, ttl: Duration) -> Self {
        Self {
            client,
            cache: TtlCache::new(ttl),
        }
    }

    /// Return the most recent `count` candles for (symbol, interval),
    /// oldest first.
    ///
    /// Serves the tail of a cached window when it is long enough; otherwise
    /// hits Binance and refreshes the cache. Binance may return fewer bars
    /// than asked for on young symbols — the caller gets whatever exists.
    pub async fn get(&self, symbol: &str, interval: &str, count: usize) -> Result<Vec<Candle>> {
        let key = CandleKey {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
        };

        if let Some(cached) = self.cache.get(&key) {
            if cached.len() >= count {
                debug!(key = %key, count, cached = cached.len(), "serving klines from cache");
                return Ok(cached[cached.len() - count..].to_vec());
            }
            debug!(key = %key, count, cached = cached.len(), "cached window too short — refetching");
        }

        let candles = self.client.get_klines(symbol, interval, count).await?;
        self.cache.put(key, candles.clone());
        Ok(candles)
    }

    /// Drop expired cache entries. Called by the periodic sweep in main;
    /// reads already evict lazily, this just bounds memory between them.
    pub fn purge_expired(&self) {
        self.cache.purge_expired();
    }

    /// Number of cached (symbol, interval) series.
    pub fn cached_series(&self) -> usize {
        self.cache.len()
    }
}
