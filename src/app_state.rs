// =============================================================================
// Central Application State — Meridian Signal Service
// =============================================================================
//
// Everything a request handler needs, shared via `Arc<AppState>`. The config
// is immutable after startup; the only mutable shared state is the candle
// cache (inside CandleSource) and the request counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::binance::BinanceClient;
use crate::candle_source::CandleSource;
use crate::config::AppConfig;
use crate::subscription::SubscriptionPolicy;

pub struct AppState {
    pub config: AppConfig,
    pub candle_source: Arc<CandleSource>,
    pub policy: SubscriptionPolicy,

    /// Signals requests served since startup. Surfaced by /health.
    pub requests_served: AtomicU64,

    /// Instant the service was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the shared state from loaded configuration. The returned
    /// value is wrapped in `Arc` immediately by the caller.
    pub fn new(config: AppConfig) -> Self {
        let candle_source = Arc::new(CandleSource::new(
            BinanceClient::default(),
            Duration::from_secs(config.cache_ttl_secs),
        ));

        let policy = SubscriptionPolicy::new(config.symbols.clone(), &config.plans);

        Self {
            config,
            candle_source,
            policy,
            requests_served: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn record_request(&self) {
        self.requests_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}
