// =============================================================================
// Service Configuration — JSON file with env overrides and atomic save
// =============================================================================
//
// Every tunable lives here: bind address, symbol universe, cache TTL, engine
// parameters, the plan table, and the subscriber list. All fields carry
// `#[serde(default)]` so adding new fields never breaks loading an older
// config file.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::EngineParams;
use crate::subscription::PlanSpec;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_symbols() -> Vec<String> {
    vec![
        "BTCUSDT".to_string(),
        "ETHUSDT".to_string(),
        "BNBUSDT".to_string(),
        "SOLUSDT".to_string(),
        "XRPUSDT".to_string(),
        "ADAUSDT".to_string(),
        "DOGEUSDT".to_string(),
        "AVAXUSDT".to_string(),
    ]
}

fn default_cache_ttl_secs() -> u64 {
    30
}

fn default_plans() -> Vec<PlanSpec> {
    vec![
        PlanSpec {
            name: "1 Month".to_string(),
            symbol_limit: Some(3),
        },
        PlanSpec {
            name: "6 Months".to_string(),
            symbol_limit: Some(6),
        },
        PlanSpec {
            name: "12 Months".to_string(),
            symbol_limit: None,
        },
    ]
}

// =============================================================================
// Subscribers
// =============================================================================

/// One API consumer. The token itself is never stored — only its SHA-256
/// digest, hex-encoded. The auth layer hashes the presented bearer token and
/// compares digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriberSpec {
    pub name: String,
    pub plan: String,
    pub token_sha256: String,
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration for the Meridian signal service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the API server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Ordered symbol universe; plan allow-lists are prefixes of this.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Candle cache time-to-live, seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Indicator and cascade parameters.
    #[serde(default)]
    pub engine: EngineParams,

    /// Subscription plan table.
    #[serde(default = "default_plans")]
    pub plans: Vec<PlanSpec>,

    /// Authorized API consumers.
    #[serde(default)]
    pub subscribers: Vec<SubscriberSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            symbols: default_symbols(),
            cache_ttl_secs: default_cache_ttl_secs(),
            engine: EngineParams::default(),
            plans: default_plans(),
            subscribers: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        if let Err(field) = config.engine.validate() {
            anyhow::bail!(
                "invalid engine parameters in {}: {} must be >= 1",
                path.display(),
                field
            );
        }

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            subscribers = config.subscribers.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    /// Apply environment overrides: `MERIDIAN_BIND_ADDR` and
    /// `MERIDIAN_SYMBOLS` (comma-separated, upper-cased).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("MERIDIAN_BIND_ADDR") {
            if !addr.is_empty() {
                self.bind_addr = addr;
            }
        }
        if let Ok(syms) = std::env::var("MERIDIAN_SYMBOLS") {
            let parsed: Vec<String> = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.symbols = parsed;
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.symbols.len(), 8);
        assert_eq!(cfg.symbols[0], "BTCUSDT");
        assert_eq!(cfg.symbols[7], "AVAXUSDT");
        assert_eq!(cfg.cache_ttl_secs, 30);
        assert_eq!(cfg.engine.ema_fast, 9);
        assert_eq!(cfg.engine.ema_slow, 21);
        assert_eq!(cfg.engine.rsi_period, 14);
        assert_eq!(cfg.engine.macd_fast, 12);
        assert_eq!(cfg.engine.macd_slow, 26);
        assert_eq!(cfg.engine.macd_signal, 9);
        assert_eq!(cfg.plans.len(), 3);
        assert!(cfg.subscribers.is_empty());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.cache_ttl_secs, 30);
        assert_eq!(cfg.symbols.len(), 8);
        assert!((cfg.engine.rsi_overbought - 70.0).abs() < f64::EPSILON);
        assert!((cfg.engine.rsi_oversold - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "symbols": ["ETHUSDT"],
            "engine": { "ema_fast": 5 },
            "subscribers": [
                { "name": "alice", "plan": "6 Months", "token_sha256": "ab" }
            ]
        }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbols, vec!["ETHUSDT"]);
        assert_eq!(cfg.engine.ema_fast, 5);
        assert_eq!(cfg.engine.ema_slow, 21); // default fills in
        assert_eq!(cfg.subscribers.len(), 1);
        assert_eq!(cfg.subscribers[0].plan, "6 Months");
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = AppConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.symbols, cfg2.symbols);
        assert_eq!(cfg.cache_ttl_secs, cfg2.cache_ttl_secs);
        assert_eq!(cfg.engine, cfg2.engine);
    }

    #[test]
    fn default_plan_table_matches_product_tiers() {
        let cfg = AppConfig::default();
        let by_name: std::collections::HashMap<_, _> = cfg
            .plans
            .iter()
            .map(|p| (p.name.as_str(), p.symbol_limit))
            .collect();
        assert_eq!(by_name["1 Month"], Some(3));
        assert_eq!(by_name["6 Months"], Some(6));
        assert_eq!(by_name["12 Months"], None);
    }
}
