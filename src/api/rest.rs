// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The health endpoint is public; the
// symbols and signals endpoints require a valid Bearer token resolved to a
// subscriber via the `Subscriber` extractor, which also determines the
// caller's plan and therefore the symbols they may request.
//
// This module is the serialization boundary: indicator values are rounded to
// two decimals here, and any non-finite value is normalized to null here —
// never inside the engine, so the raw math stays testable.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::auth::Subscriber;
use crate::app_state::AppState;
use crate::engine::{self, IndicatorBar};
use crate::types::Signal;

/// Extra bars fetched beyond the requested window so that indicator warm-up
/// never leaks into the returned rows. 30 covers the RSI(14) window and the
/// practical settling span of the MACD signal EMA.
const WARMUP_MARGIN: usize = 30;

/// Caller-facing bounds on the `limit` query parameter.
const MIN_LIMIT: usize = 1;
const MAX_LIMIT: usize = 100;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Public ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Authenticated ───────────────────────────────────────────
        .route("/api/v1/symbols", get(symbols))
        .route("/api/v1/signals/:symbol", get(signals))
        // ── Middleware & State ──────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health (public)
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    requests_served: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests_served: state.requests_served(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Symbols (authenticated)
// =============================================================================

#[derive(Serialize)]
struct SymbolsResponse {
    plan: String,
    symbols: Vec<String>,
    /// Size of the full symbol universe, so clients can render "3 of 8".
    universe_size: usize,
}

async fn symbols(
    subscriber: Subscriber,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let symbols = state.policy.allowed_symbols(&subscriber.plan).to_vec();
    Json(SymbolsResponse {
        plan: subscriber.plan,
        symbols,
        universe_size: state.policy.universe().len(),
    })
}

// =============================================================================
// Signals (authenticated)
// =============================================================================

fn default_interval() -> String {
    "5m".to_string()
}

fn default_limit() -> usize {
    50
}

#[derive(Deserialize)]
struct SignalsQuery {
    #[serde(default = "default_interval")]
    interval: String,

    #[serde(default = "default_limit")]
    limit: usize,
}

/// One bar of the wire response. Indicator fields are rounded to 2 decimal
/// places; undefined or non-finite values serialize as `null`.
#[derive(Debug, Serialize)]
struct SignalRecord {
    open_time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    ema_fast: Option<f64>,
    ema_slow: Option<f64>,
    rsi: Option<f64>,
    macd: Option<f64>,
    macd_signal: Option<f64>,
    signal: Signal,
}

impl SignalRecord {
    fn from_bar(bar: &IndicatorBar) -> Self {
        Self {
            open_time: bar.candle.open_time,
            open: bar.candle.open,
            high: bar.candle.high,
            low: bar.candle.low,
            close: round2(bar.candle.close),
            volume: bar.candle.volume,
            ema_fast: presentable(bar.ema_fast),
            ema_slow: presentable(bar.ema_slow),
            rsi: presentable(bar.rsi),
            macd: presentable(bar.macd),
            macd_signal: presentable(bar.macd_signal),
            signal: bar.signal,
        }
    }
}

/// Round to 2 decimal places, half away from zero.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Boundary normalization: undefined stays null, non-finite becomes null,
/// everything else is rounded for presentation.
fn presentable(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite()).map(round2)
}

/// Accepts the interval grammar `[1-9][0-9]*` followed by `m`, `h` or `d`
/// (e.g. 1m, 5m, 15m, 1h, 1d).
fn is_valid_interval(s: &str) -> bool {
    let Some(unit) = s.chars().last() else {
        return false;
    };
    if !matches!(unit, 'm' | 'h' | 'd') {
        return false;
    }
    let digits = &s[..s.len() - 1];
    !digits.is_empty()
        && !digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit())
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
}

async fn signals(
    subscriber: Subscriber,
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<SignalsQuery>,
) -> Result<Json<Vec<SignalRecord>>, ApiError> {
    let request_id = Uuid::new_v4();
    let symbol = symbol.to_uppercase();

    if !is_valid_interval(&query.interval) {
        return Err(bad_request(format!(
            "invalid interval '{}': expected e.g. 1m, 5m, 15m, 1h, 1d",
            query.interval
        )));
    }

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&query.limit) {
        return Err(bad_request(format!(
            "limit must be between {MIN_LIMIT} and {MAX_LIMIT}, got {}",
            query.limit
        )));
    }

    if !state.policy.is_allowed(&subscriber.plan, &symbol) {
        warn!(
            %request_id,
            subscriber = %subscriber.name,
            plan = %subscriber.plan,
            symbol = %symbol,
            "symbol not in plan allow-list"
        );
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "error": format!("symbol {symbol} is not available on the '{}' plan", subscriber.plan),
            })),
        ));
    }

    state.record_request();

    // Fetch padding beyond the requested window so warm-up rows can be
    // dropped before trimming to the caller's limit.
    let fetch_count = query.limit + WARMUP_MARGIN;
    let candles = state
        .candle_source
        .get(&symbol, &query.interval, fetch_count)
        .await
        .map_err(|e| {
            warn!(%request_id, symbol = %symbol, error = %e, "candle fetch failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": format!("candle fetch failed: {e}") })),
            )
        })?;

    let frame = engine::compute_frame(&candles, &state.config.engine).map_err(|e| {
        warn!(%request_id, symbol = %symbol, error = %e, "engine rejected candle data");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("bad candle data: {e}") })),
        )
    })?;

    // Keep only the caller-requested tail; the padding exists solely to feed
    // indicator warm-up.
    let start = frame.len().saturating_sub(query.limit);
    let records: Vec<SignalRecord> = frame[start..].iter().map(SignalRecord::from_bar).collect();

    info!(
        %request_id,
        subscriber = %subscriber.name,
        symbol = %symbol,
        interval = %query.interval,
        limit = query.limit,
        bars = records.len(),
        "signals computed"
    );

    Ok(Json(records))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Candle;

    #[test]
    fn interval_grammar() {
        for ok in ["1m", "5m", "15m", "1h", "4h", "1d", "30m"] {
            assert!(is_valid_interval(ok), "{ok} should be valid");
        }
        for bad in ["", "m", "0m", "05m", "5", "5w", "5M", "-5m", "1.5h", "5 m"] {
            assert!(!is_valid_interval(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn round2_half_away_from_zero() {
        // 0.125 is exactly representable, so the scaled value is exactly
        // 12.5 and exercises the tie-breaking direction.
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(37020.123), 37020.12);
        assert_eq!(round2(99.999), 100.0);
    }

    #[test]
    fn presentable_normalizes_non_finite_to_none() {
        assert_eq!(presentable(None), None);
        assert_eq!(presentable(Some(f64::NAN)), None);
        assert_eq!(presentable(Some(f64::INFINITY)), None);
        assert_eq!(presentable(Some(f64::NEG_INFINITY)), None);
        assert_eq!(presentable(Some(68.137)), Some(68.14));
    }

    fn sample_bar() -> IndicatorBar {
        IndicatorBar {
            candle: Candle {
                open_time: 1700000000000,
                open: 100.0,
                high: 101.5,
                low: 99.5,
                close: 100.456,
                volume: 12.0,
            },
            ema_fast: Some(100.123456),
            ema_slow: Some(99.987654),
            rsi: None,
            macd: Some(f64::INFINITY),
            macd_signal: Some(0.135),
            signal: Signal::Buy,
        }
    }

    #[test]
    fn record_rounds_and_nullifies() {
        let record = SignalRecord::from_bar(&sample_bar());
        assert_eq!(record.close, 100.46);
        assert_eq!(record.ema_fast, Some(100.12));
        assert_eq!(record.ema_slow, Some(99.99));
        assert_eq!(record.rsi, None);
        // Non-finite indicator values must never reach the wire.
        assert_eq!(record.macd, None);
        assert_eq!(record.macd_signal, Some(0.14));
    }

    #[test]
    fn record_serializes_undefined_as_null() {
        let json = serde_json::to_value(SignalRecord::from_bar(&sample_bar())).unwrap();
        assert!(json["rsi"].is_null());
        assert!(json["macd"].is_null());
        assert_eq!(json["signal"], "BUY");
        assert_eq!(json["open_time"], 1700000000000i64);
    }
}
