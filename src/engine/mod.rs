// =============================================================================
// Signal Engine
// =============================================================================
//
// Pure transformation: an ordered OHLCV series in, the same series annotated
// with indicator values and a per-bar trading signal out. No I/O, no shared
// state — safe to call concurrently from any number of request handlers.
//
// Indicator math lives in `crate::indicators`; the rule cascade that turns a
// computed frame into BUY/SELL/HOLD labels lives in `cascade`.

pub mod cascade;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::calculate_macd;
use crate::indicators::rsi::calculate_rsi;
use crate::types::{Candle, Signal};

// =============================================================================
// Parameters
// =============================================================================

fn default_ema_fast() -> usize {
    9
}

fn default_ema_slow() -> usize {
    21
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

/// Tunable engine parameters. Every field carries a serde default so partial
/// config files keep working as parameters are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Fast EMA period for the crossover rule.
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    /// Slow EMA period for the crossover rule.
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    /// RSI look-back period.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// RSI level above which the threshold rule emits SELL.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// RSI level below which the threshold rule emits BUY.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    /// MACD fast EMA period.
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    /// MACD slow EMA period.
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    /// MACD signal-line EMA period.
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_period: default_rsi_period(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

impl EngineParams {
    /// Check that every look-back period is at least 1.
    ///
    /// Returns the name of the first offending field, for config-load error
    /// messages.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.ema_fast == 0 {
            return Err("ema_fast");
        }
        if self.ema_slow == 0 {
            return Err("ema_slow");
        }
        if self.rsi_period == 0 {
            return Err("rsi_period");
        }
        if self.macd_fast == 0 {
            return Err("macd_fast");
        }
        if self.macd_slow == 0 {
            return Err("macd_slow");
        }
        if self.macd_signal == 0 {
            return Err("macd_signal");
        }
        Ok(())
    }
}

// =============================================================================
// Output frame
// =============================================================================

/// One bar of the computed frame: the input candle, each indicator value
/// (`None` during warm-up — never zero, which would read as a real value),
/// and the signal label the cascade assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorBar {
    pub candle: Candle,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub signal: Signal,
}

// =============================================================================
// Errors
// =============================================================================

/// Input data that the engine refuses to compute over.
///
/// Insufficient history is NOT an error — it is `None` per bar. These fire
/// only on data that is actually broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataQualityError {
    #[error("non-finite close price at bar {0}")]
    NonFiniteClose(usize),

    #[error("candle open_time not strictly increasing at bar {0}")]
    UnorderedBars(usize),
}

// =============================================================================
// Frame computation
// =============================================================================

/// Compute the full indicator frame for `candles` and assign a signal label
/// to every bar.
///
/// An empty series yields an empty frame (`Ok`), not an error. Calling this
/// twice over the same input yields identical output — the engine holds no
/// state between invocations.
pub fn compute_frame(
    candles: &[Candle],
    params: &EngineParams,
) -> Result<Vec<IndicatorBar>, DataQualityError> {
    debug_assert!(params.validate().is_ok(), "engine params validated at load");

    if candles.is_empty() {
        return Ok(Vec::new());
    }

    validate_series(candles)?;

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let ema_fast = calculate_ema(&closes, params.ema_fast);
    let ema_slow = calculate_ema(&closes, params.ema_slow);
    let rsi = calculate_rsi(&closes, params.rsi_period);
    let (macd_line, macd_signal) =
        calculate_macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);

    let mut frame: Vec<IndicatorBar> = candles
        .iter()
        .enumerate()
        .map(|(i, candle)| IndicatorBar {
            candle: candle.clone(),
            ema_fast: Some(ema_fast[i]),
            ema_slow: Some(ema_slow[i]),
            rsi: rsi[i],
            macd: Some(macd_line[i]),
            macd_signal: Some(macd_signal[i]),
            signal: Signal::Hold,
        })
        .collect();

    cascade::assign(&mut frame, params);

    Ok(frame)
}

/// Reject series with broken close prices or out-of-order timestamps.
fn validate_series(candles: &[Candle]) -> Result<(), DataQualityError> {
    for (i, candle) in candles.iter().enumerate() {
        if !candle.close.is_finite() {
            return Err(DataQualityError::NonFiniteClose(i));
        }
        if i > 0 && candle.open_time <= candles[i - 1].open_time {
            return Err(DataQualityError::UnorderedBars(i));
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Build a well-formed series from a list of closes, one bar per minute.
    fn series(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                open_time: i as i64 * 60_000,
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 10.0,
            })
            .collect()
    }

    #[test]
    fn empty_series_yields_empty_frame() {
        let frame = compute_frame(&[], &EngineParams::default()).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn non_finite_close_is_rejected() {
        let mut candles = series(&[100.0, 101.0, 102.0]);
        candles[1].close = f64::NAN;
        let err = compute_frame(&candles, &EngineParams::default()).unwrap_err();
        assert_eq!(err, DataQualityError::NonFiniteClose(1));

        candles[1].close = f64::INFINITY;
        let err = compute_frame(&candles, &EngineParams::default()).unwrap_err();
        assert_eq!(err, DataQualityError::NonFiniteClose(1));
    }

    #[test]
    fn unordered_bars_are_rejected() {
        let mut candles = series(&[100.0, 101.0, 102.0]);
        candles[2].open_time = candles[1].open_time; // duplicate timestamp
        let err = compute_frame(&candles, &EngineParams::default()).unwrap_err();
        assert_eq!(err, DataQualityError::UnorderedBars(2));
    }

    #[test]
    fn frame_preserves_length_and_candles() {
        let candles = series(&(1..=40).map(|x| x as f64).collect::<Vec<_>>());
        let frame = compute_frame(&candles, &EngineParams::default()).unwrap();
        assert_eq!(frame.len(), candles.len());
        for (bar, candle) in frame.iter().zip(candles.iter()) {
            assert_eq!(&bar.candle, candle);
        }
    }

    #[test]
    fn ema_and_macd_defined_on_every_bar() {
        let candles = series(&(1..=40).map(|x| x as f64).collect::<Vec<_>>());
        let frame = compute_frame(&candles, &EngineParams::default()).unwrap();
        for bar in &frame {
            assert!(bar.ema_fast.is_some());
            assert!(bar.ema_slow.is_some());
            assert!(bar.macd.is_some());
            assert!(bar.macd_signal.is_some());
        }
    }

    #[test]
    fn rsi_warm_up_boundary_in_frame() {
        let closes: Vec<f64> = (0..40).map(|x| 100.0 + ((x * 13) % 7) as f64).collect();
        let frame = compute_frame(&series(&closes), &EngineParams::default()).unwrap();
        for (i, bar) in frame.iter().enumerate() {
            if i < 14 {
                assert!(bar.rsi.is_none(), "bar {i} should be warm-up");
            } else {
                assert!(bar.rsi.is_some(), "bar {i} should be defined");
            }
        }
    }

    #[test]
    fn engine_is_idempotent() {
        let closes: Vec<f64> = (0..80).map(|x| 100.0 + (x as f64 * 0.7).sin() * 5.0).collect();
        let candles = series(&closes);
        let params = EngineParams::default();
        let first = compute_frame(&candles, &params).unwrap();
        let second = compute_frame(&candles, &params).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_bar_frame_holds() {
        let frame = compute_frame(&series(&[100.0]), &EngineParams::default()).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].signal, Signal::Hold);
        assert!(frame[0].rsi.is_none());
    }

    #[test]
    fn monotonic_uptrend_sells_on_overbought_rsi() {
        // 100 strictly rising closes: RSI saturates at 100 once defined, so
        // the threshold rule emits SELL from bar 14 on, and no later rule
        // flips any of those bars back to BUY while the price keeps rising.
        let closes: Vec<f64> = (0..100).map(|x| 100.0 + x as f64).collect();
        let frame = compute_frame(&series(&closes), &EngineParams::default()).unwrap();

        let first_sell = frame
            .iter()
            .position(|b| b.signal == Signal::Sell)
            .expect("uptrend must produce at least one SELL");
        assert!(first_sell >= 14, "SELL cannot fire before RSI is defined");

        for (i, bar) in frame.iter().enumerate().skip(first_sell) {
            assert_ne!(bar.signal, Signal::Buy, "unexpected BUY at bar {i}");
        }
    }

    #[test]
    fn params_validate_rejects_zero_periods() {
        let mut params = EngineParams::default();
        params.rsi_period = 0;
        assert_eq!(params.validate(), Err("rsi_period"));

        let mut params = EngineParams::default();
        params.macd_slow = 0;
        assert_eq!(params.validate(), Err("macd_slow"));

        assert!(EngineParams::default().validate().is_ok());
    }
}
