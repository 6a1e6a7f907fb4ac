// =============================================================================
// Signal Rule Cascade
// =============================================================================
//
// Assigns exactly one label per bar via an ordered, OVERRIDING cascade: each
// later rule silently overwrites whatever an earlier rule set. The order is
// product behavior, not an accident:
//
//   1. default HOLD
//   2. EMA crossover        (weakest)
//   3. RSI thresholds       (overrides 2)
//   4. MACD crossover       (overrides 2 and 3 — final say)
//
// A rule whose inputs are undefined for the bar is a no-op. Both crossover
// rules need the previous bar and are no-ops at index 0.

use crate::engine::{EngineParams, IndicatorBar};
use crate::types::Signal;

/// Populate `signal` on every bar of the frame.
pub fn assign(frame: &mut [IndicatorBar], params: &EngineParams) {
    for i in 0..frame.len() {
        let mut label = Signal::Hold;

        // ── Rule 2: EMA crossover ───────────────────────────────────────
        if i > 0 {
            if let (Some(fast), Some(slow), Some(prev_fast), Some(prev_slow)) = (
                frame[i].ema_fast,
                frame[i].ema_slow,
                frame[i - 1].ema_fast,
                frame[i - 1].ema_slow,
            ) {
                if fast > slow && prev_fast <= prev_slow {
                    label = Signal::Buy;
                } else if fast < slow && prev_fast >= prev_slow {
                    label = Signal::Sell;
                }
            }
        }

        // ── Rule 3: RSI thresholds ──────────────────────────────────────
        if let Some(rsi) = frame[i].rsi {
            if rsi > params.rsi_overbought {
                label = Signal::Sell;
            } else if rsi < params.rsi_oversold {
                label = Signal::Buy;
            }
        }

        // ── Rule 4: MACD crossover ──────────────────────────────────────
        // No previous bar exists at index 0, so the rule is a no-op there.
        if i > 0 {
            if let (Some(macd), Some(signal), Some(prev_macd), Some(prev_signal)) = (
                frame[i].macd,
                frame[i].macd_signal,
                frame[i - 1].macd,
                frame[i - 1].macd_signal,
            ) {
                if macd > signal && prev_macd <= prev_signal {
                    label = Signal::Buy;
                } else if macd < signal && prev_macd >= prev_signal {
                    label = Signal::Sell;
                }
            }
        }

        frame[i].signal = label;
    }
}
