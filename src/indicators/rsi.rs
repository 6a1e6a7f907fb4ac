// =============================================================================
// Relative Strength Index (RSI) — simple rolling mean
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Per-bar delta: delta_i = close_i - close_{i-1} (no delta at i=0).
// Step 2 — Gain = max(delta, 0), Loss = max(-delta, 0).
// Step 3 — avg_gain / avg_loss = simple mean of the trailing `period` gains
//          and losses. This is the plain rolling mean, NOT Wilder smoothing.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Thresholds used by the cascade: RSI > 70 => overbought, RSI < 30 => oversold.
// =============================================================================

/// Compute the full RSI series for the given `closes` and `period`.
///
/// The returned vector has the same length as `closes`. Element `i` is `None`
/// while the trailing window is incomplete (`i < period` — the delta at bar 0
/// does not exist, so the first full window of `period` deltas ends at bar
/// `period`) and `Some(rsi)` from then on.
///
/// # Edge cases
/// - `period == 0` => empty vec (callers validate periods)
/// - only gains in the window (`avg_loss == 0`, `avg_gain > 0`) => 100.0
///   rather than the infinite RS the raw division would produce
/// - completely flat window (`avg_gain == avg_loss == 0`) => `None`; the
///   0/0 division has no meaningful value and must not masquerade as one
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }

    let mut result = vec![None; closes.len()];
    if closes.len() <= period {
        return result;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // deltas[j] is the move into bar j+1, so the window of `period` deltas
    // ending at bar i is deltas[i-period..i].
    for i in period..closes.len() {
        let window = &deltas[i - period..i];

        let (sum_gain, sum_loss) = window.iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
            if d > 0.0 {
                (g + d, l)
            } else {
                (g, l + d.abs())
            }
        });

        let avg_gain = sum_gain / period as f64;
        let avg_loss = sum_loss / period as f64;

        result[i] = if avg_loss == 0.0 && avg_gain == 0.0 {
            None
        } else if avg_loss == 0.0 {
            Some(100.0)
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - 100.0 / (1.0 + rs))
        };
    }

    result
}
