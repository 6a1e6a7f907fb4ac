// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd_line   = EMA(close, fast) - EMA(close, slow)
//   signal_line = EMA(macd_line, signal)
//
// Both component EMAs are computed over the same close series; the signal
// line applies the same no-adjustment recurrence to the macd line itself.
// With first-close seeding, both outputs are defined at every index.
// =============================================================================

use super::ema::calculate_ema;

/// Compute the MACD line and signal line for the given `closes`.
///
/// Returns `(macd_line, signal_line)`, each the same length as `closes`.
/// Empty input or a zero period yields two empty vectors.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>) {
    if closes.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        return (Vec::new(), Vec::new());
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd_line, signal);

    (macd_line, signal_line)
}
