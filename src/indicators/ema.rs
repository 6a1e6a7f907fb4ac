// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   alpha  = 2 / (period + 1)
//   EMA_0  = close_0
//   EMA_t  = close_t * alpha + EMA_{t-1} * (1 - alpha)
//
// The first value is seeded with the first close (the no-adjustment
// recurrence), NOT with an SMA of the first `period` closes. The output is
// therefore defined at every index and has the same length as the input.
// =============================================================================

/// Compute the EMA series for the given `values` slice and look-back `period`.
///
/// Returns a vector of the same length as `values`; element `i` is the EMA of
/// `values[..=i]` under the no-adjustment recurrence.
///
/// # Edge cases
/// - empty input => empty vec
/// - `period == 0` => empty vec (division guard; callers validate periods)
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);

    for &value in &values[1..] {
        let ema = value * alpha + prev * (1.0 - alpha);
        result.push(ema);
        prev = ema;
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_single_value_is_seed() {
        let ema = calculate_ema(&[42.0], 9);
        assert_eq!(ema, vec![42.0]);
    }

    #[test]
    fn ema_output_matches_input_length() {
        let closes: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        assert_eq!(calculate_ema(&closes, 9).len(), closes.len());
    }

    #[test]
    fn ema_known_values_fast_and_slow() {
        // The documented recurrence over a fixed series, with short periods
        // (fast=2, slow=3) so every step is hand-checkable.
        let closes = [100.0, 102.0, 101.0, 105.0, 103.0, 108.0, 107.0, 112.0];

        for period in [2usize, 3] {
            let alpha = 2.0 / (period as f64 + 1.0);
            let mut expected = vec![closes[0]];
            for &c in &closes[1..] {
                let prev = *expected.last().unwrap();
                expected.push(c * alpha + prev * (1.0 - alpha));
            }

            let ema = calculate_ema(&closes, period);
            assert_eq!(ema.len(), expected.len());
            for (i, (a, b)) in ema.iter().zip(expected.iter()).enumerate() {
                assert!(
                    (a - b).abs() < 1e-12,
                    "period {period}, index {i}: got {a}, expected {b}"
                );
            }
        }
    }

    #[test]
    fn ema_flat_series_stays_flat() {
        let ema = calculate_ema(&[100.0; 20], 9);
        for &v in &ema {
            assert!((v - 100.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_lags_behind_rising_prices() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64 * 10.0).collect();
        let ema = calculate_ema(&closes, 9);
        // After the seed, the EMA of a strictly rising series trails the close.
        for i in 1..closes.len() {
            assert!(ema[i] < closes[i], "index {i}: ema {} >= close {}", ema[i], closes[i]);
        }
    }
}
