//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;

/// MACD indicator.
///
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
///
/// All EMAs are seeded by their first input, so both lines exist at every index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD and signal lines, index-aligned with the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// Calculate MACD and signal lines for a close series.
    pub fn series(&self, closes: &[f64]) -> MacdSeries {
        let fast = Ema::new(self.fast_period).series(closes);
        let slow = Ema::new(self.slow_period).series(closes);

        let macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let signal = Ema::new(self.signal_period).series(&macd);

        MacdSeries { macd, signal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_lengths_match_input() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let out = Macd::default().series(&closes);
        assert_eq!(out.macd.len(), 50);
        assert_eq!(out.signal.len(), 50);
    }

    #[test]
    fn test_macd_starts_at_zero() {
        let out = Macd::default().series(&[100.0, 101.0]);
        assert_eq!(out.macd[0], 0.0);
        assert_eq!(out.signal[0], 0.0);
    }

    #[test]
    fn test_macd_uptrend_above_signal() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let out = Macd::default().series(&closes);
        let last = closes.len() - 1;
        assert!(out.macd[last] > 0.0);
        assert!(out.macd[last] > out.signal[last]);
    }

    #[test]
    fn test_macd_downtrend_below_signal() {
        let closes: Vec<f64> = (0..60).map(|i| 300.0 - i as f64 * 2.0).collect();
        let out = Macd::default().series(&closes);
        let last = closes.len() - 1;
        assert!(out.macd[last] < 0.0);
        assert!(out.macd[last] < out.signal[last]);
    }

    #[test]
    fn test_macd_empty() {
        let out = Macd::new(12, 26, 9).series(&[]);
        assert!(out.macd.is_empty());
        assert!(out.signal.is_empty());
    }
}
