//! Series preprocessing: candles plus the indicator columns the engine reads.

use super::indicators::{Ema, Macd, Sma};
use crate::config::EngineConfig;
use crate::types::{Candle, Direction};

/// Candles augmented, per index, with EMA pair, MACD pair and volume ratio.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedSeries {
    pub candles: Vec<Candle>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    /// Undefined until a full volume window exists.
    pub volume_sma: Vec<Option<f64>>,
    /// volume / volume_sma; undefined where the SMA is undefined or zero.
    pub volume_ratio: Vec<Option<f64>>,
}

impl EnrichedSeries {
    /// Compute all indicator columns for `candles` (oldest first).
    pub fn new(candles: &[Candle], config: &EngineConfig) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let ema_fast = Ema::new(config.ema_fast_span).series(&closes);
        let ema_slow = Ema::new(config.ema_slow_span).series(&closes);
        let macd = Macd::new(config.macd_fast, config.macd_slow, config.macd_signal).series(&closes);
        let volume_sma = Sma::new(config.volume_sma_period).series(&volumes);

        let volume_ratio = volumes
            .iter()
            .zip(volume_sma.iter())
            .map(|(volume, sma)| match sma {
                Some(avg) if *avg > 0.0 => Some(volume / avg),
                _ => None,
            })
            .collect();

        Self {
            candles: candles.to_vec(),
            ema_fast,
            ema_slow,
            macd: macd.macd,
            macd_signal: macd.signal,
            volume_sma,
            volume_ratio,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn high(&self, idx: usize) -> f64 {
        self.candles[idx].high
    }

    pub fn low(&self, idx: usize) -> f64 {
        self.candles[idx].low
    }

    pub fn close(&self, idx: usize) -> f64 {
        self.candles[idx].close
    }

    /// EMA fast vs slow at `idx`.
    pub fn ema_direction(&self, idx: usize) -> Direction {
        Direction::of_cross(self.ema_fast[idx], self.ema_slow[idx])
    }

    /// MACD vs signal at `idx`.
    pub fn macd_direction(&self, idx: usize) -> Direction {
        Direction::of_cross(self.macd[idx], self.macd_signal[idx])
    }

    /// Index of the latest bar.
    pub fn last_index(&self) -> Option<usize> {
        self.candles.len().checked_sub(1)
    }
}
