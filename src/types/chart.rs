use serde::{Deserialize, Serialize};
use std::fmt;

/// Timeframe role in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// Signal timeframe (4-hour bars by default).
    Fast,
    /// Confluence timeframe (daily bars).
    Daily,
}

impl Timeframe {
    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Timeframe::Fast => "fast",
            Timeframe::Daily => "daily",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar open time (Unix milliseconds).
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Candles ordered oldest first with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    candles: Vec<Candle>,
}

impl Series {
    /// Build a series, ordering by time and dropping repeated timestamps.
    ///
    /// When two candles share a timestamp the later one in the input wins,
    /// which matches how exchanges revise the still-open bar.
    pub fn new(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.time);

        let mut deduped: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match deduped.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                _ => deduped.push(candle),
            }
        }

        Self { candles: deduped }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

impl From<Vec<Candle>> for Series {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}
