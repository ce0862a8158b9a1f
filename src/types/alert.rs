//! Alert records handed to the delivery sink.

use super::signals::{Direction, FlowSummary, HighType, LowType, StrengthLabel, TrendBias};
use serde::{Deserialize, Serialize};

/// Kind of alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertEventType {
    /// Confirmed direction appeared or flipped on the latest bar.
    TrendChange,
    /// Pullback to the fast EMA followed by a resume in the trend direction.
    ReEntry,
    /// Per-instrument state snapshot.
    DailySummary,
}

impl AlertEventType {
    pub fn label(&self) -> &'static str {
        match self {
            AlertEventType::TrendChange => "trend-change",
            AlertEventType::ReEntry => "re-entry",
            AlertEventType::DailySummary => "daily-summary",
        }
    }
}

/// Structured alert emitted by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    pub instrument: String,
    pub event_type: AlertEventType,
    /// Confirmed direction (None only for summaries of unconfirmed instruments).
    pub direction: Option<Direction>,
    pub high_type: Option<HighType>,
    pub low_type: Option<LowType>,
    pub close: f64,
    pub stop: Option<f64>,
    pub take_profits: Vec<f64>,
    pub flow: FlowSummary,
    pub volume_ratio: Option<f64>,
    pub daily_bias: TrendBias,
    pub strength: Option<StrengthLabel>,
    /// Bullish alert vetoed by bearish reference instruments.
    pub regime_suppressed: bool,
}

impl AlertRecord {
    /// Short instrument name ("BTC" for "BTC-USDT").
    pub fn base_asset(&self) -> &str {
        self.instrument
            .split('-')
            .next()
            .unwrap_or(self.instrument.as_str())
    }
}
