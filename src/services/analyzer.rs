//! Per-instrument analysis: fast-timeframe confirmation with daily confluence,
//! flow corroboration, levels and alert classification.

use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::services::flow;
use crate::services::signals::{
    gated_flow_direction, is_reentry, levels_for, strength_label, trend_change, EnrichedSeries,
    Levels, TrendScorer,
};
use crate::types::{
    AlertEventType, AlertRecord, Confirmation, Direction, FlowSummary, Series, StrengthLabel,
    Timeframe, Trade, TrendBias,
};
use serde::Serialize;
use tracing::debug;

/// Prices of the latest visible swing high and swing low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingRange {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
}

/// Result of analyzing one instrument for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub instrument: String,
    /// Confirmation of the latest fast bar.
    pub latest: Confirmation,
    /// Confirmation of the bar before it, recomputed from the same window.
    pub previous: Option<Confirmation>,
    pub daily_bias: TrendBias,
    pub close: f64,
    pub swing_range: SwingRange,
    pub flow: FlowSummary,
    pub volume_ratio: Option<f64>,
    /// Present iff the latest bar is confirmed.
    pub levels: Option<Levels>,
    /// Direction of a trend-change event on the latest bar.
    pub trend_change: Option<Direction>,
    pub reentry: bool,
    pub strength: Option<StrengthLabel>,
}

impl AnalysisResult {
    pub fn confirmed_direction(&self) -> Option<Direction> {
        self.latest.confirmed_direction
    }

    /// Build an alert record of `event_type` from this result.
    pub fn to_alert(&self, event_type: AlertEventType, regime_suppressed: bool) -> AlertRecord {
        AlertRecord {
            instrument: self.instrument.clone(),
            event_type,
            direction: self.confirmed_direction(),
            high_type: self.latest.structure.high_type,
            low_type: self.latest.structure.low_type,
            close: self.close,
            stop: self.levels.as_ref().map(|l| l.stop),
            take_profits: self
                .levels
                .as_ref()
                .map(|l| l.take_profits.clone())
                .unwrap_or_default(),
            flow: self.flow,
            volume_ratio: self.volume_ratio,
            daily_bias: self.daily_bias,
            strength: self.strength,
            regime_suppressed,
        }
    }
}

/// Analyze one instrument from its fast and daily series and recent trades.
///
/// Fails with `InsufficientData` when either series is below its minimum length.
pub fn analyze(
    instrument: &str,
    fast: &Series,
    daily: &Series,
    trades: &[Trade],
    config: &EngineConfig,
) -> Result<AnalysisResult, AnalysisError> {
    ensure_length(fast, Timeframe::Fast, config.min_fast_bars)?;
    ensure_length(daily, Timeframe::Daily, config.min_daily_bars)?;

    let fast_series = EnrichedSeries::new(fast.candles(), config);
    let daily_series = EnrichedSeries::new(daily.candles(), config);

    let daily_bias = TrendScorer::new(&daily_series, config).coarse_bias();

    let flow = flow::summarize(trades, &config.flow_buckets);
    let flow_direction = gated_flow_direction(&flow, config);

    let scorer = TrendScorer::new(&fast_series, config);
    let latest = scorer
        .latest(flow_direction)
        .ok_or_else(|| AnalysisError::PreconditionViolation("empty fast series".to_string()))?;
    // Flow describes the run, not a bar, so the previous bar sees the same flow
    let previous = scorer.previous(flow_direction);

    let last = fast_series.len() - 1;
    let close = fast_series.close(last);

    let levels = latest
        .confirmed_direction
        .map(|_| levels_for(&latest, &fast_series, close, config))
        .transpose()?;

    let swing_range = SwingRange {
        swing_high: latest.structure.last_swing_high.map(|i| fast_series.high(i)),
        swing_low: latest.structure.last_swing_low.map(|i| fast_series.low(i)),
    };

    let result = AnalysisResult {
        instrument: instrument.to_string(),
        trend_change: trend_change(previous.as_ref(), &latest),
        reentry: is_reentry(&fast_series, latest.confirmed_direction, config.reentry_window),
        strength: strength_label(latest.confirmed_direction, daily_bias),
        latest,
        previous,
        daily_bias,
        close,
        swing_range,
        flow,
        volume_ratio: fast_series.volume_ratio[last],
        levels,
    };

    debug!(
        instrument,
        structure = %result.latest.structure.labels(),
        confirmed = ?result.confirmed_direction(),
        daily = %result.daily_bias,
        trend_change = ?result.trend_change,
        reentry = result.reentry,
        "Analyzed instrument"
    );

    Ok(result)
}

fn ensure_length(series: &Series, timeframe: Timeframe, required: usize) -> Result<(), AnalysisError> {
    // At least one bar is always needed, whatever the configured minimum
    let required = required.max(1);
    if series.len() < required {
        return Err(AnalysisError::InsufficientData {
            timeframe,
            required,
            actual: series.len(),
        });
    }
    Ok(())
}
