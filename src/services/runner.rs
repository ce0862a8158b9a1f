//! One run across the configured instrument set.
//!
//! Fetches every instrument concurrently, analyzes each independently, joins,
//! applies the regime gate and the delivery policy, then hands the surviving
//! alerts to the sink.

use crate::config::Config;
use crate::services::analyzer::{analyze, AnalysisResult};
use crate::services::regime::RegimeGate;
use crate::sinks::AlertSink;
use crate::sources::{CandleSource, TradeSource};
use crate::types::{AlertEventType, AlertRecord, Direction, Series, Timeframe, Trade};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Instrument dropped from a run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedInstrument {
    pub instrument: String,
    pub reason: String,
}

/// Outcome of a single run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub analyzed: Vec<AnalysisResult>,
    pub skipped: Vec<SkippedInstrument>,
    /// Instruments whose bullish alerts were vetoed by the regime gate.
    pub suppressed: Vec<String>,
    pub alerts: Vec<AlertRecord>,
    /// Whether the sink accepted the alerts (false when there were none).
    pub delivered: bool,
}

impl RunReport {
    pub fn result(&self, instrument: &str) -> Option<&AnalysisResult> {
        self.analyzed.iter().find(|r| r.instrument == instrument)
    }
}

/// Execute one run and deliver its alerts.
///
/// Per-instrument failures are logged and skipped; a sink failure is logged
/// and reported through `RunReport::delivered`.
pub async fn run_once<S, K>(config: &Config, source: &S, sink: &K) -> RunReport
where
    S: CandleSource + TradeSource,
    K: AlertSink,
{
    let started_at = Utc::now();
    info!(instruments = config.instruments.len(), "Starting run");

    let analyses = join_all(config.instruments.iter().map(|instrument| async move {
        let (fast, daily, trades) = fetch_inputs(source, instrument, config).await;
        (
            instrument.clone(),
            analyze(instrument, &fast, &daily, &trades, &config.engine),
        )
    }))
    .await;

    let mut analyzed = Vec::new();
    let mut skipped = Vec::new();
    for (instrument, outcome) in analyses {
        match outcome {
            Ok(result) => analyzed.push(result),
            Err(e) => {
                warn!(instrument = %instrument, error = %e, "Skipping instrument");
                skipped.push(SkippedInstrument {
                    instrument,
                    reason: e.to_string(),
                });
            }
        }
    }

    // Join point: the gate needs every confirmation
    let directions: HashMap<String, Option<Direction>> = analyzed
        .iter()
        .map(|r| (r.instrument.clone(), r.confirmed_direction()))
        .collect();
    let gate = RegimeGate::new(&config.reference_instruments);
    let suppress = gate.evaluate(&directions);

    let suppressed: Vec<String> = analyzed
        .iter()
        .filter(|r| suppress.get(&r.instrument).copied().unwrap_or(false))
        .map(|r| r.instrument.clone())
        .collect();

    let alerts = compose_alerts(&analyzed, &suppress, config.daily_summary);

    let delivered = if alerts.is_empty() {
        info!("No signal");
        false
    } else {
        for alert in &alerts {
            info!(
                instrument = %alert.instrument,
                event = alert.event_type.label(),
                direction = ?alert.direction,
                close = alert.close,
                stop = ?alert.stop,
                "Alert"
            );
        }
        match sink.deliver(&alerts).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Alert delivery failed");
                false
            }
        }
    };

    info!(
        analyzed = analyzed.len(),
        skipped = skipped.len(),
        suppressed = suppressed.len(),
        alerts = alerts.len(),
        "Run complete"
    );

    RunReport {
        started_at,
        analyzed,
        skipped,
        suppressed,
        alerts,
        delivered,
    }
}

/// Apply the delivery policy to gated results.
///
/// Trend-change alerts take precedence. Re-entry alerts are emitted only when
/// no trend-change alert survived the gate across the whole set. Daily
/// summaries, when enabled, cover every analyzed instrument.
pub fn compose_alerts(
    results: &[AnalysisResult],
    suppress: &HashMap<String, bool>,
    daily_summary: bool,
) -> Vec<AlertRecord> {
    let is_suppressed = |r: &AnalysisResult| suppress.get(&r.instrument).copied().unwrap_or(false);

    let mut alerts: Vec<AlertRecord> = results
        .iter()
        .filter(|r| r.trend_change.is_some() && !is_suppressed(r))
        .map(|r| r.to_alert(AlertEventType::TrendChange, false))
        .collect();

    if alerts.is_empty() {
        alerts.extend(
            results
                .iter()
                .filter(|r| r.reentry && !is_suppressed(r))
                .map(|r| r.to_alert(AlertEventType::ReEntry, false)),
        );
    }

    if daily_summary {
        alerts.extend(
            results
                .iter()
                .map(|r| r.to_alert(AlertEventType::DailySummary, is_suppressed(r))),
        );
    }

    alerts
}

/// Fetch both timeframes and the trade tape for one instrument.
///
/// Transport failures become empty inputs, which the analyzer reports as
/// insufficient data (candles) or absent flow (trades).
async fn fetch_inputs<S>(source: &S, instrument: &str, config: &Config) -> (Series, Series, Vec<Trade>)
where
    S: CandleSource + TradeSource,
{
    let (fast, daily, trades) = tokio::join!(
        source.fetch_candles(instrument, Timeframe::Fast, config.candle_limit),
        source.fetch_candles(instrument, Timeframe::Daily, config.daily_limit),
        source.fetch_trades(instrument, config.trade_limit),
    );

    let fast = fast.unwrap_or_else(|e| {
        error!(instrument, error = %e, "Fast candle fetch failed");
        Series::default()
    });
    let daily = daily.unwrap_or_else(|e| {
        error!(instrument, error = %e, "Daily candle fetch failed");
        Series::default()
    });
    let trades = trades.unwrap_or_else(|e| {
        error!(instrument, error = %e, "Trade fetch failed");
        Vec::new()
    });

    (fast, daily, trades)
}
