//! Multi-signal trend confirmation.
//!
//! Structure and the EMA cross must agree before anything is counted; that
//! agreement is worth two votes. MACD and large-trade flow each add one more
//! when they point the same way. A direction is confirmed once the vote
//! reaches the configured threshold.

use super::enriched::EnrichedSeries;
use super::structure;
use super::swings::SwingFlags;
use crate::config::EngineConfig;
use crate::types::{Confirmation, Direction, FlowSummary, TrendBias};
use tracing::debug;

/// Votes granted when structure and the EMA cross agree.
const BASE_VOTES: u8 = 2;

/// Scores confirmation for the bars of one enriched series.
pub struct TrendScorer<'a> {
    series: &'a EnrichedSeries,
    swings: SwingFlags,
    config: &'a EngineConfig,
}

impl<'a> TrendScorer<'a> {
    /// Detect swings on `series` and prepare to score its bars.
    pub fn new(series: &'a EnrichedSeries, config: &'a EngineConfig) -> Self {
        Self {
            series,
            swings: SwingFlags::detect(series, config.swing_look),
            config,
        }
    }

    /// Confirmation state of bar `idx`.
    ///
    /// `flow_direction` must already be gated by the flow threshold
    /// (see [`gated_flow_direction`]).
    pub fn confirm(&self, idx: usize, flow_direction: Option<Direction>) -> Confirmation {
        let structure = structure::classify(self.series, &self.swings, idx);
        let raw_direction = self.series.ema_direction(idx);

        let votes = match structure.bias.direction() {
            Some(direction) if direction == raw_direction => {
                let mut votes = BASE_VOTES;
                if self.series.macd_direction(idx) == direction {
                    votes += 1;
                }
                if flow_direction == Some(direction) {
                    votes += 1;
                }
                votes
            }
            _ => 0,
        };

        let confirmed_direction = if votes >= BASE_VOTES && votes >= self.config.vote_threshold {
            structure.bias.direction()
        } else {
            None
        };

        debug!(
            idx,
            bias = %structure.bias,
            raw = %raw_direction,
            votes,
            confirmed = ?confirmed_direction,
            "Scored bar"
        );

        Confirmation {
            raw_direction,
            confirmed_direction,
            structure,
            votes,
        }
    }

    /// Confirmation of the latest bar, if the series is non-empty.
    pub fn latest(&self, flow_direction: Option<Direction>) -> Option<Confirmation> {
        let idx = self.series.last_index()?;
        Some(self.confirm(idx, flow_direction))
    }

    /// Confirmation of the bar before the latest, if it exists.
    pub fn previous(&self, flow_direction: Option<Direction>) -> Option<Confirmation> {
        let idx = self.series.last_index()?.checked_sub(1)?;
        Some(self.confirm(idx, flow_direction))
    }

    /// Coarse direction of the latest bar: structure and EMA cross must agree.
    pub fn coarse_bias(&self) -> TrendBias {
        let Some(idx) = self.series.last_index() else {
            return TrendBias::Neutral;
        };

        let structure = structure::classify(self.series, &self.swings, idx);
        let ema = TrendBias::from(self.series.ema_direction(idx));

        if structure.bias != TrendBias::Neutral && structure.bias == ema {
            structure.bias
        } else {
            TrendBias::Neutral
        }
    }
}

/// Flow direction eligible to vote: the dominant side, only when net flow
/// magnitude exceeds the configured threshold.
pub fn gated_flow_direction(flow: &FlowSummary, config: &EngineConfig) -> Option<Direction> {
    if flow.net.abs() > config.flow_threshold {
        flow.dominant_direction
    } else {
        None
    }
}
