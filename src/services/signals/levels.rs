//! Stop-loss and take-profit derivation.

use super::enriched::EnrichedSeries;
use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::types::{Confirmation, Direction, Structure};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the stop is anchored. One policy is applied to every instrument in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelPolicy {
    /// Tighter of the last opposite swing and the slow EMA with a buffer.
    /// Targets at 1R and 2R.
    #[default]
    EmaBuffered,
    /// Last opposite swing, percentage fallback when none exists.
    /// Targets at 0.5R, 1R and 1.5R.
    SwingAnchored,
}

impl LevelPolicy {
    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ema_buffered" | "ema" | "safe" => Some(Self::EmaBuffered),
            "swing_anchored" | "swing" => Some(Self::SwingAnchored),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::EmaBuffered => "ema_buffered",
            Self::SwingAnchored => "swing_anchored",
        }
    }

    /// Risk multiples of the take-profit ladder.
    pub fn target_multiples(&self) -> &'static [f64] {
        match self {
            Self::EmaBuffered => &[1.0, 2.0],
            Self::SwingAnchored => &[0.5, 1.0, 1.5],
        }
    }

    /// Compute levels for a confirmed `direction` at the latest bar of `series`.
    pub fn compute(
        &self,
        direction: Direction,
        structure: &Structure,
        series: &EnrichedSeries,
        close: f64,
        config: &EngineConfig,
    ) -> Levels {
        let fallback = close * (1.0 - direction.sign() * config.fallback_stop_pct);
        let swing_low = structure.last_swing_low.map(|i| series.low(i));
        let swing_high = structure.last_swing_high.map(|i| series.high(i));

        let candidate = match self {
            Self::EmaBuffered => {
                let ema_slow = series
                    .last_index()
                    .map(|i| series.ema_slow[i])
                    .unwrap_or(close);
                match direction {
                    Direction::Up => swing_low.unwrap_or(ema_slow).min(ema_slow * config.long_buffer),
                    Direction::Down => {
                        swing_high.unwrap_or(ema_slow).max(ema_slow * config.short_buffer)
                    }
                }
            }
            Self::SwingAnchored => match direction {
                Direction::Up => swing_low.unwrap_or(fallback),
                Direction::Down => swing_high.unwrap_or(fallback),
            },
        };

        // Stop must sit on the loss side of close
        let stop = if (close - candidate) * direction.sign() > 0.0 {
            candidate
        } else {
            debug!(
                policy = self.name(),
                candidate, close, "Stop on wrong side of close, using fallback"
            );
            fallback
        };

        let risk = (close - stop).abs();
        let take_profits = self
            .target_multiples()
            .iter()
            .map(|m| close + direction.sign() * risk * m)
            .collect();

        Levels {
            policy: *self,
            direction,
            stop,
            take_profits,
            risk,
        }
    }
}

/// Stop and target ladder for a confirmed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Levels {
    pub policy: LevelPolicy,
    pub direction: Direction,
    pub stop: f64,
    /// Ordered nearest to farthest.
    pub take_profits: Vec<f64>,
    /// Distance from close to stop.
    pub risk: f64,
}

/// Levels for a confirmation using the configured policy.
///
/// Fails with `PreconditionViolation` when the confirmation carries no direction.
pub fn levels_for(
    confirmation: &Confirmation,
    series: &EnrichedSeries,
    close: f64,
    config: &EngineConfig,
) -> Result<Levels, AnalysisError> {
    let direction = confirmation.confirmed_direction.ok_or_else(|| {
        AnalysisError::PreconditionViolation(
            "levels requested for an unconfirmed direction".to_string(),
        )
    })?;

    Ok(config.level_policy.compute(
        direction,
        &confirmation.structure,
        series,
        close,
        config,
    ))
}
