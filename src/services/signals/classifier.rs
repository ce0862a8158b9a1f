//! Alert classification: trend-change edges, re-entries and strength labels.

use super::enriched::EnrichedSeries;
use crate::types::{Confirmation, Direction, StrengthLabel, TrendBias};

/// Direction of a fresh trend-change event, if one fires on the latest bar.
///
/// Fires only when the latest bar is confirmed and the previous bar was
/// unconfirmed or confirmed the other way.
pub fn trend_change(previous: Option<&Confirmation>, latest: &Confirmation) -> Option<Direction> {
    let current = latest.confirmed_direction?;
    let prior = previous.and_then(|p| p.confirmed_direction);

    if prior == Some(current) {
        None
    } else {
        Some(current)
    }
}

/// Whether the last `window` bars show a touch of the fast EMA against the
/// trend followed by the latest close resuming in the trend's direction.
pub fn is_reentry(series: &EnrichedSeries, confirmed: Option<Direction>, window: usize) -> bool {
    let Some(direction) = confirmed else {
        return false;
    };

    let n = series.len();
    if window < 2 || n < window {
        return false;
    }

    let sign = direction.sign();
    // Positive when close is on the trend side of the fast EMA
    let offset = |i: usize| (series.close(i) - series.ema_fast[i]) * sign;

    let touched = (n - window..n - 1).any(|i| offset(i) <= 0.0);
    touched && offset(n - 1) > 0.0
}

/// Advisory strength of a confirmed call against the daily coarse bias.
pub fn strength_label(confirmed: Option<Direction>, daily: TrendBias) -> Option<StrengthLabel> {
    let direction = confirmed?;

    Some(match daily.direction() {
        None => StrengthLabel::Neutral,
        Some(d) if d == direction => StrengthLabel::Strong,
        Some(_) => StrengthLabel::WeakCounterTrend,
    })
}
