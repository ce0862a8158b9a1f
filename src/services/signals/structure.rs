//! Market structure classification (HH/HL/LH/LL).

use super::enriched::EnrichedSeries;
use super::swings::SwingFlags;
use crate::types::{HighType, LowType, Structure, TrendBias};

/// Classify structure at `idx` from the swings visible at `idx`.
///
/// Equal consecutive swings classify as LH / LL. When the two sides disagree
/// (e.g. HH with LL) the bearish reading wins.
pub fn classify(series: &EnrichedSeries, swings: &SwingFlags, idx: usize) -> Structure {
    let mut highs = swings.highs_up_to(idx).rev();
    let last_swing_high = highs.next();
    let prior_swing_high = highs.next();

    let mut lows = swings.lows_up_to(idx).rev();
    let last_swing_low = lows.next();
    let prior_swing_low = lows.next();

    let high_type = match (last_swing_high, prior_swing_high) {
        (Some(last), Some(prior)) if series.high(last) > series.high(prior) => Some(HighType::HH),
        (Some(_), Some(_)) => Some(HighType::LH),
        _ => None,
    };

    let low_type = match (last_swing_low, prior_swing_low) {
        (Some(last), Some(prior)) if series.low(last) > series.low(prior) => Some(LowType::HL),
        (Some(_), Some(_)) => Some(LowType::LL),
        _ => None,
    };

    Structure {
        high_type,
        low_type,
        bias: structural_bias(high_type, low_type),
        last_swing_high,
        last_swing_low,
    }
}

/// Direction implied by high/low labels. Bearish labels take precedence.
pub fn structural_bias(high_type: Option<HighType>, low_type: Option<LowType>) -> TrendBias {
    let bearish = high_type == Some(HighType::LH) || low_type == Some(LowType::LL);
    let bullish = high_type == Some(HighType::HH) || low_type == Some(LowType::HL);

    if bearish {
        TrendBias::Down
    } else if bullish {
        TrendBias::Up
    } else {
        TrendBias::Neutral
    }
}
