//! Large-trade flow summary from the recent trade tape.

use crate::config::FlowBuckets;
use crate::types::{FlowCategory, FlowSummary, Trade, TradeSide};

/// Summarize a trade tape. An empty tape yields a zero summary with no direction.
pub fn summarize(trades: &[Trade], buckets: &FlowBuckets) -> FlowSummary {
    let mut net = 0.0;
    let mut largest: Option<&Trade> = None;

    for trade in trades {
        let notional = trade.notional();
        if !notional.is_finite() {
            continue;
        }

        match trade.side {
            TradeSide::Buy => net += notional,
            TradeSide::Sell => net -= notional,
        }

        if largest.map_or(true, |l| notional > l.notional()) {
            largest = Some(trade);
        }
    }

    let largest_notional = largest.map(Trade::notional).unwrap_or(0.0);

    FlowSummary {
        net,
        category: categorize(largest_notional, buckets),
        largest_notional,
        dominant_direction: largest.map(|t| t.side.direction()),
    }
}

/// Bucket a single trade's notional value.
pub fn categorize(notional: f64, buckets: &FlowBuckets) -> FlowCategory {
    if notional >= buckets.huge {
        FlowCategory::XXL
    } else if notional >= buckets.extra_large {
        FlowCategory::XL
    } else if notional >= buckets.large {
        FlowCategory::L
    } else if notional >= buckets.medium {
        FlowCategory::M
    } else {
        FlowCategory::None
    }
}
