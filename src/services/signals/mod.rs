//! Trend confirmation and level engine.
//!
//! Data flows enrichment -> swings -> structure -> confirmation per
//! instrument and timeframe; levels and alert classification consume the
//! confirmed result.

pub mod classifier;
pub mod confirmation;
pub mod enriched;
pub mod indicators;
pub mod levels;
pub mod structure;
pub mod swings;

pub use classifier::{is_reentry, strength_label, trend_change};
pub use confirmation::{gated_flow_direction, TrendScorer};
pub use enriched::EnrichedSeries;
pub use levels::{levels_for, LevelPolicy, Levels};
pub use swings::{SwingFlag, SwingFlags};
