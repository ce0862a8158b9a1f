//! Cross-instrument regime gate.
//!
//! A bearish confirmation on any reference instrument vetoes bullish alerts
//! on every non-reference instrument for the run. The veto is one-way:
//! bullish references never block bearish alerts.

use crate::types::Direction;
use std::collections::HashMap;
use tracing::info;

pub struct RegimeGate {
    reference: Vec<String>,
}

impl RegimeGate {
    pub fn new(reference: &[String]) -> Self {
        Self {
            reference: reference.iter().map(|r| r.to_uppercase()).collect(),
        }
    }

    pub fn is_reference(&self, instrument: &str) -> bool {
        let instrument = instrument.to_uppercase();
        self.reference.iter().any(|r| *r == instrument)
    }

    /// Whether any reference instrument is confirmed DOWN.
    pub fn blocks_longs(&self, directions: &HashMap<String, Option<Direction>>) -> bool {
        directions
            .iter()
            .any(|(instrument, direction)| {
                *direction == Some(Direction::Down) && self.is_reference(instrument)
            })
    }

    /// Suppress flag per instrument. Must run after every instrument is analyzed.
    pub fn evaluate(&self, directions: &HashMap<String, Option<Direction>>) -> HashMap<String, bool> {
        let block = self.blocks_longs(directions);
        if block {
            info!("Reference instrument bearish, suppressing bullish alerts on others");
        }

        directions
            .iter()
            .map(|(instrument, direction)| {
                let suppress = block
                    && *direction == Some(Direction::Up)
                    && !self.is_reference(instrument);
                (instrument.clone(), suppress)
            })
            .collect()
    }
}
