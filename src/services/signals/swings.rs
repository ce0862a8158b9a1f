//! Swing point detection.
//!
//! A bar is a swing high when its high strictly exceeds the highs of the
//! `look` bars on each side (swing lows mirror this on lows). The first and
//! last `look` bars are never swings, so the freshest pivot only appears
//! once `look` later bars exist.
//!
//! Queries "up to idx" only return swings whose whole neighbor window lies at
//! or before `idx`, so anything computed at `idx` is unaffected by later bars.

use super::enriched::EnrichedSeries;
use serde::{Deserialize, Serialize};

/// Swing flags for one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingFlag {
    pub swing_high: bool,
    pub swing_low: bool,
}

/// Flags for every bar of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwingFlags {
    flags: Vec<SwingFlag>,
    look: usize,
}

impl SwingFlags {
    /// Detect swings on `series` with `look` neighbors per side.
    pub fn detect(series: &EnrichedSeries, look: usize) -> Self {
        let n = series.len();
        let mut flags = vec![SwingFlag::default(); n];

        if look == 0 || n < 2 * look + 1 {
            return Self { flags, look };
        }

        for i in look..n - look {
            let high = series.high(i);
            let low = series.low(i);
            let neighbors = (i - look..i).chain(i + 1..=i + look);

            let mut is_high = true;
            let mut is_low = true;
            for j in neighbors {
                is_high &= high > series.high(j);
                is_low &= low < series.low(j);
            }

            flags[i] = SwingFlag {
                swing_high: is_high,
                swing_low: is_low,
            };
        }

        Self { flags, look }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn is_swing_high(&self, idx: usize) -> bool {
        self.flags.get(idx).is_some_and(|f| f.swing_high)
    }

    pub fn is_swing_low(&self, idx: usize) -> bool {
        self.flags.get(idx).is_some_and(|f| f.swing_low)
    }

    /// Swing high indices visible at `idx` (index + look <= idx), oldest first.
    pub fn highs_up_to(&self, idx: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.indices_up_to(idx, |f| f.swing_high)
    }

    /// Swing low indices visible at `idx` (index + look <= idx), oldest first.
    pub fn lows_up_to(&self, idx: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.indices_up_to(idx, |f| f.swing_low)
    }

    fn indices_up_to(
        &self,
        idx: usize,
        pick: fn(&SwingFlag) -> bool,
    ) -> impl DoubleEndedIterator<Item = usize> + '_ {
        let end = idx
            .saturating_add(1)
            .saturating_sub(self.look)
            .min(self.flags.len());
        self.flags[..end]
            .iter()
            .enumerate()
            .filter(move |(_, f)| pick(f))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::types::Candle;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn series_from_hl(points: &[(f64, f64)]) -> EnrichedSeries {
        let candles: Vec<Candle> = points
            .iter()
            .enumerate()
            .map(|(i, &(h, l))| Candle::new(i as i64, (h + l) / 2.0, h, l, (h + l) / 2.0, 1.0))
            .collect();
        EnrichedSeries::new(&candles, &EngineConfig::default())
    }

    #[test]
    fn test_detects_peak_and_trough() {
        let series = series_from_hl(&[
            (10.0, 5.0),
            (11.0, 6.0),
            (15.0, 7.0),
            (11.0, 6.0),
            (10.0, 2.0),
            (11.0, 4.0),
            (12.0, 5.0),
        ]);
        let flags = SwingFlags::detect(&series, 2);
        assert!(flags.is_swing_high(2));
        assert!(flags.is_swing_low(4));
        assert!(!flags.is_swing_high(3));
    }

    #[test]
    fn test_boundaries_never_flagged() {
        // Extremes sit at the edges
        let series = series_from_hl(&[(20.0, 1.0), (10.0, 5.0), (10.0, 5.0), (10.0, 5.0), (30.0, 0.5)]);
        let flags = SwingFlags::detect(&series, 2);
        assert_eq!(flags.len(), 5);
        for i in [0, 1, 3, 4] {
            assert!(!flags.is_swing_high(i) && !flags.is_swing_low(i));
        }
    }

    #[test]
    fn test_equal_neighbor_is_not_swing() {
        let series = series_from_hl(&[(10.0, 5.0), (12.0, 5.0), (12.0, 5.0), (11.0, 5.0), (10.0, 5.0)]);
        let flags = SwingFlags::detect(&series, 2);
        assert!(!flags.is_swing_high(2));
        assert!(!flags.is_swing_low(2));
    }

    #[test]
    fn test_short_series_has_no_swings() {
        let series = series_from_hl(&[(10.0, 5.0), (12.0, 4.0), (10.0, 5.0)]);
        let flags = SwingFlags::detect(&series, 2);
        assert_eq!(flags.len(), 3);
        assert!((0..3).all(|i| !flags.is_swing_high(i) && !flags.is_swing_low(i)));
    }

    #[test]
    fn test_random_series_swing_property() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let points: Vec<(f64, f64)> = (0..120)
                .map(|_| {
                    let mid: f64 = rng.gen_range(90.0..110.0);
                    let spread: f64 = rng.gen_range(0.1..3.0);
                    (mid + spread, mid - spread)
                })
                .collect();
            let series = series_from_hl(&points);
            let flags = SwingFlags::detect(&series, 2);

            for i in 0..series.len() {
                if flags.is_swing_high(i) {
                    assert!(i >= 2 && i + 2 < series.len());
                    for j in [i - 2, i - 1, i + 1, i + 2] {
                        assert!(series.high(i) > series.high(j));
                    }
                }
                if flags.is_swing_low(i) {
                    assert!(i >= 2 && i + 2 < series.len());
                    for j in [i - 2, i - 1, i + 1, i + 2] {
                        assert!(series.low(i) < series.low(j));
                    }
                }
            }
        }
    }

    #[test]
    fn test_indices_up_to_is_causal() {
        let series = series_from_hl(&[
            (10.0, 5.0),
            (11.0, 6.0),
            (15.0, 7.0),
            (11.0, 6.0),
            (10.0, 6.0),
            (11.0, 6.5),
            (16.0, 7.0),
            (11.0, 6.5),
            (10.0, 6.5),
        ]);
        let flags = SwingFlags::detect(&series, 2);
        assert_eq!(flags.highs_up_to(5).collect::<Vec<_>>(), vec![2]);
        assert_eq!(flags.highs_up_to(8).collect::<Vec<_>>(), vec![2, 6]);
        assert_eq!(flags.highs_up_to(100).count(), 2);
    }
}
