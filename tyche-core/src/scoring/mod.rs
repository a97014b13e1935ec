//! Angle-to-score table
//!
//! Maps an angular position, in revolutions, to a discrete score bucket.
//! Positions are first reduced to a single revolution, converted to
//! degrees, and then matched against ascending upper bounds; the first
//! band whose bound exceeds the angle wins.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of bands in a score table
pub const MAX_BANDS: usize = 16;

/// Scores a table is allowed to produce
pub const VALID_SCORES: [u8; 6] = [2, 3, 4, 6, 7, 8];

/// Degrees in one revolution
pub const DEGREES_PER_REV: f32 = 360.0;

/// Default bands as (upper bound in degrees, score)
const DEFAULT_BANDS: [ScoreBand; 7] = [
    ScoreBand::new(45.0, 4),
    ScoreBand::new(90.0, 3),
    ScoreBand::new(170.0, 2),
    ScoreBand::new(180.0, 8),
    ScoreBand::new(225.0, 6),
    ScoreBand::new(270.0, 6),
    ScoreBand::new(330.0, 2),
];

/// Score for angles at or past the last band
const DEFAULT_FALLBACK: u8 = 7;

/// One half-open band of the score table
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreBand {
    /// Exclusive upper bound in degrees
    pub below: f32,
    /// Score for angles under `below` (and at or over the previous bound)
    pub score: u8,
}

impl ScoreBand {
    /// Create a band
    pub const fn new(below: f32, score: u8) -> Self {
        Self { below, score }
    }
}

/// Ordered angle-to-score table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScoreTable {
    /// Bands in ascending order of `below`
    pub bands: Vec<ScoreBand, MAX_BANDS>,
    /// Score for angles not covered by any band
    pub fallback: u8,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            bands: Vec::from_slice(&DEFAULT_BANDS).unwrap_or_default(),
            fallback: DEFAULT_FALLBACK,
        }
    }
}

impl ScoreTable {
    /// Score for a position in revolutions
    ///
    /// Total over every `f32`: the position is normalized first, and
    /// non-finite input is treated as zero.
    pub fn score_for(&self, position: f32) -> u8 {
        let degrees = normalize_revolutions(position) * DEGREES_PER_REV;

        self.bands
            .iter()
            .find(|band| degrees < band.below)
            .map(|band| band.score)
            .unwrap_or(self.fallback)
    }

    /// Check that bounds ascend strictly within [0, 360]
    pub fn is_ascending(&self) -> bool {
        let mut previous = 0.0f32;
        for band in &self.bands {
            if !(band.below > previous && band.below <= DEGREES_PER_REV) {
                return false;
            }
            previous = band.below;
        }
        true
    }

    /// Check that every score in the table is a valid score
    pub fn scores_valid(&self) -> bool {
        self.bands
            .iter()
            .map(|band| band.score)
            .chain(core::iter::once(self.fallback))
            .all(is_valid_score)
    }
}

/// Check if a score belongs to the valid score set
pub fn is_valid_score(score: u8) -> bool {
    VALID_SCORES.contains(&score)
}

/// Reduce a position in revolutions to the range [0, 1)
///
/// Whole revolutions are removed, and a negative remainder is shifted up
/// by one revolution. Non-finite input maps to 0.
pub fn normalize_revolutions(position: f32) -> f32 {
    if !position.is_finite() {
        return 0.0;
    }

    let mut rev = position % 1.0;
    if rev < 0.0 {
        rev += 1.0;
    }
    // A tiny negative remainder can round up to exactly one revolution
    if rev >= 1.0 {
        rev = 0.0;
    }
    rev
}

/// Score for a position using the default table
pub fn score_for(position: f32) -> u8 {
    ScoreTable::default().score_for(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_table_shape() {
        let table = ScoreTable::default();
        assert_eq!(table.bands.len(), 7);
        assert_eq!(table.fallback, 7);
        assert!(table.is_ascending());
        assert!(table.scores_valid());
    }

    #[test]
    fn test_band_edges() {
        let table = ScoreTable::default();
        let at = |deg: f32| table.score_for(deg / 360.0);

        assert_eq!(at(0.0), 4);
        assert_eq!(at(44.0), 4);
        assert_eq!(at(45.0), 3);
        assert_eq!(at(89.0), 3);
        assert_eq!(at(90.0), 2);
        assert_eq!(at(169.0), 2);
        assert_eq!(at(175.0), 8);
        assert_eq!(at(180.0), 6);
        assert_eq!(at(250.0), 6);
        assert_eq!(at(300.0), 2);
        assert_eq!(at(331.0), 7);
        assert_eq!(at(359.0), 7);
    }

    #[test]
    fn test_multi_turn_position() {
        // 1.25 rev reduces to 90 degrees, which is past the `< 90` band
        assert_eq!(normalize_revolutions(1.25), 0.25);
        assert_eq!(score_for(1.25), 2);
    }

    #[test]
    fn test_negative_position() {
        // -0.1 rev reduces to 0.9 rev = 324 degrees
        let rev = normalize_revolutions(-0.1);
        assert!((rev - 0.9).abs() < 1e-6);
        assert_eq!(score_for(-0.1), 2);
    }

    #[test]
    fn test_normalize_edges() {
        assert_eq!(normalize_revolutions(0.0), 0.0);
        assert_eq!(normalize_revolutions(1.0), 0.0);
        assert_eq!(normalize_revolutions(-1.0), 0.0);
        assert_eq!(normalize_revolutions(-0.25), 0.75);
        assert_eq!(normalize_revolutions(f32::NAN), 0.0);
        assert_eq!(normalize_revolutions(f32::INFINITY), 0.0);
        assert_eq!(normalize_revolutions(-1.0e-9), 0.0);
    }

    #[test]
    fn test_custom_table() {
        let mut table = ScoreTable {
            bands: Vec::new(),
            fallback: 8,
        };
        table.bands.push(ScoreBand::new(180.0, 2)).unwrap();

        assert_eq!(table.score_for(0.25), 2);
        assert_eq!(table.score_for(0.75), 8);
    }

    #[test]
    fn test_rejects_unordered_bands() {
        let mut table = ScoreTable::default();
        table.bands[3].below = 100.0;
        assert!(!table.is_ascending());

        let mut table = ScoreTable::default();
        table.bands[6].below = 400.0;
        assert!(!table.is_ascending());
    }

    #[test]
    fn test_rejects_invalid_score() {
        let mut table = ScoreTable::default();
        table.fallback = 5;
        assert!(!table.scores_valid());
    }

    proptest! {
        #[test]
        fn prop_score_total_and_in_set(position in any::<f32>()) {
            let score = score_for(position);
            prop_assert!(is_valid_score(score));
        }

        #[test]
        fn prop_normalized_in_unit_range(position in -1.0e6f32..1.0e6) {
            let rev = normalize_revolutions(position);
            prop_assert!((0.0..1.0).contains(&rev));
        }

        #[test]
        fn prop_whole_revolutions_invariant(n in 0u32..4096, k in -1000i32..1000) {
            // n/4096 + k is exact in f32 over this range
            let base = n as f32 / 4096.0;
            let shifted = base + k as f32;
            prop_assert_eq!(score_for(shifted), score_for(base));
        }
    }
}
