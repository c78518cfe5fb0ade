//! Cross-sectional normalization: raw indicator values become comparable
//! 0-100 scores, z-scored against the sectors that have a value for the same
//! indicator.

use crate::core::indicator::{Direction, Indicator};
use crate::core::sector::Sector;
use crate::core::series::SectorValueMap;
use crate::signals::RawSignals;
use std::collections::BTreeMap;

/// Score given to a sector with no raw value for an indicator. Keeping
/// absent sectors at the neutral midpoint keeps the ranking total instead of
/// dropping sectors whenever one source degrades.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// How many score points one standard deviation is worth.
const Z_SPREAD: f64 = 15.0;

/// The five normalized scores for one sector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorScores {
    pub momentum: f64,
    pub valuation: f64,
    pub growth: f64,
    pub innovation: f64,
    pub macro_sensitivity: f64,
}

impl Default for IndicatorScores {
    fn default() -> Self {
        IndicatorScores {
            momentum: NEUTRAL_SCORE,
            valuation: NEUTRAL_SCORE,
            growth: NEUTRAL_SCORE,
            innovation: NEUTRAL_SCORE,
            macro_sensitivity: NEUTRAL_SCORE,
        }
    }
}

impl IndicatorScores {
    pub fn get(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::Momentum => self.momentum,
            Indicator::Valuation => self.valuation,
            Indicator::Growth => self.growth,
            Indicator::Innovation => self.innovation,
            Indicator::Macro => self.macro_sensitivity,
        }
    }

    fn set(&mut self, indicator: Indicator, score: f64) {
        match indicator {
            Indicator::Momentum => self.momentum = score,
            Indicator::Valuation => self.valuation = score,
            Indicator::Growth => self.growth = score,
            Indicator::Innovation => self.innovation = score,
            Indicator::Macro => self.macro_sensitivity = score,
        }
    }
}

/// Z-scores one indicator's raw values across the sectors that have one.
/// Sectors absent from the input are absent from the output; the neutral
/// fill happens in [`score_table`].
pub fn normalize_indicator(values: &SectorValueMap, direction: Direction) -> SectorValueMap {
    if values.is_empty() {
        return SectorValueMap::new();
    }

    let n = values.len() as f64;
    let mean = values.values().sum::<f64>() / n;
    let variance = values.values().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    values
        .iter()
        .map(|(&sector, &value)| {
            let score = if std_dev == 0.0 {
                NEUTRAL_SCORE
            } else {
                z_to_score((value - mean) / std_dev, direction)
            };
            (sector, round2(score))
        })
        .collect()
}

/// Normalizes every indicator and fills absent (sector, indicator) pairs
/// with the neutral score, so each of the 11 sectors ends up with a full
/// score set.
pub fn score_table(raw: &RawSignals) -> BTreeMap<Sector, IndicatorScores> {
    let mut table: BTreeMap<Sector, IndicatorScores> = Sector::ALL
        .into_iter()
        .map(|sector| (sector, IndicatorScores::default()))
        .collect();

    for indicator in Indicator::ALL {
        let normalized = normalize_indicator(raw.get(indicator), indicator.direction());
        for (sector, score) in normalized {
            if let Some(scores) = table.get_mut(&sector) {
                scores.set(indicator, score);
            }
        }
    }

    table
}

fn z_to_score(z: f64, direction: Direction) -> f64 {
    let score = match direction {
        Direction::HigherIsBetter => NEUTRAL_SCORE + Z_SPREAD * z,
        Direction::LowerIsBetter => NEUTRAL_SCORE - Z_SPREAD * z,
    };
    score.clamp(0.0, 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_transform_higher_is_better() {
        let values = SectorValueMap::from([(Sector::Energy, 10.0), (Sector::Utilities, 20.0)]);
        let scores = normalize_indicator(&values, Direction::HigherIsBetter);

        // Mean 15, population std 5: z = -1 and +1.
        assert_eq!(scores[&Sector::Energy], 35.0);
        assert_eq!(scores[&Sector::Utilities], 65.0);
    }

    #[test]
    fn test_z_transform_lower_is_better_inverts() {
        let values = SectorValueMap::from([(Sector::Energy, 10.0), (Sector::Utilities, 20.0)]);
        let scores = normalize_indicator(&values, Direction::LowerIsBetter);

        assert_eq!(scores[&Sector::Energy], 65.0);
        assert_eq!(scores[&Sector::Utilities], 35.0);
    }

    #[test]
    fn test_zero_spread_scores_neutral() {
        let values = SectorValueMap::from([
            (Sector::Energy, 7.0),
            (Sector::Utilities, 7.0),
            (Sector::Financials, 7.0),
        ]);
        let scores = normalize_indicator(&values, Direction::HigherIsBetter);
        assert!(scores.values().all(|&score| score == NEUTRAL_SCORE));
    }

    #[test]
    fn test_scores_clamped_to_range() {
        assert_eq!(z_to_score(5.0, Direction::HigherIsBetter), 100.0);
        assert_eq!(z_to_score(-5.0, Direction::HigherIsBetter), 0.0);
        assert_eq!(z_to_score(5.0, Direction::LowerIsBetter), 0.0);
    }

    #[test]
    fn test_empty_input_normalizes_to_empty() {
        assert!(normalize_indicator(&SectorValueMap::new(), Direction::HigherIsBetter).is_empty());
    }

    #[test]
    fn test_score_table_fills_absent_sectors_with_neutral() {
        let mut raw = RawSignals::default();
        raw.momentum.insert(Sector::Energy, 10.0);
        raw.momentum.insert(Sector::Utilities, 20.0);

        let table = score_table(&raw);
        assert_eq!(table.len(), 11);

        assert_eq!(table[&Sector::Energy].momentum, 35.0);
        assert_eq!(table[&Sector::Utilities].momentum, 65.0);
        // No momentum data for this sector, and no data at all for the other
        // indicators anywhere.
        assert_eq!(table[&Sector::Financials].momentum, NEUTRAL_SCORE);
        assert_eq!(table[&Sector::Energy].valuation, NEUTRAL_SCORE);
    }

    #[test]
    fn test_score_range_invariant() {
        let mut raw = RawSignals::default();
        for (i, sector) in Sector::ALL.into_iter().enumerate() {
            raw.momentum.insert(sector, (i as f64) * 13.7 - 40.0);
            raw.valuation.insert(sector, (i as f64).powi(3) + 1.0);
        }

        for scores in score_table(&raw).values() {
            for indicator in Indicator::ALL {
                let score = scores.get(indicator);
                assert!((0.0..=100.0).contains(&score));
            }
        }
    }
}
