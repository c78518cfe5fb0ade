//! Composite scoring and ranking: weighted combination of the normalized
//! indicator scores, plus the summary report built on top of the ranking.

use crate::core::indicator::{Indicator, Weights};
use crate::normalize::{self, IndicatorScores};
use crate::signals::{DisplayMetrics, SignalSet};
use serde::Serialize;
use std::collections::BTreeMap;

/// Complete scoring breakdown for one sector. Value data: rebuilt on every
/// scoring pass, never mutated in place.
#[derive(Debug, Clone, Serialize)]
pub struct SectorScore {
    pub sector: String,
    pub opportunity_score: f64,
    pub rank: usize,
    pub momentum_score: f64,
    pub valuation_score: f64,
    pub growth_score: f64,
    pub innovation_score: f64,
    pub macro_score: f64,
    #[serde(flatten)]
    pub metrics: DisplayMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoresResponse {
    pub scores: Vec<SectorScore>,
    pub weights_used: BTreeMap<String, f64>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSector {
    pub rank: usize,
    pub sector: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreDistribution {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub spread: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub top_sectors: Vec<RankedSector>,
    pub bottom_sectors: Vec<RankedSector>,
    pub score_distribution: ScoreDistribution,
    pub top_sector_drivers: BTreeMap<String, String>,
    pub weights_used: BTreeMap<String, f64>,
    pub timestamp: String,
}

/// Weighted composite of one sector's indicator scores.
pub fn composite(scores: &IndicatorScores, weights: &Weights) -> f64 {
    Indicator::ALL
        .into_iter()
        .map(|indicator| weights.get(indicator) * scores.get(indicator))
        .sum()
}

/// Normalizes, combines and ranks. Returns all 11 sectors ordered by rank;
/// rank 1 is the highest composite, ties resolve by sector name so the
/// ordering is deterministic.
pub fn rank(signals: &SignalSet, weights: &Weights) -> Vec<SectorScore> {
    let table = normalize::score_table(&signals.raw);

    let mut scores: Vec<SectorScore> = table
        .iter()
        .map(|(sector, indicator_scores)| SectorScore {
            sector: sector.name().to_string(),
            opportunity_score: round2(composite(indicator_scores, weights)),
            rank: 0,
            momentum_score: indicator_scores.momentum,
            valuation_score: indicator_scores.valuation,
            growth_score: indicator_scores.growth,
            innovation_score: indicator_scores.innovation,
            macro_score: indicator_scores.macro_sensitivity,
            metrics: signals.display.get(sector).cloned().unwrap_or_default(),
        })
        .collect();

    scores.sort_by(|a, b| {
        b.opportunity_score
            .total_cmp(&a.opportunity_score)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    for (position, score) in scores.iter_mut().enumerate() {
        score.rank = position + 1;
    }
    scores
}

/// Builds the summary report from a ranked score list.
pub fn summarize(
    scores: &[SectorScore],
    weights_used: BTreeMap<String, f64>,
    timestamp: String,
) -> SummaryResponse {
    let ranked = |score: &SectorScore| RankedSector {
        rank: score.rank,
        sector: score.sector.clone(),
        score: score.opportunity_score,
    };

    let top_sectors: Vec<_> = scores.iter().take(3).map(ranked).collect();
    let bottom_sectors: Vec<_> = scores.iter().rev().take(3).rev().map(ranked).collect();

    let values: Vec<f64> = scores.iter().map(|s| s.opportunity_score).collect();
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let average = values.iter().sum::<f64>() / values.len().max(1) as f64;

    let top_sector_drivers = scores
        .iter()
        .take(3)
        .map(|score| (score.sector.clone(), dominant_driver(score)))
        .collect();

    SummaryResponse {
        top_sectors,
        bottom_sectors,
        score_distribution: ScoreDistribution {
            average: round2(average),
            max: round2(max),
            min: round2(min),
            spread: round2(max - min),
        },
        top_sector_drivers,
        weights_used,
        timestamp,
    }
}

/// Free-text explanation of the strongest component behind a score.
fn dominant_driver(score: &SectorScore) -> String {
    let components = [
        (score.momentum_score, "strong price momentum"),
        (score.valuation_score, "attractive valuation"),
        (score.growth_score, "employment growth"),
        (score.innovation_score, "high R&D intensity"),
        (score.macro_score, "rate resilience"),
    ];
    let (value, label) = components
        .into_iter()
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .unwrap_or((normalize::NEUTRAL_SCORE, "balanced signals"));
    format!("{label} ({value:.1})")
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sector::Sector;
    use crate::signals::RawSignals;
    use std::collections::HashMap;

    fn signals_with_momentum(pairs: &[(Sector, f64)]) -> SignalSet {
        let mut raw = RawSignals::default();
        for (sector, value) in pairs {
            raw.momentum.insert(*sector, *value);
        }
        SignalSet {
            raw,
            display: BTreeMap::new(),
        }
    }

    #[test]
    fn test_composite_with_default_weights() {
        let scores = IndicatorScores {
            momentum: 80.0,
            valuation: 60.0,
            growth: 40.0,
            innovation: 70.0,
            macro_sensitivity: 50.0,
        };
        let value = composite(&scores, &Weights::defaults());
        // 0.25*80 + 0.20*60 + 0.20*40 + 0.20*70 + 0.15*50
        assert!((value - 61.5).abs() < 1e-9);
    }

    #[test]
    fn test_ranks_are_a_gapless_permutation() {
        let signals = signals_with_momentum(&[
            (Sector::Energy, 30.0),
            (Sector::Utilities, -10.0),
            (Sector::Financials, 12.0),
        ]);
        let scores = rank(&signals, &Weights::defaults());

        assert_eq!(scores.len(), 11);
        let mut ranks: Vec<usize> = scores.iter().map(|s| s.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=11).collect::<Vec<_>>());

        for pair in scores.windows(2) {
            assert!(pair[0].opportunity_score >= pair[1].opportunity_score);
        }
    }

    #[test]
    fn test_ties_break_by_sector_name() {
        // No raw data anywhere: every sector is all-neutral and composite 50.
        let signals = SignalSet::default();
        let scores = rank(&signals, &Weights::defaults());

        assert!(scores.iter().all(|s| s.opportunity_score == 50.0));
        assert_eq!(scores[0].sector, "Communication Services");
        assert_eq!(scores[10].sector, "Utilities");
        assert_eq!(scores[0].rank, 1);
    }

    #[test]
    fn test_momentum_only_weights_reduce_to_momentum_score() {
        let signals = signals_with_momentum(&[
            (Sector::Energy, 25.0),
            (Sector::Utilities, -5.0),
            (Sector::Financials, 10.0),
        ]);
        let weights = Weights::from_partial(&HashMap::from([("momentum".to_string(), 1.0)]));
        let scores = rank(&signals, &weights);

        for score in scores {
            assert_eq!(score.opportunity_score, score.momentum_score);
        }
    }

    #[test]
    fn test_absent_source_yields_full_scores_with_neutral_component() {
        let signals = signals_with_momentum(&[
            (Sector::Energy, 25.0),
            (Sector::Utilities, -5.0),
        ]);
        let scores = rank(&signals, &Weights::defaults());

        // Every sector gets a full score even though four sources are gone.
        assert_eq!(scores.len(), 11);
        for score in &scores {
            assert_eq!(score.valuation_score, 50.0);
            assert_eq!(score.growth_score, 50.0);
            assert_eq!(score.innovation_score, 50.0);
            assert_eq!(score.macro_score, 50.0);
        }
        let energy = scores.iter().find(|s| s.sector == "Energy").unwrap();
        assert!(energy.momentum_score > 50.0);
    }

    #[test]
    fn test_summarize_shape() {
        let signals = signals_with_momentum(&[
            (Sector::Energy, 30.0),
            (Sector::Utilities, -10.0),
            (Sector::Financials, 12.0),
        ]);
        let scores = rank(&signals, &Weights::defaults());
        let summary = summarize(
            &scores,
            Weights::defaults().to_map(),
            "2024-01-01T00:00:00Z".to_string(),
        );

        assert_eq!(summary.top_sectors.len(), 3);
        assert_eq!(summary.bottom_sectors.len(), 3);
        assert_eq!(summary.top_sectors[0].rank, 1);
        assert_eq!(summary.bottom_sectors[2].rank, 11);
        assert!(summary.score_distribution.max >= summary.score_distribution.min);
        assert!(
            (summary.score_distribution.spread
                - (summary.score_distribution.max - summary.score_distribution.min))
                .abs()
                < 1e-9
        );
        assert_eq!(summary.top_sector_drivers.len(), 3);
        assert!(
            summary.top_sector_drivers["Energy"].contains("momentum"),
            "top sector is driven by momentum: {:?}",
            summary.top_sector_drivers
        );
    }

    #[test]
    fn test_scores_serialize_with_flattened_metrics() {
        let signals = signals_with_momentum(&[(Sector::Energy, 10.0), (Sector::Utilities, 0.0)]);
        let scores = rank(&signals, &Weights::defaults());
        let json = serde_json::to_value(&scores[0]).unwrap();

        assert!(json.get("opportunity_score").is_some());
        assert!(json.get("forward_pe").is_some());
        assert!(json.get("metrics").is_none());
    }
}
