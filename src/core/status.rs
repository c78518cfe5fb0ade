//! Per-source health reporting.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The five external data sources feeding the pipeline, one per indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    SectorPrices,
    Valuation,
    Employment,
    RdIntensity,
    InterestRates,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::SectorPrices,
        Source::Valuation,
        Source::Employment,
        Source::RdIntensity,
        Source::InterestRates,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Source::SectorPrices => "sector_prices",
            Source::Valuation => "valuation",
            Source::Employment => "employment",
            Source::RdIntensity => "rd_intensity",
            Source::InterestRates => "interest_rates",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Health of a source. Ordering is by severity so `max()` folds a set of
/// statuses into the overall one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Ok,
    Warning,
    Error,
}

impl Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            HealthState::Ok => "ok",
            HealthState::Warning => "warning",
            HealthState::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// Produced fresh on every fetch or quality check; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub source: Source,
    pub state: HealthState,
    pub message: Option<String>,
}

impl SourceStatus {
    pub fn ok(source: Source) -> Self {
        SourceStatus {
            source,
            state: HealthState::Ok,
            message: None,
        }
    }

    pub fn warning(source: Source, message: impl Into<String>) -> Self {
        SourceStatus {
            source,
            state: HealthState::Warning,
            message: Some(message.into()),
        }
    }

    pub fn error(source: Source, message: impl Into<String>) -> Self {
        SourceStatus {
            source,
            state: HealthState::Error,
            message: Some(message.into()),
        }
    }
}
