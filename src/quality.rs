//! Data-quality aggregation over the per-source statuses.

use crate::core::status::{HealthState, SourceStatus};
use serde::Serialize;

/// Snapshot of every source's health plus the worst-of overall state.
#[derive(Debug, Clone, Serialize)]
pub struct DataQualityReport {
    pub sources: Vec<SourceStatus>,
    pub overall_status: HealthState,
}

impl DataQualityReport {
    pub fn new(sources: Vec<SourceStatus>) -> Self {
        let overall_status = overall(&sources);
        DataQualityReport {
            sources,
            overall_status,
        }
    }
}

/// Folds statuses with precedence error > warning > ok. An empty set is ok.
pub fn overall(statuses: &[SourceStatus]) -> HealthState {
    statuses
        .iter()
        .map(|status| status.state)
        .max()
        .unwrap_or(HealthState::Ok)
}
