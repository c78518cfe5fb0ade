//! Orchestration: owns one fetcher per source plus the cache store, fans
//! fetches out concurrently, and exposes the scoring, summary, quality and
//! cache operations consumed by the CLI (or any other frontend).

use crate::core::cache::{CacheInfo, CacheStore};
use crate::core::config::AppConfig;
use crate::core::indicator::Weights;
use crate::core::series::{ObservationSeries, PriceDataset, SectorSeriesMap, SectorValueMap};
use crate::core::status::{HealthState, SourceStatus};
use crate::fetch::SourceFetcher;
use crate::providers::bls::BlsSource;
use crate::providers::damodaran::DamodaranSource;
use crate::providers::fred::FredSource;
use crate::providers::yahoo_chart::YahooChartSource;
use crate::providers::yahoo_quote::YahooQuoteSource;
use crate::quality::DataQualityReport;
use crate::scoring::{self, ScoresResponse, SummaryResponse};
use crate::signals::{self, MarketData};
use anyhow::{Result, bail};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct ClearResult {
    pub files_removed: usize,
    pub message: String,
}

/// Stateless between requests apart from the cache store: every scoring call
/// fetches (or re-reads) its own data and builds fresh value objects.
pub struct Analyzer {
    prices: SourceFetcher<PriceDataset>,
    valuations: SourceFetcher<SectorValueMap>,
    employment: SourceFetcher<SectorSeriesMap>,
    rd_intensity: SourceFetcher<SectorValueMap>,
    rates: SourceFetcher<ObservationSeries>,
    cache: Arc<dyn CacheStore>,
}

impl Analyzer {
    pub fn new(config: &AppConfig, cache: Arc<dyn CacheStore>) -> Self {
        let ttl = config.cache_ttl();
        let years = config.lookback_years;

        let yahoo_base = config
            .providers
            .yahoo
            .as_ref()
            .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
        let bls_base = config
            .providers
            .bls
            .as_ref()
            .map_or("https://api.bls.gov", |p| &p.base_url);
        let fred_base = config
            .providers
            .fred
            .as_ref()
            .map_or("https://api.stlouisfed.org", |p| &p.base_url);
        let damodaran_base = config
            .providers
            .damodaran
            .as_ref()
            .map_or("https://pages.stern.nyu.edu", |p| &p.base_url);

        Analyzer {
            prices: SourceFetcher::new(
                Arc::new(YahooChartSource::new(yahoo_base, years)),
                Arc::clone(&cache),
                ttl,
            ),
            valuations: SourceFetcher::new(
                Arc::new(YahooQuoteSource::new(yahoo_base)),
                Arc::clone(&cache),
                ttl,
            ),
            employment: SourceFetcher::new(
                Arc::new(BlsSource::new(bls_base, years)),
                Arc::clone(&cache),
                ttl,
            ),
            rd_intensity: SourceFetcher::new(
                Arc::new(DamodaranSource::new(damodaran_base)),
                Arc::clone(&cache),
                ttl,
            ),
            rates: SourceFetcher::new(
                Arc::new(FredSource::new(fred_base, years)),
                Arc::clone(&cache),
                ttl,
            ),
            cache,
        }
    }

    /// Runs all five fetchers concurrently. Per-source failures surface only
    /// in the returned statuses; a hung source is bounded by the fetcher's
    /// own timeout and cannot stall the others past it.
    async fn gather(&self, refresh: bool) -> (MarketData, Vec<SourceStatus>) {
        let (prices, valuations, employment, rd_intensity, rates) = tokio::join!(
            self.prices.fetch(refresh),
            self.valuations.fetch(refresh),
            self.employment.fetch(refresh),
            self.rd_intensity.fetch(refresh),
            self.rates.fetch(refresh),
        );

        let statuses = vec![
            prices.status,
            valuations.status,
            employment.status,
            rd_intensity.status,
            rates.status,
        ];
        for status in &statuses {
            if status.state != HealthState::Ok {
                warn!(
                    "Source {} degraded to {}: {}",
                    status.source,
                    status.state,
                    status.message.as_deref().unwrap_or("")
                );
            }
        }

        let data = MarketData {
            prices: prices.data,
            valuations: valuations.data,
            employment: employment.data,
            rd_intensity: rd_intensity.data,
            rates: rates.data,
        };
        (data, statuses)
    }

    /// Scores and ranks all sectors. Fails only when not a single source
    /// produced data (fresh, cached or stale); anything less severe degrades
    /// to neutral component scores instead.
    pub async fn get_scores(
        &self,
        weights: &HashMap<String, f64>,
        refresh: bool,
    ) -> Result<ScoresResponse> {
        let weights = Weights::from_partial(weights);
        let (data, _statuses) = self.gather(refresh).await;
        if data.is_empty() {
            bail!("no data available from any source");
        }

        let signal_set = signals::compute(&data);
        let scores = scoring::rank(&signal_set, &weights);
        Ok(ScoresResponse {
            scores,
            weights_used: weights.to_map(),
            timestamp: now_timestamp(),
        })
    }

    pub async fn get_summary(&self, weights: &HashMap<String, f64>) -> Result<SummaryResponse> {
        let response = self.get_scores(weights, false).await?;
        Ok(scoring::summarize(
            &response.scores,
            response.weights_used,
            response.timestamp,
        ))
    }

    /// Probes every source through its normal cache-first path (no forced
    /// refresh) and reports per-source plus overall health.
    pub async fn data_quality(&self) -> DataQualityReport {
        let (_, statuses) = self.gather(false).await;
        DataQualityReport::new(statuses)
    }

    pub async fn cache_info(&self) -> CacheInfo {
        self.cache.info().await
    }

    pub async fn clear_cache(&self) -> ClearResult {
        let files_removed = self.cache.clear().await;
        ClearResult {
            files_removed,
            message: format!("Removed {files_removed} cached files"),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_fetchers(
        prices: SourceFetcher<PriceDataset>,
        valuations: SourceFetcher<SectorValueMap>,
        employment: SourceFetcher<SectorSeriesMap>,
        rd_intensity: SourceFetcher<SectorValueMap>,
        rates: SourceFetcher<ObservationSeries>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Analyzer {
            prices,
            valuations,
            employment,
            rd_intensity,
            rates,
            cache,
        }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
