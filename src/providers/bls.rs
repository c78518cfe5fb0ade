//! Monthly employment series per sector, from the BLS v2 timeseries API.
//!
//! Works without an API key on the public rate-limited tier; a key from
//! `BLS_API_KEY` lifts the limits.

use crate::core::config::BLS_API_KEY_ENV;
use crate::core::sector::Sector;
use crate::core::series::{ObservationSeries, SectorSeriesMap};
use crate::core::status::Source;
use crate::fetch::{FetchError, RemoteSource};
use crate::providers::util::http_client;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub struct BlsSource {
    base_url: String,
    lookback_years: u32,
    api_key: Option<String>,
}

impl BlsSource {
    pub fn new(base_url: &str, lookback_years: u32) -> Self {
        BlsSource {
            base_url: base_url.to_string(),
            lookback_years,
            api_key: std::env::var(BLS_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Serialize, Debug)]
struct BlsRequest {
    seriesid: Vec<String>,
    startyear: String,
    endyear: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    registrationkey: Option<String>,
}

#[derive(Deserialize, Debug)]
struct BlsResponse {
    status: String,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: Option<BlsResults>,
}

#[derive(Deserialize, Debug, Default)]
struct BlsResults {
    #[serde(default)]
    series: Vec<BlsSeries>,
}

#[derive(Deserialize, Debug)]
struct BlsSeries {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    data: Vec<BlsPoint>,
}

#[derive(Deserialize, Debug)]
struct BlsPoint {
    year: String,
    /// `M01`..`M12`; `M13` is the annual average and is skipped.
    period: String,
    value: String,
}

fn parse_point(point: &BlsPoint) -> Option<(NaiveDate, f64)> {
    let month: u32 = point.period.strip_prefix('M')?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    let year: i32 = point.year.parse().ok()?;
    let value: f64 = point.value.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some((date, value))
}

#[async_trait]
impl RemoteSource for BlsSource {
    type Payload = SectorSeriesMap;

    fn source(&self) -> Source {
        Source::Employment
    }

    fn cache_key(&self) -> String {
        format!("employment_{}y", self.lookback_years)
    }

    fn credential_warning(&self) -> Option<String> {
        if self.api_key.is_none() {
            Some(format!(
                "{BLS_API_KEY_ENV} not set; using the unauthenticated rate-limited tier"
            ))
        } else {
            None
        }
    }

    #[instrument(name = "EmploymentFetch", skip(self))]
    async fn pull(&self) -> Result<SectorSeriesMap, FetchError> {
        let end_year = Utc::now().year();
        let request = BlsRequest {
            seriesid: Sector::ALL
                .iter()
                .map(|s| s.bls_series().to_string())
                .collect(),
            startyear: (end_year - self.lookback_years as i32).to_string(),
            endyear: end_year.to_string(),
            registrationkey: self.api_key.clone(),
        };

        let url = format!("{}/publicAPI/v2/timeseries/data/", self.base_url);
        debug!("Requesting employment data from {}", url);

        let client = http_client()?;
        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(format!("request error for {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!("HTTP {status} for {url}")));
        }

        let data: BlsResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("failed to decode BLS response: {e}")))?;

        if data.status != "REQUEST_SUCCEEDED" {
            return Err(FetchError::Unavailable(format!(
                "BLS API error: {}",
                data.message.join("; ")
            )));
        }

        let mut employment = SectorSeriesMap::new();
        for series in data.results.unwrap_or_default().series {
            let Some(sector) = Sector::from_bls_series(&series.series_id) else {
                debug!("Ignoring unknown BLS series {}", series.series_id);
                continue;
            };
            let points: Vec<_> = series.data.iter().filter_map(parse_point).collect();
            if points.is_empty() {
                continue;
            }
            employment.insert(sector, ObservationSeries::from_points(points));
        }

        if employment.is_empty() {
            return Err(FetchError::Malformed(
                "BLS response contained no usable series".to_string(),
            ));
        }
        Ok(employment)
    }
}
