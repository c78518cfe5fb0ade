//! Benchmark long-term interest rate series (10-year treasury) from the FRED
//! observations API. Requires an API key in `FRED_API_KEY`.

use crate::core::config::FRED_API_KEY_ENV;
use crate::core::series::ObservationSeries;
use crate::core::status::Source;
use crate::fetch::{FetchError, RemoteSource};
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

/// 10-Year Treasury constant maturity rate.
const RATE_SERIES_ID: &str = "DGS10";

pub struct FredSource {
    base_url: String,
    lookback_years: u32,
    api_key: Option<String>,
}

impl FredSource {
    pub fn new(base_url: &str, lookback_years: u32) -> Self {
        FredSource {
            base_url: base_url.to_string(),
            lookback_years,
            api_key: std::env::var(FRED_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
        }
    }
}

#[derive(Deserialize, Debug)]
struct FredResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Deserialize, Debug)]
struct FredObservation {
    date: String,
    /// Holidays and data gaps come through as ".".
    value: String,
}

#[async_trait]
impl RemoteSource for FredSource {
    type Payload = ObservationSeries;

    fn source(&self) -> Source {
        Source::InterestRates
    }

    fn cache_key(&self) -> String {
        format!("rates_dgs10_{}y", self.lookback_years)
    }

    #[instrument(name = "RateSeriesFetch", skip(self))]
    async fn pull(&self) -> Result<ObservationSeries, FetchError> {
        let Some(api_key) = &self.api_key else {
            return Err(FetchError::MissingCredential(format!(
                "{FRED_API_KEY_ENV} not set"
            )));
        };

        let start_date =
            Utc::now().date_naive() - Duration::days(i64::from(self.lookback_years) * 365);
        let url = format!(
            "{}/fred/series/observations?series_id={}&api_key={}&file_type=json&observation_start={}",
            self.base_url, RATE_SERIES_ID, api_key, start_date
        );
        debug!("Requesting rate series {}", RATE_SERIES_ID);

        let client = http_client()?;
        let data: FredResponse = get_json(&client, &url).await?;

        let points: Vec<(NaiveDate, f64)> = data
            .observations
            .iter()
            .filter_map(|obs| {
                let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
                let value: f64 = obs.value.parse().ok()?;
                Some((date, value))
            })
            .collect();

        if points.is_empty() {
            return Err(FetchError::Malformed(
                "FRED response contained no usable observations".to_string(),
            ));
        }
        Ok(ObservationSeries::from_points(points))
    }
}
