//! Daily price/volume history for the sector ETFs and the market benchmark,
//! from the Yahoo Finance chart API.

use crate::core::sector::{MARKET_BENCHMARK, Sector};
use crate::core::series::{PriceDataset, PriceHistory};
use crate::core::status::Source;
use crate::fetch::{FetchError, RemoteSource};
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct YahooChartSource {
    base_url: String,
    lookback_years: u32,
}

impl YahooChartSource {
    pub fn new(base_url: &str, lookback_years: u32) -> Self {
        YahooChartSource {
            base_url: base_url.to_string(),
            lookback_years,
        }
    }

    async fn fetch_history(
        &self,
        client: &reqwest::Client,
        ticker: &str,
    ) -> Result<PriceHistory, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}y",
            self.base_url, ticker, self.lookback_years
        );
        debug!("Requesting price data from {}", url);

        let data: ChartResponse = get_json(client, &url).await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| FetchError::Malformed(format!("no chart data for {ticker}")))?;

        let history = extract_history(item);
        if history.is_empty() {
            return Err(FetchError::Malformed(format!("empty bar data for {ticker}")));
        }
        Ok(history)
    }
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

/// Builds an aligned bar series, dropping bars without a close. Missing
/// volumes become 0 so the vectors stay parallel.
fn extract_history(item: &ChartItem) -> PriceHistory {
    let mut history = PriceHistory::default();

    let (Some(timestamps), Some(quote)) = (
        item.timestamp.as_ref(),
        item.indicators.as_ref().and_then(|inds| inds.quote.first()),
    ) else {
        return history;
    };
    let Some(closes) = quote.close.as_ref() else {
        return history;
    };

    for (index, &ts) in timestamps.iter().enumerate() {
        let Some(Some(close)) = closes.get(index) else {
            continue;
        };
        let volume = quote
            .volume
            .as_ref()
            .and_then(|volumes| volumes.get(index).copied().flatten())
            .unwrap_or(0.0);
        history.timestamps.push(ts);
        history.closes.push(*close);
        history.volumes.push(volume);
    }

    history
}

#[async_trait]
impl RemoteSource for YahooChartSource {
    type Payload = PriceDataset;

    fn source(&self) -> Source {
        Source::SectorPrices
    }

    fn cache_key(&self) -> String {
        format!("sector_prices_{}y", self.lookback_years)
    }

    #[instrument(name = "SectorPriceFetch", skip(self))]
    async fn pull(&self) -> Result<PriceDataset, FetchError> {
        let client = http_client()?;

        let sector_fetches = Sector::ALL.map(|sector| {
            let client = &client;
            async move { (sector, self.fetch_history(client, sector.etf_ticker()).await) }
        });
        let benchmark_fetch = self.fetch_history(&client, MARKET_BENCHMARK);

        let (sector_results, benchmark_result) =
            tokio::join!(join_all(sector_fetches), benchmark_fetch);

        let mut dataset = PriceDataset::default();
        for (sector, result) in sector_results {
            match result {
                Ok(history) => {
                    dataset.sectors.insert(sector, history);
                }
                Err(e) => debug!("Dropping {} from price dataset: {}", sector, e),
            }
        }
        match benchmark_result {
            Ok(history) => dataset.benchmark = Some(history),
            Err(e) => debug!("Benchmark {} unavailable: {}", MARKET_BENCHMARK, e),
        }

        if dataset.sectors.is_empty() {
            return Err(FetchError::Unavailable(
                "no sector price data could be fetched".to_string(),
            ));
        }
        Ok(dataset)
    }
}
