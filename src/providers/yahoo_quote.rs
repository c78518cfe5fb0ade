//! Forward P/E per sector ETF, from the Yahoo Finance quote API.

use crate::core::sector::Sector;
use crate::core::series::SectorValueMap;
use crate::core::status::Source;
use crate::fetch::{FetchError, RemoteSource};
use crate::providers::util::{get_json, http_client};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

pub struct YahooQuoteSource {
    base_url: String,
}

impl YahooQuoteSource {
    pub fn new(base_url: &str) -> Self {
        YahooQuoteSource {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct QuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResult,
}

#[derive(Deserialize, Debug)]
struct QuoteResult {
    result: Vec<QuoteItem>,
}

#[derive(Deserialize, Debug)]
struct QuoteItem {
    symbol: String,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<f64>,
}

#[async_trait]
impl RemoteSource for YahooQuoteSource {
    type Payload = SectorValueMap;

    fn source(&self) -> Source {
        Source::Valuation
    }

    fn cache_key(&self) -> String {
        "valuation_forward_pe".to_string()
    }

    #[instrument(name = "ValuationFetch", skip(self))]
    async fn pull(&self) -> Result<SectorValueMap, FetchError> {
        let symbols: Vec<&str> = Sector::ALL.iter().map(|s| s.etf_ticker()).collect();
        let url = format!(
            "{}/v7/finance/quote?symbols={}",
            self.base_url,
            symbols.join(",")
        );
        debug!("Requesting quote data from {}", url);

        let client = http_client()?;
        let data: QuoteResponse = get_json(&client, &url).await?;

        let mut valuations = SectorValueMap::new();
        for item in data.quote_response.result {
            let Some(sector) = Sector::from_etf_ticker(&item.symbol) else {
                continue;
            };
            if let Some(pe) = item.forward_pe {
                valuations.insert(sector, pe);
            } else {
                debug!("No forward P/E for {}", item.symbol);
            }
        }

        if valuations.is_empty() {
            return Err(FetchError::Malformed(
                "quote response contained no forward P/E data".to_string(),
            ));
        }
        Ok(valuations)
    }
}
