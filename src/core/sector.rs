//! The fixed GICS sector universe and its per-sector reference data.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Ticker used for relative-strength and rate-correlation baselines.
pub const MARKET_BENCHMARK: &str = "SPY";

/// One of the eleven GICS sectors. Immutable reference data; every scoring
/// response covers the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sector {
    InformationTechnology,
    Financials,
    Energy,
    HealthCare,
    ConsumerDiscretionary,
    ConsumerStaples,
    Industrials,
    Materials,
    Utilities,
    RealEstate,
    CommunicationServices,
}

impl Sector {
    pub const ALL: [Sector; 11] = [
        Sector::InformationTechnology,
        Sector::Financials,
        Sector::Energy,
        Sector::HealthCare,
        Sector::ConsumerDiscretionary,
        Sector::ConsumerStaples,
        Sector::Industrials,
        Sector::Materials,
        Sector::Utilities,
        Sector::RealEstate,
        Sector::CommunicationServices,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Sector::InformationTechnology => "Information Technology",
            Sector::Financials => "Financials",
            Sector::Energy => "Energy",
            Sector::HealthCare => "Health Care",
            Sector::ConsumerDiscretionary => "Consumer Discretionary",
            Sector::ConsumerStaples => "Consumer Staples",
            Sector::Industrials => "Industrials",
            Sector::Materials => "Materials",
            Sector::Utilities => "Utilities",
            Sector::RealEstate => "Real Estate",
            Sector::CommunicationServices => "Communication Services",
        }
    }

    /// SPDR sector ETF used as the tradable proxy for price and volume data.
    pub fn etf_ticker(&self) -> &'static str {
        match self {
            Sector::InformationTechnology => "XLK",
            Sector::Financials => "XLF",
            Sector::Energy => "XLE",
            Sector::HealthCare => "XLV",
            Sector::ConsumerDiscretionary => "XLY",
            Sector::ConsumerStaples => "XLP",
            Sector::Industrials => "XLI",
            Sector::Materials => "XLB",
            Sector::Utilities => "XLU",
            Sector::RealEstate => "XLRE",
            Sector::CommunicationServices => "XLC",
        }
    }

    /// BLS CES employment series id. These are supersector proxies, not exact
    /// GICS matches (e.g. retail trade stands in for Consumer Discretionary).
    pub fn bls_series(&self) -> &'static str {
        match self {
            Sector::InformationTechnology => "CES6000000001",
            Sector::Financials => "CES5500000001",
            Sector::Energy => "CES1021000001",
            Sector::HealthCare => "CES6562000001",
            Sector::ConsumerDiscretionary => "CES4200000001",
            Sector::ConsumerStaples => "CES3100000001",
            Sector::Industrials => "CES3000000001",
            Sector::Materials => "CES1021200001",
            Sector::Utilities => "CES4422000001",
            Sector::RealEstate => "CES5553000001",
            Sector::CommunicationServices => "CES5000000001",
        }
    }

    pub fn from_etf_ticker(ticker: &str) -> Option<Sector> {
        Sector::ALL.into_iter().find(|s| s.etf_ticker() == ticker)
    }

    pub fn from_bls_series(series: &str) -> Option<Sector> {
        Sector::ALL.into_iter().find(|s| s.bls_series() == series)
    }
}

impl Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Sector {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sector::ALL
            .into_iter()
            .find(|sector| sector.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("Unknown sector: {}", s))
    }
}
