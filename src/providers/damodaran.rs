//! Mean R&D intensity (R&D spend / revenue) per sector, from the Damodaran
//! NYU industry dataset in its CSV form. The dataset is keyed by Damodaran's
//! own industry names, which map many-to-one onto GICS sectors.

use crate::core::sector::Sector;
use crate::core::series::SectorValueMap;
use crate::core::status::Source;
use crate::fetch::{FetchError, RemoteSource};
use crate::providers::util::{get_text, http_client};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const DATASET_PATH: &str = "/~adamodar/pc/datasets/R&D.csv";

pub struct DamodaranSource {
    base_url: String,
}

impl DamodaranSource {
    pub fn new(base_url: &str) -> Self {
        DamodaranSource {
            base_url: base_url.to_string(),
        }
    }
}

/// Maps a Damodaran industry name onto the GICS sector it belongs to.
/// Industries with no clean sector home (e.g. diversified conglomerates) are
/// left unmapped and excluded from the averages.
fn industry_sector(industry: &str) -> Option<Sector> {
    let sector = match industry {
        "Software (System & Application)"
        | "Software (Entertainment)"
        | "Software (Internet)"
        | "Semiconductor"
        | "Semiconductor Equip"
        | "Computer Services"
        | "Computers/Peripherals"
        | "Electronics (Consumer & Office)"
        | "Electronics (General)" => Sector::InformationTechnology,
        "Banks (Regional)"
        | "Banks (Money Center)"
        | "Financial Svcs. (Non-bank & Insurance)"
        | "Insurance (General)"
        | "Insurance (Life)"
        | "Insurance (Prop/Cas.)"
        | "Brokerage & Investment Banking" => Sector::Financials,
        "Oil/Gas (Production and Exploration)"
        | "Oil/Gas (Integrated)"
        | "Oil/Gas Distribution"
        | "Oilfield Svcs/Equip." => Sector::Energy,
        "Healthcare Products"
        | "Healthcare Support Services"
        | "Healthcare Information and Technology"
        | "Hospitals/Healthcare Facilities"
        | "Drugs (Pharmaceutical)"
        | "Drugs (Biotechnology)"
        | "Medical Supplies" => Sector::HealthCare,
        "Retail (General)"
        | "Retail (Online)"
        | "Retail (Special Lines)"
        | "Auto & Truck"
        | "Auto Parts"
        | "Apparel"
        | "Restaurant/Dining"
        | "Hotel/Gaming" => Sector::ConsumerDiscretionary,
        "Household Products"
        | "Food Processing"
        | "Beverage (Alcoholic)"
        | "Beverage (Soft)"
        | "Tobacco" => Sector::ConsumerStaples,
        "Aerospace/Defense"
        | "Air Transport"
        | "Trucking"
        | "Transportation"
        | "Machinery"
        | "Industrial Services"
        | "Building Materials"
        | "Engineering/Construction" => Sector::Industrials,
        "Metals & Mining"
        | "Steel"
        | "Chemical (Basic)"
        | "Chemical (Diversified)"
        | "Chemical (Specialty)"
        | "Paper/Forest Products"
        | "Packaging & Container" => Sector::Materials,
        "Utility (General)" | "Utility (Water)" | "Power" => Sector::Utilities,
        "R.E.I.T."
        | "Real Estate (General/Diversified)"
        | "Real Estate (Development)"
        | "Real Estate (Operations & Services)" => Sector::RealEstate,
        "Telecom Services"
        | "Telecom. Equipment"
        | "Broadcasting"
        | "Cable TV"
        | "Entertainment"
        | "Publishing & Newspapers"
        | "Advertising" => Sector::CommunicationServices,
        _ => return None,
    };
    Some(sector)
}

/// Accepts "9.53%", "9.53" or " 9.53 ".
fn parse_intensity(field: &str) -> Option<f64> {
    let cleaned = field.trim().trim_end_matches('%');
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn parse_dataset(text: &str) -> Result<SectorValueMap, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    // The sheet carries preamble rows before the header; locate the industry
    // and R&D/Sales columns from the header row itself, like the upstream
    // sheet layout demands.
    let mut industry_col: Option<usize> = None;
    let mut intensity_col: Option<usize> = None;
    let mut samples: BTreeMap<Sector, Vec<f64>> = BTreeMap::new();

    for record in reader.records() {
        let record =
            record.map_err(|e| FetchError::Malformed(format!("unreadable CSV row: {e}")))?;

        let (Some(industry_idx), Some(intensity_idx)) = (industry_col, intensity_col) else {
            for (index, field) in record.iter().enumerate() {
                let lower = field.to_lowercase();
                if lower.contains("industry") && industry_col.is_none() {
                    industry_col = Some(index);
                }
                if lower.contains("r&d") && lower.contains("sales") {
                    intensity_col = Some(index);
                }
            }
            continue;
        };

        let industry = record.get(industry_idx).unwrap_or("").trim();
        let Some(sector) = industry_sector(industry) else {
            continue;
        };
        let Some(intensity) = record.get(intensity_idx).and_then(parse_intensity) else {
            debug!("No R&D/Sales value for industry '{}'", industry);
            continue;
        };
        samples.entry(sector).or_default().push(intensity);
    }

    if industry_col.is_none() || intensity_col.is_none() {
        return Err(FetchError::Malformed(
            "R&D dataset header row not found".to_string(),
        ));
    }

    let intensities: SectorValueMap = samples
        .into_iter()
        .map(|(sector, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (sector, mean)
        })
        .collect();

    if intensities.is_empty() {
        return Err(FetchError::Malformed(
            "R&D dataset contained no mappable industries".to_string(),
        ));
    }
    Ok(intensities)
}

#[async_trait]
impl RemoteSource for DamodaranSource {
    type Payload = SectorValueMap;

    fn source(&self) -> Source {
        Source::RdIntensity
    }

    fn cache_key(&self) -> String {
        "rd_intensity".to_string()
    }

    #[instrument(name = "RdIntensityFetch", skip(self))]
    async fn pull(&self) -> Result<SectorValueMap, FetchError> {
        let url = format!("{}{}", self.base_url, DATASET_PATH);
        debug!("Requesting R&D dataset from {}", url);

        let client = http_client()?;
        let text = get_text(&client, &url).await?;
        parse_dataset(&text)
    }
}
