//! Time-series payloads cached per source, plus the small amount of series
//! math (returns, resampling, correlation) the signal rules need.

use crate::core::sector::Sector;
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Approximation used to convert month lookbacks into daily bar offsets.
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// Calendar month key, `(year, month)`.
pub type MonthKey = (i32, u32);

/// Forward P/E, R&D intensity and similar one-number-per-sector payloads.
pub type SectorValueMap = BTreeMap<Sector, f64>;

/// Per-sector observation series (employment).
pub type SectorSeriesMap = BTreeMap<Sector, ObservationSeries>;

/// Daily OHLC-derived bars for one ticker: parallel vectors in ascending
/// timestamp order. Bars without a close are dropped at decode time, so the
/// three vectors are always the same length.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<f64>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Total return in percent over the trailing `trading_days` bars.
    pub fn return_over(&self, trading_days: usize) -> Option<f64> {
        if trading_days == 0 || self.closes.len() < trading_days {
            return None;
        }
        let start = self.closes[self.closes.len() - trading_days];
        let end = *self.closes.last()?;
        if start <= 0.0 {
            return None;
        }
        Some((end - start) / start * 100.0)
    }

    /// Short-window vs long-window mean volume, in percent of the long mean.
    pub fn volume_trend(&self, short_days: usize, long_days: usize) -> Option<f64> {
        if short_days == 0 || self.volumes.len() < long_days {
            return None;
        }
        let mean = |window: &[f64]| window.iter().sum::<f64>() / window.len() as f64;
        let short_avg = mean(&self.volumes[self.volumes.len() - short_days..]);
        let long_avg = mean(&self.volumes[self.volumes.len() - long_days..]);
        if long_avg <= 0.0 {
            return None;
        }
        Some((short_avg - long_avg) / long_avg * 100.0)
    }

    /// Month-end closes keyed by calendar month.
    pub fn monthly_closes(&self) -> Vec<(MonthKey, f64)> {
        let mut monthly: Vec<(MonthKey, f64)> = Vec::new();
        for (&ts, &close) in self.timestamps.iter().zip(&self.closes) {
            let Some(date) = DateTime::from_timestamp(ts, 0) else {
                continue;
            };
            let key = (date.year(), date.month());
            match monthly.last_mut() {
                Some((last_key, last_close)) if *last_key == key => *last_close = close,
                _ => monthly.push((key, close)),
            }
        }
        monthly
    }

    /// Fractional month-over-month returns from month-end closes.
    pub fn monthly_returns(&self) -> Vec<(MonthKey, f64)> {
        fractional_changes(&self.monthly_closes())
    }
}

/// A dated value series (employment counts, interest rates). Points are kept
/// in ascending date order with one value per date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationSeries {
    pub points: Vec<(NaiveDate, f64)>,
}

impl ObservationSeries {
    /// Builds a series from unordered points, keeping the last value for any
    /// duplicated date.
    pub fn from_points(mut points: Vec<(NaiveDate, f64)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        points.dedup_by(|later, earlier| {
            if later.0 == earlier.0 {
                earlier.1 = later.1;
                true
            } else {
                false
            }
        });
        ObservationSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_value(&self) -> Option<f64> {
        self.points.last().map(|(_, value)| *value)
    }

    /// Year-over-year change in percent, taking "a year ago" as 12 monthly
    /// observations back. None when the series is too short or the base is
    /// non-positive.
    pub fn yoy_growth(&self) -> Option<f64> {
        if self.points.len() < 13 {
            return None;
        }
        let current = self.points[self.points.len() - 1].1;
        let year_ago = self.points[self.points.len() - 13].1;
        if year_ago <= 0.0 {
            return None;
        }
        Some((current - year_ago) / year_ago * 100.0)
    }

    /// Month-end values keyed by calendar month.
    pub fn monthly_values(&self) -> Vec<(MonthKey, f64)> {
        let mut monthly: Vec<(MonthKey, f64)> = Vec::new();
        for &(date, value) in &self.points {
            let key = (date.year(), date.month());
            match monthly.last_mut() {
                Some((last_key, last_value)) if *last_key == key => *last_value = value,
                _ => monthly.push((key, value)),
            }
        }
        monthly
    }

    /// Fractional month-over-month changes from month-end values.
    pub fn monthly_changes(&self) -> Vec<(MonthKey, f64)> {
        fractional_changes(&self.monthly_values())
    }
}

/// Everything the price source returns in one fetch: one history per sector
/// plus the market benchmark used for relative strength and correlations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceDataset {
    pub sectors: BTreeMap<Sector, PriceHistory>,
    pub benchmark: Option<PriceHistory>,
}

fn fractional_changes(values: &[(MonthKey, f64)]) -> Vec<(MonthKey, f64)> {
    values
        .windows(2)
        .filter_map(|pair| {
            let (_, prev) = pair[0];
            let (key, cur) = pair[1];
            if prev == 0.0 {
                None
            } else {
                Some((key, (cur - prev) / prev))
            }
        })
        .collect()
}

/// Inner-joins two monthly series on month key, returning aligned value
/// vectors.
pub fn align_monthly(a: &[(MonthKey, f64)], b: &[(MonthKey, f64)]) -> (Vec<f64>, Vec<f64>) {
    let b_by_key: BTreeMap<MonthKey, f64> = b.iter().copied().collect();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &(key, value) in a {
        if let Some(&other) = b_by_key.get(&key) {
            left.push(value);
            right.push(other);
        }
    }
    (left, right)
}

/// Pearson correlation coefficient. None when the inputs are mismatched,
/// shorter than two points, or constant.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some(cov / denom)
}
