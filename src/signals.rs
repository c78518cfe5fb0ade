//! Raw signal computation: one numeric value per sector per indicator,
//! derived from whatever subset of the five sources responded. Pure and
//! synchronous; absence propagates, it never errors.

use crate::core::indicator::Indicator;
use crate::core::sector::Sector;
use crate::core::series::{
    ObservationSeries, PriceDataset, SectorSeriesMap, SectorValueMap, TRADING_DAYS_PER_MONTH,
    align_monthly, pearson,
};
use serde::Serialize;
use std::collections::BTreeMap;

const MOMENTUM_RETURN_WEIGHT: f64 = 0.50;
const MOMENTUM_RELATIVE_WEIGHT: f64 = 0.35;
const MOMENTUM_VOLUME_WEIGHT: f64 = 0.15;

const RETURN_WINDOW_DAYS: usize = 12 * TRADING_DAYS_PER_MONTH;
const VOLUME_SHORT_DAYS: usize = 20;
const VOLUME_LONG_DAYS: usize = 50;

/// Rate correlations on fewer aligned months than this are noise, not data.
const MIN_MACRO_MONTHS: usize = 24;

/// Everything the five fetchers produced for one scoring pass. `None` means
/// the source had nothing at all (not even stale cache).
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub prices: Option<PriceDataset>,
    pub valuations: Option<SectorValueMap>,
    pub employment: Option<SectorSeriesMap>,
    pub rd_intensity: Option<SectorValueMap>,
    pub rates: Option<ObservationSeries>,
}

impl MarketData {
    /// True when no source delivered anything; scoring cannot proceed.
    pub fn is_empty(&self) -> bool {
        self.prices.is_none()
            && self.valuations.is_none()
            && self.employment.is_none()
            && self.rd_intensity.is_none()
            && self.rates.is_none()
    }
}

/// Raw per-indicator values; a sector missing from a map is absent for that
/// indicator and scores neutral downstream.
#[derive(Debug, Clone, Default)]
pub struct RawSignals {
    pub momentum: SectorValueMap,
    pub valuation: SectorValueMap,
    pub growth: SectorValueMap,
    pub innovation: SectorValueMap,
    pub macro_sensitivity: SectorValueMap,
}

impl RawSignals {
    pub fn get(&self, indicator: Indicator) -> &SectorValueMap {
        match indicator {
            Indicator::Momentum => &self.momentum,
            Indicator::Valuation => &self.valuation,
            Indicator::Growth => &self.growth,
            Indicator::Innovation => &self.innovation,
            Indicator::Macro => &self.macro_sensitivity,
        }
    }
}

/// Underlying metrics carried through to responses for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayMetrics {
    pub return_12mo: Option<f64>,
    pub relative_strength: Option<f64>,
    pub volume_trend: Option<f64>,
    pub forward_pe: Option<f64>,
    pub employment_growth: Option<f64>,
    pub rd_intensity: Option<f64>,
    pub rate_correlation: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    pub raw: RawSignals,
    pub display: BTreeMap<Sector, DisplayMetrics>,
}

/// Computes all five raw signals from the available data.
pub fn compute(data: &MarketData) -> SignalSet {
    let mut raw = RawSignals::default();
    let mut display: BTreeMap<Sector, DisplayMetrics> = Sector::ALL
        .into_iter()
        .map(|sector| (sector, DisplayMetrics::default()))
        .collect();

    if let Some(dataset) = &data.prices {
        compute_momentum(dataset, &mut raw, &mut display);
        if let Some(rates) = &data.rates {
            compute_rate_correlation(dataset, rates, &mut raw, &mut display);
        }
    }

    if let Some(valuations) = &data.valuations {
        for (sector, &pe) in valuations {
            // Negative or zero forward P/E carries no valuation information.
            if pe > 0.0 {
                raw.valuation.insert(*sector, pe);
                if let Some(metrics) = display.get_mut(sector) {
                    metrics.forward_pe = Some(pe);
                }
            }
        }
    }

    if let Some(employment) = &data.employment {
        for (sector, series) in employment {
            if let Some(growth) = series.yoy_growth() {
                raw.growth.insert(*sector, growth);
                if let Some(metrics) = display.get_mut(sector) {
                    metrics.employment_growth = Some(growth);
                }
            }
        }
    }

    if let Some(rd) = &data.rd_intensity {
        for (sector, &intensity) in rd {
            raw.innovation.insert(*sector, intensity);
            if let Some(metrics) = display.get_mut(sector) {
                metrics.rd_intensity = Some(intensity);
            }
        }
    }

    SignalSet { raw, display }
}

/// Momentum = 50% trailing 12-month return, 35% return relative to the
/// benchmark, 15% volume trend. The 12-month return is required; the other
/// terms contribute 0 when their inputs are unavailable.
fn compute_momentum(
    dataset: &PriceDataset,
    raw: &mut RawSignals,
    display: &mut BTreeMap<Sector, DisplayMetrics>,
) {
    let benchmark_return = dataset
        .benchmark
        .as_ref()
        .and_then(|history| history.return_over(RETURN_WINDOW_DAYS));

    for (sector, history) in &dataset.sectors {
        let total_return = history.return_over(RETURN_WINDOW_DAYS);
        let relative = match (total_return, benchmark_return) {
            (Some(sector_ret), Some(bench_ret)) => Some(sector_ret - bench_ret),
            _ => None,
        };
        let volume = history.volume_trend(VOLUME_SHORT_DAYS, VOLUME_LONG_DAYS);

        if let Some(metrics) = display.get_mut(sector) {
            metrics.return_12mo = total_return;
            metrics.relative_strength = relative;
            metrics.volume_trend = volume;
        }

        if let Some(total_return) = total_return {
            let momentum = MOMENTUM_RETURN_WEIGHT * total_return
                + MOMENTUM_RELATIVE_WEIGHT * relative.unwrap_or(0.0)
                + MOMENTUM_VOLUME_WEIGHT * volume.unwrap_or(0.0);
            raw.momentum.insert(*sector, momentum);
        }
    }
}

/// Pearson correlation between monthly sector returns and monthly changes in
/// the benchmark rate, over however many months both series cover.
fn compute_rate_correlation(
    dataset: &PriceDataset,
    rates: &ObservationSeries,
    raw: &mut RawSignals,
    display: &mut BTreeMap<Sector, DisplayMetrics>,
) {
    let rate_changes = rates.monthly_changes();
    if rate_changes.is_empty() {
        return;
    }

    for (sector, history) in &dataset.sectors {
        let returns = history.monthly_returns();
        let (sector_moves, rate_moves) = align_monthly(&returns, &rate_changes);
        if sector_moves.len() < MIN_MACRO_MONTHS {
            continue;
        }
        if let Some(correlation) = pearson(&sector_moves, &rate_moves) {
            raw.macro_sensitivity.insert(*sector, correlation);
            if let Some(metrics) = display.get_mut(sector) {
                metrics.rate_correlation = Some(correlation);
            }
        }
    }
}
