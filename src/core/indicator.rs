//! The five scoring indicators, their default weights and normalization
//! directions, and the user-adjustable weight set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// Whether a larger raw value should map to a higher normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsBetter,
    /// Cheaper valuations and lower rate correlation are the favorable end.
    LowerIsBetter,
}

/// A closed set: every indicator has exactly one computation rule and one
/// normalization direction, and the composite always combines all five.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Indicator {
    Momentum,
    Valuation,
    Growth,
    Innovation,
    Macro,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::Momentum,
        Indicator::Valuation,
        Indicator::Growth,
        Indicator::Innovation,
        Indicator::Macro,
    ];

    /// Key used in weight maps and serialized responses.
    pub fn key(&self) -> &'static str {
        match self {
            Indicator::Momentum => "momentum",
            Indicator::Valuation => "valuation",
            Indicator::Growth => "growth",
            Indicator::Innovation => "innovation",
            Indicator::Macro => "macro",
        }
    }

    pub fn default_weight(&self) -> f64 {
        match self {
            Indicator::Momentum => 0.25,
            Indicator::Valuation => 0.20,
            Indicator::Growth => 0.20,
            Indicator::Innovation => 0.20,
            Indicator::Macro => 0.15,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Indicator::Momentum | Indicator::Growth | Indicator::Innovation => {
                Direction::HigherIsBetter
            }
            Indicator::Valuation | Indicator::Macro => Direction::LowerIsBetter,
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A full set of indicator weights summing to 1.0.
///
/// Constructed from caller input that may be partial, unnormalized or junk;
/// construction always renormalizes and falls back to the defaults when
/// nothing usable was supplied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    values: [f64; 5],
}

impl Weights {
    pub fn defaults() -> Self {
        let mut values = [0.0; 5];
        for indicator in Indicator::ALL {
            values[indicator.index()] = indicator.default_weight();
        }
        Weights { values }
    }

    /// Builds weights from a partial `indicator key -> weight` mapping.
    ///
    /// Unknown keys are ignored, non-finite and negative values are dropped,
    /// missing indicators weigh 0. If the usable sum is 0 the defaults are
    /// returned instead of an error.
    pub fn from_partial(input: &HashMap<String, f64>) -> Self {
        let mut values = [0.0; 5];
        for indicator in Indicator::ALL {
            if let Some(&weight) = input.get(indicator.key())
                && weight.is_finite()
                && weight >= 0.0
            {
                values[indicator.index()] = weight;
            }
        }

        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Weights::defaults();
        }
        for value in &mut values {
            *value /= sum;
        }
        Weights { values }
    }

    pub fn get(&self, indicator: Indicator) -> f64 {
        self.values[indicator.index()]
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// The post-renormalization mapping reported back to callers.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Indicator::ALL
            .into_iter()
            .map(|indicator| (indicator.key().to_string(), self.get(indicator)))
            .collect()
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights::defaults()
    }
}
