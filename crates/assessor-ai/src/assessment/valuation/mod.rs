//! Market, cost, and income valuation calculators.
//!
//! Each approach is a pure function of a [`PropertyRecord`] and [`PricingTables`] and returns
//! every intermediate quantity alongside the final value so assessors can audit the result.

mod cost;
mod income;
mod market;
mod tables;

pub use cost::{depreciation_rate, CostValuation};
pub use income::{IncomeBreakdown, IncomeValuation};
pub use market::{Comparable, MarketValuation};
pub use tables::{FallbackAttributes, PricingTables};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::property::PropertyRecord;

/// Valuation methodology requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationApproach {
    Market,
    Cost,
    Income,
}

impl ValuationApproach {
    pub const ALL: [ValuationApproach; 3] = [
        ValuationApproach::Market,
        ValuationApproach::Cost,
        ValuationApproach::Income,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ValuationApproach::Market => "market",
            ValuationApproach::Cost => "cost",
            ValuationApproach::Income => "income",
        }
    }
}

impl fmt::Display for ValuationApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValuationApproach {
    type Err = ValuationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ValuationApproach::ALL
            .into_iter()
            .find(|approach| approach.as_str() == value)
            .ok_or_else(|| ValuationError::UnknownApproach(value.to_string()))
    }
}

/// Failures raised while computing a valuation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValuationError {
    #[error("Invalid valuation approach '{0}'. Must be one of: market, cost, income")]
    UnknownApproach(String),
    #[error("capitalization rate must be positive (received {0}%)")]
    NonPositiveCapRate(f64),
    #[error("computed {quantity} is not a finite number")]
    NonFinite { quantity: &'static str },
    #[error("{quantity} is out of range for year {year_built}")]
    OutOfRange {
        quantity: &'static str,
        year_built: i64,
    },
}

/// Outcome of one valuation approach, tagged by methodology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "methodology")]
pub enum ValuationResult {
    #[serde(rename = "market_comparison")]
    Market(MarketValuation),
    #[serde(rename = "cost_approach")]
    Cost(CostValuation),
    #[serde(rename = "income_approach")]
    Income(IncomeValuation),
}

impl ValuationResult {
    pub fn approach(&self) -> ValuationApproach {
        match self {
            ValuationResult::Market(_) => ValuationApproach::Market,
            ValuationResult::Cost(_) => ValuationApproach::Cost,
            ValuationResult::Income(_) => ValuationApproach::Income,
        }
    }

    /// Final value, `None` when the approach does not apply to the record.
    pub fn estimated_value(&self) -> Option<f64> {
        match self {
            ValuationResult::Market(result) => Some(result.market_value),
            ValuationResult::Cost(result) => Some(result.cost_value),
            ValuationResult::Income(result) => result.income_value,
        }
    }

    pub fn confidence_score(&self) -> f64 {
        match self {
            ValuationResult::Market(result) => result.confidence_score,
            ValuationResult::Cost(result) => result.confidence_score,
            ValuationResult::Income(result) => result.confidence_score,
        }
    }
}

/// Value `record` with the requested approach.
pub fn value(
    record: &PropertyRecord,
    approach: ValuationApproach,
    tables: &PricingTables,
) -> Result<ValuationResult, ValuationError> {
    let result = match approach {
        ValuationApproach::Market => ValuationResult::Market(market::value(record, tables)?),
        ValuationApproach::Cost => ValuationResult::Cost(cost::value(record, tables)?),
        ValuationApproach::Income => ValuationResult::Income(income::value(record, tables)?),
    };

    match result.estimated_value() {
        Some(estimate) if !estimate.is_finite() => Err(ValuationError::NonFinite {
            quantity: "valuation",
        }),
        _ => Ok(result),
    }
}

/// Years from `year_built` to the reference year; fails when the difference overflows.
pub(crate) fn building_age(reference_year: i64, year_built: i64) -> Result<i64, ValuationError> {
    reference_year
        .checked_sub(year_built)
        .ok_or(ValuationError::OutOfRange {
            quantity: "building age",
            year_built,
        })
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Mean of the factors clamped into `[floor, ceiling]`, rounded to two places.
pub(crate) fn blended_confidence(factors: &[f64], floor: f64, ceiling: f64) -> f64 {
    if factors.is_empty() {
        return floor;
    }
    let mean = factors.iter().sum::<f64>() / factors.len() as f64;
    round_to(mean.clamp(floor, ceiling), 2)
}

/// Class label as the calculators see it: an absent class is valued as residential.
pub(crate) fn class_label(record: &PropertyRecord) -> String {
    record
        .property_class
        .clone()
        .unwrap_or_else(|| "Residential".to_string())
}

#[cfg(test)]
mod tests;
