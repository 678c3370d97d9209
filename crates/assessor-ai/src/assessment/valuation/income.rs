use serde::{Deserialize, Serialize};

use super::tables::PricingTables;
use super::{blended_confidence, building_age, class_label, round_to, ValuationError};
use crate::assessment::property::{PropertyClass, PropertyRecord};

pub(crate) const NOT_APPLICABLE: &str =
    "Income approach is only applicable for Commercial and Industrial properties";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeValuation {
    /// Capitalized value, `None` when the class cannot be valued by income.
    pub income_value: Option<f64>,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<IncomeBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub potential_gross_income: f64,
    pub effective_gross_income: f64,
    pub net_operating_income: f64,
    pub vacancy_rate: f64,
    pub expense_ratio: f64,
    pub cap_rate: f64,
    pub building_area: f64,
    pub rental_rate_per_sqft: f64,
    pub age_factor: f64,
    pub location_factor: f64,
    pub property_class: String,
    pub property_city: String,
    pub building_age: i64,
}

impl IncomeValuation {
    fn not_applicable() -> Self {
        Self {
            income_value: None,
            breakdown: None,
            error: Some(NOT_APPLICABLE.to_string()),
            confidence_score: 0.0,
        }
    }
}

fn age_factor(age: i64) -> f64 {
    if age < 5 {
        1.1
    } else if age < 15 {
        1.0
    } else if age < 30 {
        0.9
    } else {
        0.8
    }
}

fn base_rental_rate(class: PropertyClass, building_area: f64) -> f64 {
    match class {
        PropertyClass::Commercial if building_area > 10000.0 => 18.0 * 0.85,
        PropertyClass::Commercial if building_area < 2000.0 => 18.0 * 1.1,
        PropertyClass::Commercial => 18.0,
        PropertyClass::Industrial if building_area > 15000.0 => 12.0 * 0.8,
        PropertyClass::Industrial => 12.0,
        _ => 15.0,
    }
}

fn vacancy_rate(class: PropertyClass, location_factor: f64, building_area: f64) -> f64 {
    if class == PropertyClass::Commercial {
        if location_factor < 0.9 {
            0.08
        } else if location_factor > 1.03 {
            0.03
        } else {
            0.05
        }
    } else if building_area > 10000.0 {
        0.07
    } else {
        0.04
    }
}

fn expense_ratio(class: PropertyClass, age: i64) -> f64 {
    let mut ratio = 0.35;
    if age > 30 {
        ratio += 0.1;
    } else if age < 10 {
        ratio -= 0.05;
    }
    if class == PropertyClass::Industrial {
        ratio += 0.05;
    }
    round_to(ratio, 3)
}

fn market_cap_rate(class: PropertyClass, location_factor: f64) -> f64 {
    match class {
        PropertyClass::Commercial if location_factor > 1.03 => 0.065,
        PropertyClass::Commercial if location_factor < 0.9 => 0.075,
        PropertyClass::Industrial => 0.08,
        _ => 0.07,
    }
}

pub(crate) fn value(
    record: &PropertyRecord,
    tables: &PricingTables,
) -> Result<IncomeValuation, ValuationError> {
    let property_class = class_label(record);
    let class = match property_class.parse::<PropertyClass>() {
        Ok(class) if class.is_income_producing() => class,
        _ => return Ok(IncomeValuation::not_applicable()),
    };

    let fallback = tables.fallback;
    let property_city = record.city().unwrap_or(fallback.property_city).to_string();
    let supplied_year = PropertyRecord::integer(&record.year_built);
    let supplied_building = PropertyRecord::number(&record.building_area);
    let building_area = supplied_building.unwrap_or(fallback.building_area);
    let year_built = supplied_year.unwrap_or(fallback.year_built);
    let age = building_age(tables.reference_year, year_built)?;

    let cap_override = PropertyRecord::number(&record.cap_rate);
    let cap_rate = match cap_override {
        Some(percent) if percent <= 0.0 => return Err(ValuationError::NonPositiveCapRate(percent)),
        Some(percent) => percent / 100.0,
        None => market_cap_rate(class, tables.rental_location_factor(&property_city)),
    };
    let income_override = PropertyRecord::number(&record.annual_income).filter(|income| *income > 0.0);

    let location_factor = tables.rental_location_factor(&property_city);
    let age_factor = age_factor(age);
    let rental_rate_per_sqft = base_rental_rate(class, building_area) * location_factor * age_factor;
    let vacancy_rate = vacancy_rate(class, location_factor, building_area);
    let expense_ratio = expense_ratio(class, age);

    let potential_gross_income = income_override.unwrap_or(building_area * rental_rate_per_sqft);
    let effective_gross_income = potential_gross_income * (1.0 - vacancy_rate);
    let net_operating_income = effective_gross_income * (1.0 - expense_ratio);
    let income_value = net_operating_income / cap_rate;

    let has_core_data = supplied_building.is_some_and(|area| area != 0.0)
        && supplied_year.is_some_and(|year| year != 0);
    let factors = [
        if has_core_data { 0.85 } else { 0.7 },
        if income_override.is_some() { 0.9 } else { 0.75 },
        if cap_override.is_some() { 0.9 } else { 0.8 },
    ];

    Ok(IncomeValuation {
        income_value: Some(round_to(income_value, 2)),
        breakdown: Some(IncomeBreakdown {
            potential_gross_income: round_to(potential_gross_income, 2),
            effective_gross_income: round_to(effective_gross_income, 2),
            net_operating_income: round_to(net_operating_income, 2),
            vacancy_rate,
            expense_ratio,
            cap_rate,
            building_area,
            rental_rate_per_sqft: round_to(rental_rate_per_sqft, 2),
            age_factor,
            location_factor,
            property_class,
            property_city,
            building_age: age,
        }),
        error: None,
        confidence_score: blended_confidence(&factors, 0.6, 0.9),
    })
}
