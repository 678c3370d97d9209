use serde::{Deserialize, Serialize};

use super::tables::PricingTables;
use super::{blended_confidence, building_age, class_label, round_to, ValuationError};
use crate::assessment::property::{PropertyClass, PropertyRecord};

const MAX_DEPRECIATION: f64 = 0.7;
const NON_RESIDENTIAL_DEPRECIATION_CAP: f64 = 0.6;
const OBSOLESCENCE_AGE: i64 = 30;
const FUNCTIONAL_OBSOLESCENCE_RATE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostValuation {
    pub cost_value: f64,
    pub replacement_cost: f64,
    pub depreciated_cost: f64,
    pub land_value: f64,
    pub functional_obsolescence: f64,
    pub external_obsolescence: f64,
    pub depreciation_rate: f64,
    pub building_age: i64,
    pub building_area: f64,
    pub land_area: f64,
    pub quality_factor: f64,
    pub replacement_cost_per_sqft: f64,
    pub land_value_per_sqft: f64,
    pub property_class: String,
    pub property_city: String,
    pub confidence_score: f64,
}

/// Fraction of replacement cost lost to physical depreciation at `age` years.
///
/// Residential buildings follow a three-tier curve; every other class loses 1.5% a year up to
/// 60%. The result never exceeds 70% and negative ages count as new construction.
pub fn depreciation_rate(class: Option<PropertyClass>, age: i64) -> f64 {
    let age = age.max(0) as f64;
    let rate = if class == Some(PropertyClass::Residential) {
        if age <= 7.0 {
            age * 0.005
        } else if age <= 20.0 {
            0.035 + (age - 7.0) * 0.01
        } else {
            0.165 + (age - 20.0) * 0.005
        }
    } else {
        (age * 0.015).min(NON_RESIDENTIAL_DEPRECIATION_CAP)
    };
    rate.min(MAX_DEPRECIATION)
}

fn quality_factor(bedrooms: i64, bathrooms: f64) -> f64 {
    let ratio = if bedrooms > 0 {
        bathrooms / bedrooms as f64
    } else {
        0.0
    };
    if ratio >= 1.0 && bedrooms >= 3 {
        1.15
    } else if ratio >= 0.75 && bedrooms >= 3 {
        1.08
    } else if ratio >= 0.5 {
        1.0
    } else {
        0.95
    }
}

fn replacement_cost_per_sqft(class: Option<PropertyClass>, quality: f64) -> f64 {
    match class {
        Some(PropertyClass::Residential) => 225.0 * quality,
        Some(PropertyClass::Commercial) => 180.0,
        Some(PropertyClass::Industrial) => 150.0,
        _ => 100.0,
    }
}

fn completeness_factor(has_building: bool, has_land: bool, has_year: bool) -> f64 {
    match (has_building, has_land, has_year) {
        (true, true, true) => 0.9,
        (true, false, true) => 0.75,
        _ => 0.6,
    }
}

fn age_confidence(age: i64) -> f64 {
    if age < 20 {
        0.85
    } else if age < 40 {
        0.75
    } else {
        0.65
    }
}

pub(crate) fn value(
    record: &PropertyRecord,
    tables: &PricingTables,
) -> Result<CostValuation, ValuationError> {
    let fallback = tables.fallback;
    let property_class = class_label(record);
    let class = property_class.parse::<PropertyClass>().ok();
    let property_city = record.city().unwrap_or(fallback.property_city).to_string();

    let supplied_year = PropertyRecord::integer(&record.year_built);
    let supplied_building = PropertyRecord::number(&record.building_area);
    let supplied_land = PropertyRecord::number(&record.land_area);

    let year_built = supplied_year.unwrap_or(fallback.year_built);
    let building_area = supplied_building.unwrap_or(fallback.building_area);
    let land_area = supplied_land.unwrap_or(fallback.land_area);

    let age = building_age(tables.reference_year, year_built)?;
    let depreciation = depreciation_rate(class, age);

    let mut quality = 1.0;
    if class == Some(PropertyClass::Residential) {
        let bedrooms = PropertyRecord::integer(&record.bedrooms).filter(|beds| *beds != 0);
        let bathrooms = PropertyRecord::number(&record.bathrooms).filter(|baths| *baths != 0.0);
        if let (Some(bedrooms), Some(bathrooms)) = (bedrooms, bathrooms) {
            quality = quality_factor(bedrooms, bathrooms);
        }
    }

    let cost_per_sqft = replacement_cost_per_sqft(class, quality);
    let land_rate = tables.land_rate(&property_city)
        * match class {
            Some(PropertyClass::Commercial) => 1.5,
            Some(PropertyClass::Agricultural) => 0.2,
            _ => 1.0,
        };

    let replacement_cost = building_area * cost_per_sqft;
    let depreciated_cost = replacement_cost * (1.0 - depreciation);
    let land_value = land_area * land_rate;
    let functional_obsolescence = if age > OBSOLESCENCE_AGE {
        depreciated_cost * FUNCTIONAL_OBSOLESCENCE_RATE
    } else {
        0.0
    };
    let external_obsolescence = 0.0;
    let cost_value = depreciated_cost - functional_obsolescence - external_obsolescence + land_value;

    let is_present = |value: Option<f64>| value.is_some_and(|value| value != 0.0);
    let completeness = completeness_factor(
        is_present(supplied_building),
        is_present(supplied_land),
        supplied_year.is_some_and(|year| year != 0),
    );

    Ok(CostValuation {
        cost_value: round_to(cost_value, 2),
        replacement_cost: round_to(replacement_cost, 2),
        depreciated_cost: round_to(depreciated_cost, 2),
        land_value: round_to(land_value, 2),
        functional_obsolescence: round_to(functional_obsolescence, 2),
        external_obsolescence,
        depreciation_rate: round_to(depreciation, 3),
        building_age: age,
        building_area,
        land_area,
        quality_factor: quality,
        replacement_cost_per_sqft: cost_per_sqft,
        land_value_per_sqft: land_rate,
        property_class,
        property_city,
        confidence_score: blended_confidence(&[completeness, age_confidence(age)], 0.6, 0.9),
    })
}
