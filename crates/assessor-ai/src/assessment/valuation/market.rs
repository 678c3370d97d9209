use serde::{Deserialize, Serialize};

use super::tables::PricingTables;
use super::{blended_confidence, building_age, class_label, round_to, ValuationError};
use crate::assessment::property::{PropertyClass, PropertyRecord};

const BASE_CONFIDENCE: f64 = 0.85;
const THIN_COMPARABLE_PENALTY: f64 = 0.8;
const MIN_COMPARABLES: usize = 3;

/// Illustrative comparable sale shown next to a market valuation.
///
/// Comparables are derived from the subject record for display; they never feed back into
/// the market value itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparable {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    pub value: f64,
    pub adjustment_factor: f64,
    pub adjusted_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketValuation {
    pub market_value: f64,
    pub base_value: f64,
    pub market_multiplier: f64,
    pub location_multiplier: f64,
    pub age_adjustment: f64,
    pub size_adjustment: f64,
    pub feature_adjustment: f64,
    pub property_class: String,
    pub property_city: String,
    pub comparable_properties: Vec<Comparable>,
    pub confidence_score: f64,
}

fn age_adjustment(age: i64) -> f64 {
    match age {
        a if a <= 5 => 1.10,
        a if a <= 10 => 1.05,
        a if a <= 20 => 1.00,
        a if a <= 40 => 0.95,
        _ => 0.90,
    }
}

fn size_adjustment(area: f64) -> f64 {
    if area < 1000.0 {
        0.95
    } else if area < 1500.0 {
        0.98
    } else if area < 2500.0 {
        1.00
    } else if area < 3500.0 {
        1.03
    } else {
        1.05
    }
}

fn feature_adjustment(bedrooms: i64, bathrooms: f64) -> f64 {
    if bedrooms >= 4 && bathrooms >= 2.5 {
        1.08
    } else if bedrooms >= 3 && bathrooms >= 2.0 {
        1.04
    } else {
        1.0
    }
}

pub(crate) fn value(
    record: &PropertyRecord,
    tables: &PricingTables,
) -> Result<MarketValuation, ValuationError> {
    let base_value = PropertyRecord::number(&record.assessed_value).unwrap_or(0.0);
    let property_class = class_label(record);
    let class = property_class.parse::<PropertyClass>().ok();
    let property_city = record
        .city()
        .unwrap_or(tables.fallback.property_city)
        .to_string();

    let market_multiplier = tables.class_multiplier(class);
    let location_multiplier = tables.location_multiplier(&property_city);

    let mut comparables = Vec::new();
    let mut comparable_weights = Vec::new();

    let mut age_factor = 1.0;
    if let Some(year_built) = PropertyRecord::integer(&record.year_built) {
        let age = building_age(tables.reference_year, year_built)?;
        age_factor = age_adjustment(age);

        let recent = age <= 10;
        let comparable_year = if recent {
            year_built.checked_add(1)
        } else {
            year_built.checked_sub(2)
        }
        .ok_or(ValuationError::OutOfRange {
            quantity: "comparable year",
            year_built,
        })?;
        let comparable_value = base_value * if recent { 0.97 } else { 1.03 };
        comparables.push(Comparable {
            address: format!("{property_city} comparable (built {comparable_year})"),
            year_built: Some(comparable_year),
            building_area: None,
            bedrooms: None,
            bathrooms: None,
            value: round_to(comparable_value, 2),
            adjustment_factor: if recent { 1.0 } else { -1.0 },
            adjusted_value: round_to(comparable_value * if recent { 1.0 } else { 0.99 }, 2),
        });
        comparable_weights.push(0.92);
    }

    let mut size_factor = 1.0;
    if let Some(area) = PropertyRecord::number(&record.building_area).filter(|area| *area > 0.0) {
        size_factor = size_adjustment(area);

        let comparable_area = area * 0.9;
        let comparable_value = base_value * 0.95;
        comparables.push(Comparable {
            address: format!(
                "{property_city} comparable ({} sq ft)",
                comparable_area.trunc() as i64
            ),
            year_built: None,
            building_area: Some(comparable_area),
            bedrooms: None,
            bathrooms: None,
            value: round_to(comparable_value, 2),
            adjustment_factor: size_factor,
            adjusted_value: round_to(comparable_value * size_factor, 2),
        });
        comparable_weights.push(0.9);
    }

    let mut feature_factor = 1.0;
    if class == Some(PropertyClass::Residential) {
        let bedrooms = PropertyRecord::integer(&record.bedrooms).filter(|beds| *beds != 0);
        let bathrooms = PropertyRecord::number(&record.bathrooms).filter(|baths| *baths != 0.0);
        if let (Some(bedrooms), Some(bathrooms)) = (bedrooms, bathrooms) {
            feature_factor = feature_adjustment(bedrooms, bathrooms);

            let comparable_beds = if bedrooms > 2 { bedrooms - 1 } else { bedrooms };
            let comparable_baths = if bathrooms > 1.5 { bathrooms - 0.5 } else { bathrooms };
            let comparable_value = base_value * 0.92;
            comparables.push(Comparable {
                address: format!(
                    "{property_city} comparable ({comparable_beds} bed/{comparable_baths} bath)"
                ),
                year_built: None,
                building_area: None,
                bedrooms: Some(comparable_beds),
                bathrooms: Some(comparable_baths),
                value: round_to(comparable_value, 2),
                adjustment_factor: feature_factor,
                adjusted_value: round_to(comparable_value * feature_factor, 2),
            });
            comparable_weights.push(0.88);
        }
    }

    let market_value = base_value
        * market_multiplier
        * location_multiplier
        * age_factor
        * size_factor
        * feature_factor;

    comparables.push(Comparable {
        address: format!("Nearest comparable in {property_city}"),
        year_built: None,
        building_area: None,
        bedrooms: None,
        bathrooms: None,
        value: round_to(market_value * 0.98, 2),
        adjustment_factor: 1.02,
        adjusted_value: round_to(market_value * 0.98 * 1.02, 2),
    });
    comparable_weights.push(0.95);

    let confidence = if comparables.len() >= MIN_COMPARABLES {
        let mean = comparable_weights.iter().sum::<f64>() / comparable_weights.len() as f64;
        BASE_CONFIDENCE * mean
    } else {
        BASE_CONFIDENCE * THIN_COMPARABLE_PENALTY
    };

    Ok(MarketValuation {
        market_value: round_to(market_value, 2),
        base_value,
        market_multiplier,
        location_multiplier,
        age_adjustment: age_factor,
        size_adjustment: size_factor,
        feature_adjustment: feature_factor,
        property_class,
        property_city,
        comparable_properties: comparables,
        confidence_score: blended_confidence(&[confidence], 0.6, 0.95),
    })
}
