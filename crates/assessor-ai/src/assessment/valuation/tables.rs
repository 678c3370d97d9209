use std::collections::BTreeMap;

use crate::assessment::property::PropertyClass;

/// Pricing inputs shared by the three valuation approaches.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTables {
    /// Year building ages are measured against.
    pub reference_year: i64,
    /// Market appreciation multiplier per class.
    pub class_multipliers: BTreeMap<PropertyClass, f64>,
    /// Market location multiplier per city.
    pub location_multipliers: BTreeMap<String, f64>,
    /// Cost approach land value per square foot per city.
    pub land_value_per_sqft: BTreeMap<String, f64>,
    pub default_land_value_per_sqft: f64,
    /// Income approach rental location factor per city.
    pub rental_location_factors: BTreeMap<String, f64>,
    /// Attribute fallbacks used when a record omits building data.
    pub fallback: FallbackAttributes,
}

/// Values the cost and income approaches assume when the record is silent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackAttributes {
    pub property_city: &'static str,
    pub year_built: i64,
    pub building_area: f64,
    pub land_area: f64,
}

impl Default for FallbackAttributes {
    fn default() -> Self {
        Self {
            property_city: "Kennewick",
            year_built: 2000,
            building_area: 1500.0,
            land_area: 5000.0,
        }
    }
}

fn city_table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(city, factor)| (city.to_string(), *factor))
        .collect()
}

impl PricingTables {
    /// Benton County, Washington pricing for the given reference year.
    pub fn benton_county(reference_year: i64) -> Self {
        Self {
            reference_year,
            class_multipliers: BTreeMap::from([
                (PropertyClass::Residential, 1.05),
                (PropertyClass::Commercial, 1.03),
                (PropertyClass::Industrial, 1.02),
                (PropertyClass::Agricultural, 1.01),
                (PropertyClass::VacantLand, 1.04),
                (PropertyClass::Public, 1.00),
            ]),
            location_multipliers: city_table(&[
                ("Kennewick", 1.02),
                ("Richland", 1.03),
                ("West Richland", 1.04),
                ("Prosser", 0.95),
                ("Benton City", 0.93),
            ]),
            land_value_per_sqft: city_table(&[
                ("Kennewick", 12.0),
                ("Richland", 14.0),
                ("West Richland", 13.0),
                ("Prosser", 8.0),
                ("Benton City", 7.0),
            ]),
            default_land_value_per_sqft: 10.0,
            rental_location_factors: city_table(&[
                ("Kennewick", 1.0),
                ("Richland", 1.05),
                ("West Richland", 1.02),
                ("Prosser", 0.85),
                ("Benton City", 0.8),
            ]),
            fallback: FallbackAttributes::default(),
        }
    }

    pub fn class_multiplier(&self, class: Option<PropertyClass>) -> f64 {
        class
            .and_then(|class| self.class_multipliers.get(&class).copied())
            .unwrap_or(1.0)
    }

    pub fn location_multiplier(&self, city: &str) -> f64 {
        self.location_multipliers.get(city).copied().unwrap_or(1.0)
    }

    pub fn land_rate(&self, city: &str) -> f64 {
        self.land_value_per_sqft
            .get(city)
            .copied()
            .unwrap_or(self.default_land_value_per_sqft)
    }

    pub fn rental_location_factor(&self, city: &str) -> f64 {
        self.rental_location_factors.get(city).copied().unwrap_or(1.0)
    }
}
