use std::collections::BTreeMap;

use regex::Regex;

use crate::assessment::property::PropertyClass;

pub const DEFAULT_PARCEL_ID_PATTERN: &str = r"^\d{8}-\d{3}$";
pub const ZIP_CODE_PATTERN: &str = r"^[0-9]{5}(-[0-9]{4})?$";
pub const DEFAULT_STATE_CODE: &str = "WA";
pub const DEFAULT_COUNTY_CODE: &str = "005";
pub const DEFAULT_COUNTY_ZIP_PREFIX: &str = "993";
pub const DEFAULT_MIN_PROPERTY_VALUE: f64 = 1_000.0;
pub const DEFAULT_MAX_PROPERTY_VALUE: f64 = 1_000_000_000.0;
pub const EARLIEST_ASSESSMENT_YEAR: i64 = 2020;

/// Rule bundle passed into every validation call.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub parcel_id_pattern: Regex,
    pub zip_code_pattern: Regex,
    pub min_property_value: f64,
    pub max_property_value: f64,
    pub property_classes: BTreeMap<PropertyClass, Vec<String>>,
    pub valuation_methods: Vec<String>,
    pub state_code: String,
    pub county_code: String,
    pub county_zip_prefix: String,
    /// Year treated as "now" for assessment and construction year checks.
    pub reference_year: i64,
    pub earliest_assessment_year: i64,
}

impl ValidationRules {
    /// Benton County, Washington defaults for the given reference year.
    pub fn benton_county(reference_year: i64) -> Self {
        Self {
            parcel_id_pattern: Regex::new(DEFAULT_PARCEL_ID_PATTERN)
                .expect("default parcel pattern compiles"),
            zip_code_pattern: Regex::new(ZIP_CODE_PATTERN).expect("zip code pattern compiles"),
            min_property_value: DEFAULT_MIN_PROPERTY_VALUE,
            max_property_value: DEFAULT_MAX_PROPERTY_VALUE,
            property_classes: default_property_classes(),
            valuation_methods: vec!["Market".to_string(), "Cost".to_string(), "Income".to_string()],
            state_code: DEFAULT_STATE_CODE.to_string(),
            county_code: DEFAULT_COUNTY_CODE.to_string(),
            county_zip_prefix: DEFAULT_COUNTY_ZIP_PREFIX.to_string(),
            reference_year,
            earliest_assessment_year: EARLIEST_ASSESSMENT_YEAR,
        }
    }

    pub fn class_labels(&self) -> String {
        self.property_classes
            .keys()
            .map(|class| class.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn default_property_classes() -> BTreeMap<PropertyClass, Vec<String>> {
    let codes = |list: &[&str]| list.iter().map(|code| code.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (PropertyClass::Residential, codes(&["R1", "R2", "R3", "R4"])),
        (PropertyClass::Commercial, codes(&["C1", "C2", "C3"])),
        (PropertyClass::Industrial, codes(&["I1", "I2", "I3"])),
        (PropertyClass::Agricultural, codes(&["A1", "A2"])),
        (PropertyClass::VacantLand, codes(&["V1", "V2"])),
        (PropertyClass::Public, codes(&["P1", "P2"])),
    ])
}
