use super::config::ValidationRules;
use super::ValidationResult;
use crate::assessment::property::{Coerced, FieldValue, PropertyClass, PropertyRecord};

const VALUE_RECONCILIATION_TOLERANCE: f64 = 1.0;
const MAX_REASONABLE_ROOMS: f64 = 20.0;
const EARLIEST_PLAUSIBLE_YEAR_BUILT: i64 = 1850;
const MIN_STREET_ADDRESS_LEN: usize = 5;

const BASE_REQUIRED_FIELDS: [&str; 8] = [
    "parcel_id",
    "property_address",
    "property_city",
    "property_state",
    "property_zip",
    "assessment_year",
    "assessed_value",
    "property_class",
];

/// Mutable accumulator used while the checks run; frozen into a [`ValidationResult`].
#[derive(Debug, Default)]
pub(crate) struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
    info: Vec<String>,
}

impl Findings {
    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    pub(crate) fn finish(self) -> ValidationResult {
        ValidationResult::new(self.errors, self.warnings, self.info)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|raw| !raw.is_empty())
}

/// Coerce an optional numeric field, recording conversions and failures.
fn read_number(
    field: &Option<FieldValue>,
    label: &str,
    findings: &mut Findings,
) -> Option<f64> {
    match field.as_ref()?.as_number() {
        Coerced::Native(value) => Some(value),
        Coerced::Converted(value) => {
            findings.info(format!("{label} was converted from string to number"));
            Some(value)
        }
        Coerced::Invalid => {
            findings.error(format!("{label} must be a number"));
            None
        }
    }
}

fn read_integer(
    field: &Option<FieldValue>,
    label: &str,
    findings: &mut Findings,
) -> Option<i64> {
    match field.as_ref()?.as_integer() {
        Coerced::Native(value) => Some(value),
        Coerced::Converted(value) => {
            findings.info(format!("{label} was converted from string to integer"));
            Some(value)
        }
        Coerced::Invalid => {
            findings.error(format!("{label} must be an integer"));
            None
        }
    }
}

pub(crate) fn check_parcel_id(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    let Some(parcel_id) = present(&record.parcel_id) else {
        findings.error("Parcel ID is required");
        return;
    };

    if !rules.parcel_id_pattern.is_match(parcel_id) {
        findings.error(format!(
            "Invalid parcel ID format. Must match pattern: {}",
            rules.parcel_id_pattern.as_str()
        ));
        return;
    }

    let parts: Vec<&str> = parcel_id.split('-').collect();
    if let [prefix, _] = parts.as_slice() {
        if prefix.len() == 8 && !prefix.starts_with(&rules.county_code) {
            findings.warning(format!(
                "Parcel ID should start with county code {}",
                rules.county_code
            ));
        }
    }
}

pub(crate) fn check_address(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    match present(&record.property_address) {
        None => findings.error("Property address is required"),
        Some(address) if address.chars().count() < MIN_STREET_ADDRESS_LEN => {
            findings.error("Property address is too short")
        }
        Some(address) if !address.chars().any(|ch| ch.is_ascii_digit()) => {
            findings.warning("Property address should typically include a street number")
        }
        Some(_) => {}
    }

    if present(&record.property_city).is_none() {
        findings.error("Property city is required");
    }

    match present(&record.property_state) {
        None => findings.error("Property state is required"),
        Some(state) if state != rules.state_code => findings.error(format!(
            "Property must be located in state {}",
            rules.state_code
        )),
        Some(_) => {}
    }

    match present(&record.property_zip) {
        None => findings.error("Property ZIP code is required"),
        Some(zip) if !rules.zip_code_pattern.is_match(zip) => findings.error(
            "Invalid ZIP code format. Must be 5 digits or 5+4 digits (e.g., 99320 or 99320-1234)",
        ),
        Some(zip) if !zip.starts_with(&rules.county_zip_prefix) => findings.warning(format!(
            "ZIP code may not be in the county (should start with {})",
            rules.county_zip_prefix
        )),
        Some(_) => {}
    }
}

pub(crate) fn check_assessment_year(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    if record.assessment_year.is_none() {
        findings.error("Assessment year is required");
        return;
    }

    let Some(year) = read_integer(&record.assessment_year, "Assessment year", findings) else {
        return;
    };

    if year < rules.earliest_assessment_year {
        findings.error(format!(
            "Assessment year cannot be earlier than {}",
            rules.earliest_assessment_year
        ));
    } else if year > rules.reference_year + 1 {
        findings.error(format!(
            "Assessment year cannot be later than {}",
            rules.reference_year + 1
        ));
    } else if year < rules.reference_year {
        findings.warning(format!("Assessment year {year} is in the past"));
    }
}

pub(crate) fn check_values(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    let assessed = if record.assessed_value.is_none() {
        findings.error("Assessed value is required");
        None
    } else {
        read_number(&record.assessed_value, "Assessed value", findings)
    };

    if let Some(assessed) = assessed {
        if assessed < rules.min_property_value {
            findings.error(format!(
                "Assessed value cannot be less than {}",
                format_currency(rules.min_property_value)
            ));
        } else if assessed > rules.max_property_value {
            findings.error(format!(
                "Assessed value cannot exceed {}",
                format_currency(rules.max_property_value)
            ));
        }
    }

    let land = read_number(&record.land_value, "Land value", findings);
    if let Some(land) = land {
        if land < 0.0 {
            findings.error("Land value cannot be negative");
        } else if assessed.is_some_and(|assessed| land > assessed) {
            findings.warning("Land value exceeds total assessed value");
        }
    }

    let improvement = read_number(&record.improvement_value, "Improvement value", findings);
    if improvement.is_some_and(|value| value < 0.0) {
        findings.error("Improvement value cannot be negative");
    }

    if let (Some(land), Some(improvement), Some(assessed)) = (land, improvement, assessed) {
        if ((land + improvement) - assessed).abs() > VALUE_RECONCILIATION_TOLERANCE {
            findings.warning(format!(
                "Land value ({}) + improvement value ({}) should equal assessed value ({})",
                format_amount(land),
                format_amount(improvement),
                format_amount(assessed)
            ));
        }
    }
}

/// Returns the recognized class so later checks can branch on it.
pub(crate) fn check_property_class(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) -> Option<PropertyClass> {
    let Some(raw) = present(&record.property_class) else {
        findings.error("Property class is required");
        return None;
    };

    let class = raw
        .parse::<PropertyClass>()
        .ok()
        .filter(|class| rules.property_classes.contains_key(class));
    let Some(class) = class else {
        findings.error(format!(
            "Invalid property class. Must be one of: {}",
            rules.class_labels()
        ));
        return None;
    };

    if let Some(code) = present(&record.property_class_code) {
        let valid_codes = &rules.property_classes[&class];
        if !valid_codes.iter().any(|valid| valid == code) {
            findings.error(format!(
                "Invalid property class code '{code}' for class {class}. Valid codes are: {}",
                valid_codes.join(", ")
            ));
        }
    }

    Some(class)
}

pub(crate) fn check_class_specific(
    record: &PropertyRecord,
    class: Option<PropertyClass>,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    match class {
        Some(PropertyClass::Residential) => check_residential(record, rules, findings),
        Some(PropertyClass::Commercial) => check_commercial(record, findings),
        _ => {}
    }
}

fn check_residential(record: &PropertyRecord, rules: &ValidationRules, findings: &mut Findings) {
    if let Some(bedrooms) = read_integer(&record.bedrooms, "Bedrooms value", findings) {
        if bedrooms < 0 {
            findings.error("Bedrooms cannot be negative");
        } else if bedrooms as f64 > MAX_REASONABLE_ROOMS {
            findings.warning("Unusually high number of bedrooms");
        }
    }

    if let Some(bathrooms) = read_number(&record.bathrooms, "Bathrooms value", findings) {
        if bathrooms < 0.0 {
            findings.error("Bathrooms cannot be negative");
        } else if bathrooms > MAX_REASONABLE_ROOMS {
            findings.warning("Unusually high number of bathrooms");
        }
    }

    if let Some(year_built) = read_integer(&record.year_built, "Year built", findings) {
        if year_built < EARLIEST_PLAUSIBLE_YEAR_BUILT {
            findings.warning("Year built seems unusually early");
        } else if year_built > rules.reference_year {
            findings.error(format!(
                "Year built cannot be in the future (current year: {})",
                rules.reference_year
            ));
        }
    }
}

fn check_commercial(record: &PropertyRecord, findings: &mut Findings) {
    if let Some(area) = read_number(&record.building_area, "Building area", findings) {
        if area <= 0.0 {
            findings.error("Building area must be positive");
        }
    }

    let income_approach = record
        .income_approach
        .as_ref()
        .is_some_and(|flag| flag.is_set());
    if income_approach {
        if !is_supplied(&record.cap_rate) {
            findings.warning("Capitalization rate should be provided for income approach");
        }
        if !is_supplied(&record.annual_income) {
            findings.warning("Annual income should be provided for income approach");
        }
    }
}

/// A blank, zero, or unparseable override counts as not provided.
fn is_supplied(field: &Option<FieldValue>) -> bool {
    PropertyRecord::number(field).is_some_and(|value| value != 0.0)
}

pub(crate) fn check_land_area(record: &PropertyRecord, findings: &mut Findings) {
    if let Some(area) = read_number(&record.land_area, "Land area", findings) {
        if area <= 0.0 {
            findings.error("Land area must be positive");
        }
    }
}

pub(crate) fn check_completeness(
    record: &PropertyRecord,
    class: Option<PropertyClass>,
    findings: &mut Findings,
) {
    let class_fields: &[&str] = match class {
        Some(PropertyClass::Residential) => &["land_value", "improvement_value", "land_area"],
        Some(PropertyClass::Commercial) => &[
            "land_value",
            "improvement_value",
            "land_area",
            "building_area",
        ],
        _ => &[],
    };

    let missing: Vec<&str> = BASE_REQUIRED_FIELDS
        .iter()
        .chain(class_fields)
        .copied()
        .filter(|field| !record.has_field(field))
        .collect();

    if !missing.is_empty() {
        findings.error(format!("Missing required fields: {}", missing.join(", ")));
    }
}

pub(crate) fn check_valuation_method(
    record: &PropertyRecord,
    rules: &ValidationRules,
    findings: &mut Findings,
) {
    if let Some(method) = record.valuation_method.as_deref() {
        if !rules.valuation_methods.iter().any(|valid| valid == method) {
            findings.error(format!(
                "Invalid valuation method. Must be one of: {}",
                rules.valuation_methods.join(", ")
            ));
        }
    }
}

/// `1234567.5` -> `1,234,567.50`.
pub(crate) fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

pub(crate) fn format_currency(value: f64) -> String {
    format!("${}", format_amount(value))
}
