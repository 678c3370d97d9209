mod config;
mod rules;

pub use config::{
    ValidationRules, DEFAULT_COUNTY_CODE, DEFAULT_COUNTY_ZIP_PREFIX, DEFAULT_MAX_PROPERTY_VALUE,
    DEFAULT_MIN_PROPERTY_VALUE, DEFAULT_PARCEL_ID_PATTERN, DEFAULT_STATE_CODE,
    EARLIEST_ASSESSMENT_YEAR,
};

use serde::{Deserialize, Serialize};

use super::property::PropertyRecord;
pub(crate) use rules::format_currency;
use rules::Findings;

/// Diagnostics produced for a single property record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub has_errors: bool,
    pub has_warnings: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>, warnings: Vec<String>, info: Vec<String>) -> Self {
        Self {
            has_errors: !errors.is_empty(),
            has_warnings: !warnings.is_empty(),
            errors,
            warnings,
            info,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors
    }
}

/// Aggregate outcome of validating several records in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchValidation {
    pub results: Vec<ValidationResult>,
    pub valid_count: usize,
    pub invalid_count: usize,
    pub total: usize,
}

impl BatchValidation {
    /// True when every record validated without errors (vacuously true when empty).
    pub fn all_valid(&self) -> bool {
        self.invalid_count == 0
    }
}

/// Run every rule against `record`, accumulating errors, warnings, and informational notes.
///
/// Checks never short-circuit: a record with several problems reports all of them.
pub fn validate(record: &PropertyRecord, rules: &ValidationRules) -> ValidationResult {
    let mut findings = Findings::default();

    rules::check_parcel_id(record, rules, &mut findings);
    rules::check_address(record, rules, &mut findings);
    rules::check_assessment_year(record, rules, &mut findings);
    rules::check_values(record, rules, &mut findings);

    let class = rules::check_property_class(record, rules, &mut findings);
    rules::check_class_specific(record, class, rules, &mut findings);
    rules::check_land_area(record, &mut findings);
    rules::check_completeness(record, class, &mut findings);
    rules::check_valuation_method(record, rules, &mut findings);

    findings.finish()
}

pub fn validate_batch(records: &[PropertyRecord], rules: &ValidationRules) -> BatchValidation {
    let results: Vec<ValidationResult> = records
        .iter()
        .map(|record| validate(record, rules))
        .collect();
    let valid_count = results.iter().filter(|result| result.is_valid()).count();
    let total = results.len();

    BatchValidation {
        results,
        valid_count,
        invalid_count: total - valid_count,
        total,
    }
}
