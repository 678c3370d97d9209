use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Assessor classification for a taxable parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyClass {
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    #[serde(rename = "Vacant Land")]
    VacantLand,
    Public,
}

impl PropertyClass {
    pub const ALL: [PropertyClass; 6] = [
        PropertyClass::Residential,
        PropertyClass::Commercial,
        PropertyClass::Industrial,
        PropertyClass::Agricultural,
        PropertyClass::VacantLand,
        PropertyClass::Public,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            PropertyClass::Residential => "Residential",
            PropertyClass::Commercial => "Commercial",
            PropertyClass::Industrial => "Industrial",
            PropertyClass::Agricultural => "Agricultural",
            PropertyClass::VacantLand => "Vacant Land",
            PropertyClass::Public => "Public",
        }
    }

    /// Classes the income approach can be applied to.
    pub const fn is_income_producing(self) -> bool {
        matches!(self, PropertyClass::Commercial | PropertyClass::Industrial)
    }
}

impl fmt::Display for PropertyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown property class '{0}'")]
pub struct UnknownPropertyClass(pub String);

impl FromStr for PropertyClass {
    type Err = UnknownPropertyClass;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PropertyClass::ALL
            .into_iter()
            .find(|class| class.label() == value)
            .ok_or_else(|| UnknownPropertyClass(value.to_string()))
    }
}

/// Raw numeric input as submitted by staff or imported from exports.
///
/// Records arrive from forms and spreadsheets, so numbers are frequently strings. The
/// validator reports coercions; the valuation calculators only see coerced values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Outcome of reading a [`FieldValue`] as a specific numeric type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced<T> {
    Native(T),
    Converted(T),
    Invalid,
}

impl<T: Copy> Coerced<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Coerced::Native(value) | Coerced::Converted(value) => Some(value),
            Coerced::Invalid => None,
        }
    }
}

/// 2^63: every whole `f64` in `[-2^63, 2^63)` converts to `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Whole-valued decimals such as `2025.0` are integers; `2025.7` or `1e300` are not.
fn is_whole_i64(value: f64) -> bool {
    value.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&value)
}

impl FieldValue {
    pub fn as_integer(&self) -> Coerced<i64> {
        match self {
            FieldValue::Integer(value) => Coerced::Native(*value),
            FieldValue::Decimal(value) if is_whole_i64(*value) => Coerced::Native(*value as i64),
            FieldValue::Text(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Coerced::Converted)
                .unwrap_or(Coerced::Invalid),
            _ => Coerced::Invalid,
        }
    }

    pub fn as_number(&self) -> Coerced<f64> {
        match self {
            FieldValue::Integer(value) => Coerced::Native(*value as f64),
            FieldValue::Decimal(value) => Coerced::Native(*value),
            FieldValue::Text(raw) => match raw.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Coerced::Converted(value),
                _ => Coerced::Invalid,
            },
            FieldValue::Other(_) => Coerced::Invalid,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Decimal(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Flag field accepting either a boolean or the `"Yes"`/`"No"` strings used by intake forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl FlagValue {
    pub fn is_set(&self) -> bool {
        match self {
            FlagValue::Bool(flag) => *flag,
            FlagValue::Text(raw) => matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "yes" | "y" | "true"
            ),
        }
    }
}

/// Property record as submitted for validation or valuation.
///
/// Every field is optional at the type level; requiredness is a validation concern so a
/// single call can report every missing field at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_class_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_area: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_area: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_year: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessed_value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_value: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_approach: Option<FlagValue>,
    /// Capitalization rate expressed as a percentage (7.5 means 7.5%).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_rate: Option<FieldValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_income: Option<FieldValue>,
}

impl PropertyRecord {
    /// Parsed property class, `None` when absent or unrecognized.
    pub fn class(&self) -> Option<PropertyClass> {
        self.property_class
            .as_deref()
            .and_then(|raw| raw.parse().ok())
    }

    pub fn city(&self) -> Option<&str> {
        self.property_city.as_deref()
    }

    pub fn number(field: &Option<FieldValue>) -> Option<f64> {
        field.as_ref().and_then(|value| value.as_number().value())
    }

    pub fn integer(field: &Option<FieldValue>) -> Option<i64> {
        field.as_ref().and_then(|value| value.as_integer().value())
    }

    /// Presence check used by the completeness rule: `None` and JSON `null` count as missing.
    pub fn has_field(&self, name: &str) -> bool {
        match name {
            "parcel_id" => self.parcel_id.is_some(),
            "property_address" => self.property_address.is_some(),
            "property_city" => self.property_city.is_some(),
            "property_state" => self.property_state.is_some(),
            "property_zip" => self.property_zip.is_some(),
            "property_class" => self.property_class.is_some(),
            "property_class_code" => self.property_class_code.is_some(),
            "land_area" => self.land_area.is_some(),
            "building_area" => self.building_area.is_some(),
            "year_built" => self.year_built.is_some(),
            "bedrooms" => self.bedrooms.is_some(),
            "bathrooms" => self.bathrooms.is_some(),
            "assessment_year" => self.assessment_year.is_some(),
            "assessed_value" => self.assessed_value.is_some(),
            "land_value" => self.land_value.is_some(),
            "improvement_value" => self.improvement_value.is_some(),
            "valuation_method" => self.valuation_method.is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_strings_deserialize_as_text_and_coerce() {
        let record: PropertyRecord = serde_json::from_value(json!({
            "assessment_year": "2025",
            "assessed_value": "425000.50",
            "bedrooms": 3,
            "bathrooms": 2.5,
        }))
        .expect("record parses");

        let year = record.assessment_year.as_ref().expect("year present");
        assert_eq!(year.as_integer(), Coerced::Converted(2025));
        let assessed = record.assessed_value.as_ref().expect("value present");
        assert_eq!(assessed.as_number(), Coerced::Converted(425000.50));
        assert_eq!(PropertyRecord::integer(&record.bedrooms), Some(3));
        assert_eq!(PropertyRecord::number(&record.bathrooms), Some(2.5));
    }

    #[test]
    fn decimals_are_integers_only_when_whole_and_in_range() {
        assert_eq!(FieldValue::Decimal(2025.0).as_integer(), Coerced::Native(2025));
        assert_eq!(FieldValue::Decimal(-3.0).as_integer(), Coerced::Native(-3));
        assert_eq!(FieldValue::Decimal(2025.7).as_integer(), Coerced::Invalid);
        assert_eq!(FieldValue::Decimal(1e300).as_integer(), Coerced::Invalid);
        assert_eq!(FieldValue::Decimal(-1e300).as_integer(), Coerced::Invalid);
        assert_eq!(FieldValue::Decimal(9.3e18).as_integer(), Coerced::Invalid);
        assert_eq!(FieldValue::Decimal(f64::NAN).as_integer(), Coerced::Invalid);
        assert_eq!(FieldValue::Decimal(f64::INFINITY).as_integer(), Coerced::Invalid);
        assert_eq!(PropertyRecord::integer(&Some(FieldValue::Decimal(1e300))), None);
    }

    #[test]
    fn null_fields_are_treated_as_missing() {
        let record: PropertyRecord = serde_json::from_value(json!({
            "parcel_id": null,
            "land_value": null,
        }))
        .expect("record parses");

        assert!(!record.has_field("parcel_id"));
        assert!(!record.has_field("land_value"));
    }

    #[test]
    fn non_numeric_values_are_invalid() {
        let value: FieldValue = serde_json::from_value(json!({"amount": 5})).expect("parses");
        assert_eq!(value.as_number(), Coerced::Invalid);
        assert_eq!(FieldValue::from("n/a").as_integer(), Coerced::Invalid);
    }

    #[test]
    fn property_class_round_trips_labels() {
        assert_eq!("Vacant Land".parse::<PropertyClass>(), Ok(PropertyClass::VacantLand));
        assert!("Mixed Use".parse::<PropertyClass>().is_err());
        assert_eq!(
            serde_json::to_value(PropertyClass::VacantLand).expect("serializes"),
            json!("Vacant Land")
        );
    }

    #[test]
    fn income_flag_accepts_form_strings() {
        assert!(FlagValue::Text("Yes".to_string()).is_set());
        assert!(!FlagValue::Text("No".to_string()).is_set());
        assert!(FlagValue::Bool(true).is_set());
    }
}
