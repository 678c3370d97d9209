use std::collections::HashMap;
use std::sync::Mutex;

use super::property::{FieldValue, PropertyRecord};
use super::validation::ValidationRules;
use super::valuation::PricingTables;
use crate::repository::{PropertyStore, RepositoryError};

pub(crate) const REFERENCE_YEAR: i64 = 2025;

pub(crate) fn rules() -> ValidationRules {
    ValidationRules::benton_county(REFERENCE_YEAR)
}

pub(crate) fn tables() -> PricingTables {
    PricingTables::benton_county(REFERENCE_YEAR)
}

/// Residential record that passes every validation rule without errors.
pub(crate) fn residential() -> PropertyRecord {
    PropertyRecord {
        parcel_id: Some("00512345-001".to_string()),
        property_address: Some("123 Main Street".to_string()),
        property_city: Some("Kennewick".to_string()),
        property_state: Some("WA".to_string()),
        property_zip: Some("99336".to_string()),
        property_class: Some("Residential".to_string()),
        property_class_code: Some("R1".to_string()),
        land_area: Some(FieldValue::Decimal(8500.0)),
        building_area: Some(FieldValue::Decimal(2200.0)),
        year_built: Some(FieldValue::Integer(1995)),
        bedrooms: Some(FieldValue::Integer(4)),
        bathrooms: Some(FieldValue::Decimal(2.5)),
        assessment_year: Some(FieldValue::Integer(REFERENCE_YEAR)),
        assessed_value: Some(FieldValue::Decimal(475000.0)),
        land_value: Some(FieldValue::Decimal(125000.0)),
        improvement_value: Some(FieldValue::Decimal(350000.0)),
        valuation_method: Some("Market".to_string()),
        ..PropertyRecord::default()
    }
}

pub(crate) fn commercial() -> PropertyRecord {
    PropertyRecord {
        parcel_id: Some("00512345-003".to_string()),
        property_address: Some("789 Business Way".to_string()),
        property_class: Some("Commercial".to_string()),
        property_class_code: Some("C1".to_string()),
        land_area: Some(FieldValue::Decimal(25000.0)),
        building_area: Some(FieldValue::Decimal(12000.0)),
        year_built: Some(FieldValue::Integer(2010)),
        bedrooms: None,
        bathrooms: None,
        assessed_value: Some(FieldValue::Decimal(1_850_000.0)),
        land_value: Some(FieldValue::Decimal(450000.0)),
        improvement_value: Some(FieldValue::Decimal(1_400_000.0)),
        valuation_method: Some("Income".to_string()),
        ..residential()
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<HashMap<String, PropertyRecord>>,
}

impl PropertyStore for MemoryStore {
    fn get(&self, parcel_id: &str) -> Result<Option<PropertyRecord>, RepositoryError> {
        let records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(records.get(parcel_id).cloned())
    }

    fn put(&self, record: PropertyRecord) -> Result<(), RepositoryError> {
        let parcel_id = record
            .parcel_id
            .clone()
            .ok_or(RepositoryError::MissingParcelId)?;
        let mut records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))?;
        records.insert(parcel_id, record);
        Ok(())
    }
}
