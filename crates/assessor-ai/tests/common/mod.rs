#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use assessor_ai::agents::{
    BillDocument, BillSource, BillSourceError, GenerationError, ImpactAgent, InteractionAgent,
    TextGenerator, ValidationAgent, ValuationAgent,
};
use assessor_ai::assessment::{FieldValue, PricingTables, PropertyRecord, ValidationRules};
use assessor_ai::mcp::MasterControl;
use assessor_ai::repository::{PropertyStore, RepositoryError};

pub const REFERENCE_YEAR: i64 = 2025;

pub fn rules() -> Arc<ValidationRules> {
    Arc::new(ValidationRules::benton_county(REFERENCE_YEAR))
}

pub fn tables() -> Arc<PricingTables> {
    Arc::new(PricingTables::benton_county(REFERENCE_YEAR))
}

pub fn residential() -> PropertyRecord {
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

pub fn commercial() -> PropertyRecord {
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
pub struct Records(Mutex<HashMap<String, PropertyRecord>>);

impl PropertyStore for Records {
    fn get(&self, parcel_id: &str) -> Result<Option<PropertyRecord>, RepositoryError> {
        let records = self
            .0
            .lock()
            .map_err(|_| RepositoryError::Unavailable("poisoned".to_string()))?;
        Ok(records.get(parcel_id).cloned())
    }

    fn put(&self, record: PropertyRecord) -> Result<(), RepositoryError> {
        let parcel_id = record
            .parcel_id
            .clone()
            .ok_or(RepositoryError::MissingParcelId)?;
        self.0
            .lock()
            .map_err(|_| RepositoryError::Unavailable("poisoned".to_string()))?
            .insert(parcel_id, record);
        Ok(())
    }
}

pub struct OneBill;

impl BillSource for OneBill {
    fn fetch_bill(&self, bill_id: &str) -> Result<Option<BillDocument>, BillSourceError> {
        Ok((bill_id == "SB 5678").then(|| BillDocument {
            bill_id: bill_id.to_string(),
            title: "Commercial Property Assessment Standards".to_string(),
            description: "Updates capitalization rate guidance.".to_string(),
            status: Some("In Committee".to_string()),
            sources: vec!["state_legislature".to_string()],
        }))
    }
}

pub struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _prompt: &str, _system_prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Control program with every agent registered over a store seeded with both fixtures.
pub fn control() -> MasterControl {
    let store = Records::default();
    store.put(residential()).expect("seed residential");
    store.put(commercial()).expect("seed commercial");

    let mut control = MasterControl::new();
    control.register(Arc::new(ValidationAgent::new(rules())));
    control.register(Arc::new(ValuationAgent::new(tables())));
    control.register(Arc::new(ImpactAgent::new(Arc::new(OneBill), REFERENCE_YEAR)));
    control.register(Arc::new(InteractionAgent::new(
        Arc::new(store),
        Arc::new(Offline),
        rules(),
        tables(),
    )));
    control
}
