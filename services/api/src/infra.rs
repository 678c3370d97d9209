use assessor_ai::agents::{
    BillDocument, BillSource, BillSourceError, GenerationError, ImpactAgent, InteractionAgent,
    TextGenerator, ValidationAgent, ValuationAgent,
};
use assessor_ai::assessment::import::{records_from_path, ImportError};
use assessor_ai::assessment::{PropertyRecord, ValuationApproach};
use assessor_ai::config::AssessmentConfig;
use assessor_ai::error::AppError;
use assessor_ai::mcp::MasterControl;
use assessor_ai::repository::{PropertyStore, RepositoryError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyStore {
    records: Arc<Mutex<HashMap<String, PropertyRecord>>>,
}

impl PropertyStore for InMemoryPropertyStore {
    fn get(&self, parcel_id: &str) -> Result<Option<PropertyRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("property store mutex poisoned".into()))?;
        Ok(guard.get(parcel_id).cloned())
    }

    fn put(&self, record: PropertyRecord) -> Result<(), RepositoryError> {
        let parcel_id = record
            .parcel_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or(RepositoryError::MissingParcelId)?;
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("property store mutex poisoned".into()))?;
        guard.insert(parcel_id, record);
        Ok(())
    }
}

/// Bills tracked for the current session, served without a remote legislative feed.
const SESSION_BILLS: [(&str, &str, &str, &str); 3] = [
    (
        "HB 1234",
        "Residential Property Tax Relief Act",
        "Passed",
        "Provides assessed value relief for owner-occupied primary residences.",
    ),
    (
        "SB 5678",
        "Commercial Property Assessment Standards",
        "In Committee",
        "Updates capitalization rate guidance for the income approach.",
    ),
    (
        "HB 9012",
        "Agricultural Land Preservation Act",
        "Passed",
        "Revises criteria for current use agricultural classification.",
    ),
];

#[derive(Default, Clone, Copy)]
pub(crate) struct SessionBillSource;

impl BillSource for SessionBillSource {
    fn fetch_bill(&self, bill_id: &str) -> Result<Option<BillDocument>, BillSourceError> {
        let wanted = bill_id.trim();
        Ok(SESSION_BILLS
            .iter()
            .find(|(id, ..)| id.eq_ignore_ascii_case(wanted))
            .map(|(id, title, status, description)| BillDocument {
                bill_id: (*id).to_string(),
                title: (*title).to_string(),
                description: (*description).to_string(),
                status: Some((*status).to_string()),
                sources: vec!["session_tracker".to_string()],
            }))
    }
}

/// Text generation placeholder until a model backend is configured.
#[derive(Default, Clone, Copy)]
pub(crate) struct UnconfiguredGenerator;

impl TextGenerator for UnconfiguredGenerator {
    fn generate(&self, _prompt: &str, _system_prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

/// Build the control program with every agent registered.
pub(crate) fn build_control(
    config: &AssessmentConfig,
    store: Arc<InMemoryPropertyStore>,
) -> MasterControl {
    let rules = Arc::new(config.validation_rules());
    let tables = Arc::new(config.pricing_tables());

    let mut control = MasterControl::new();
    control.register(Arc::new(ValidationAgent::new(rules.clone())));
    control.register(Arc::new(ValuationAgent::new(tables.clone())));
    control.register(Arc::new(ImpactAgent::new(
        Arc::new(SessionBillSource),
        config.reference_year,
    )));
    control.register(Arc::new(InteractionAgent::new(
        store,
        Arc::new(UnconfiguredGenerator),
        rules,
        tables,
    )));
    control
}

/// Load records from a CSV export or a JSON file holding one record or an array of them.
pub(crate) fn load_records(path: &Path) -> Result<Vec<PropertyRecord>, AppError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        return Ok(records_from_path(path)?);
    }

    let text = std::fs::read_to_string(path)?;
    Ok(parse_records_json(&text)?)
}

pub(crate) fn parse_records_json(text: &str) -> Result<Vec<PropertyRecord>, ImportError> {
    let to_import_error = |source: serde_json::Error| ImportError::Record {
        line: source.line() as u64,
        source,
    };
    let value: serde_json::Value = serde_json::from_str(text).map_err(to_import_error)?;
    if value.is_array() {
        serde_json::from_value(value).map_err(to_import_error)
    } else {
        serde_json::from_value(value)
            .map(|record| vec![record])
            .map_err(to_import_error)
    }
}

pub(crate) fn parse_approach(raw: &str) -> Result<ValuationApproach, String> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|err: assessor_ai::assessment::ValuationError| err.to_string())
}
