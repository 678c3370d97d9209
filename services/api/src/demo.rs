use crate::infra::{build_control, load_records, parse_approach, InMemoryPropertyStore};
use assessor_ai::assessment::{
    FieldValue, PropertyRecord, ValidationResult, ValuationApproach, ValuationResult,
};
use assessor_ai::config::AppConfig;
use assessor_ai::error::AppError;
use assessor_ai::mcp::{payload, MasterControl, Message, MessageType, Response};
use assessor_ai::service::AssessmentService;
use clap::Args;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// JSON (single record or array) or CSV export of property records
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print informational findings as well as errors and warnings
    #[arg(long)]
    pub(crate) verbose: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValueArgs {
    /// JSON (single record or array) or CSV export of property records
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Valuation approach: market, cost, or income
    #[arg(long, default_value = "market", value_parser = parse_approach)]
    pub(crate) approach: ValuationApproach,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Staff question routed to the interaction agent at the end of the demo
    #[arg(long)]
    pub(crate) query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    property_data: PropertyRecord,
    validation_results: ValidationResult,
}

fn dispatch(control: &MasterControl, message_type: MessageType, body: serde_json::Value) -> Response {
    control.route(&Message::new(message_type.as_str(), payload(body)).from_sender("cli"))
}

fn parcel_label(record: &PropertyRecord) -> &str {
    record.parcel_id.as_deref().unwrap_or("<no parcel id>")
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let records = load_records(&args.input)?;
    let control = build_control(
        &config.assessment,
        Arc::new(InMemoryPropertyStore::default()),
    );

    let response = dispatch(
        &control,
        MessageType::BatchValidate,
        json!({ "properties": records }),
    );
    let entries: Vec<BatchEntry> = match response.decode("batch_results") {
        Some(Ok(entries)) => entries,
        _ => {
            println!(
                "Validation failed: {}",
                response.error.as_deref().unwrap_or("no results returned")
            );
            return Ok(());
        }
    };

    println!("Validated {} record(s) from {}", entries.len(), args.input.display());
    for entry in &entries {
        let result = &entry.validation_results;
        let verdict = if result.has_errors { "INVALID" } else { "valid" };
        println!("\n{} [{}]", parcel_label(&entry.property_data), verdict);
        for error in &result.errors {
            println!("  error: {error}");
        }
        for warning in &result.warnings {
            println!("  warning: {warning}");
        }
        if args.verbose {
            for info in &result.info {
                println!("  info: {info}");
            }
        }
    }

    let summary = &response.data["summary"];
    println!(
        "\nSummary: {} total | {} valid | {} invalid",
        summary["total"], summary["valid"], summary["invalid"]
    );
    Ok(())
}

pub(crate) fn run_value(args: ValueArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let records = load_records(&args.input)?;
    let control = build_control(
        &config.assessment,
        Arc::new(InMemoryPropertyStore::default()),
    );

    println!(
        "Valuing {} record(s) with the {} approach",
        records.len(),
        args.approach
    );
    for record in &records {
        let response = dispatch(
            &control,
            MessageType::PropertyValuation,
            json!({ "property_data": record, "valuation_approach": args.approach }),
        );
        match response.decode::<ValuationResult>("valuation_results") {
            Some(Ok(result)) => print_valuation(parcel_label(record), &result),
            _ => println!(
                "- {}: {}",
                parcel_label(record),
                response.error.as_deref().unwrap_or("no valuation returned")
            ),
        }
    }
    Ok(())
}

fn print_valuation(label: &str, result: &ValuationResult) {
    match result.estimated_value() {
        Some(estimate) => println!(
            "- {label}: ${estimate:.2} ({}, confidence {:.2})",
            result.approach(),
            result.confidence_score()
        ),
        None => println!("- {label}: {} approach not applicable", result.approach()),
    }
}

fn sample_records(reference_year: i64) -> Vec<PropertyRecord> {
    let residential = PropertyRecord {
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
        assessment_year: Some(FieldValue::Integer(reference_year)),
        assessed_value: Some(FieldValue::Decimal(475_000.0)),
        land_value: Some(FieldValue::Decimal(125_000.0)),
        improvement_value: Some(FieldValue::Decimal(350_000.0)),
        valuation_method: Some("Market".to_string()),
        ..PropertyRecord::default()
    };
    let commercial = PropertyRecord {
        parcel_id: Some("00512345-003".to_string()),
        property_address: Some("789 Business Way".to_string()),
        property_city: Some("Richland".to_string()),
        property_zip: Some("99352".to_string()),
        property_class: Some("Commercial".to_string()),
        property_class_code: Some("C1".to_string()),
        land_area: Some(FieldValue::Decimal(25_000.0)),
        building_area: Some(FieldValue::Decimal(12_000.0)),
        year_built: Some(FieldValue::Integer(2010)),
        bedrooms: None,
        bathrooms: None,
        assessed_value: Some(FieldValue::Decimal(1_850_000.0)),
        land_value: Some(FieldValue::Decimal(450_000.0)),
        improvement_value: Some(FieldValue::Decimal(1_400_000.0)),
        valuation_method: Some("Income".to_string()),
        ..residential.clone()
    };
    let out_of_state = PropertyRecord {
        parcel_id: Some("0051-2345".to_string()),
        property_state: Some("OR".to_string()),
        property_zip: Some("97201".to_string()),
        ..residential.clone()
    };
    vec![residential, commercial, out_of_state]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(InMemoryPropertyStore::default());
    let control = Arc::new(build_control(&config.assessment, store.clone()));
    let service = AssessmentService::new(control.clone(), store);

    println!("Assessment control program demo");
    let status = control.status();
    println!("Registered agents:");
    for (name, agent) in &status.agents {
        let types: Vec<&str> = agent.message_types.iter().map(|t| t.as_str()).collect();
        println!("  - {name}: {}", types.join(", "));
    }

    println!("\nRecord intake");
    let mut stored = Vec::new();
    for record in sample_records(config.assessment.reference_year) {
        let label = parcel_label(&record).to_string();
        match service.submit(record) {
            Ok(submission) if submission.stored => {
                println!(
                    "  - {label}: stored ({} warning(s))",
                    submission.validation_results.warnings.len()
                );
                stored.push(label);
            }
            Ok(submission) => {
                println!("  - {label}: rejected");
                for error in &submission.validation_results.errors {
                    println!("      {error}");
                }
            }
            Err(err) => println!("  - {label}: {err}"),
        }
    }

    println!("\nValuations");
    for parcel_id in &stored {
        for approach in ValuationApproach::ALL {
            match service.value(parcel_id, approach) {
                Ok(result) => print_valuation(parcel_id, &result),
                Err(err) => println!("- {parcel_id}: {approach} approach failed: {err}"),
            }
        }
    }

    let overview = dispatch(
        &control,
        MessageType::PropertyImpact,
        json!({ "analysis_type": "overview" }),
    );
    let session = &overview.data["legislative_overview"]["session"];
    println!("\nLegislative overview: {}", session.as_str().unwrap_or("unavailable"));
    if let Some(bills) = overview.data["legislative_overview"]["recent_bills"].as_array() {
        for bill in bills {
            println!(
                "  - {} {} ({})",
                bill["bill_id"].as_str().unwrap_or_default(),
                bill["title"].as_str().unwrap_or_default(),
                bill["status"].as_str().unwrap_or_default()
            );
        }
    }

    let query = args
        .query
        .unwrap_or_else(|| "Estimate the value of this property".to_string());
    let reply = dispatch(
        &control,
        MessageType::UserQuery,
        json!({
            "query": query,
            "context": { "parcel_id": stored.first(), "valuation_approach": "cost" },
        }),
    );
    println!("\nQ: {query}");
    match reply.data.get("response").and_then(|text| text.as_str()) {
        Some(text) => println!("A: {text}"),
        None => println!("A: {}", reply.error.as_deref().unwrap_or("no answer")),
    }

    Ok(())
}
