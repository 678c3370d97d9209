mod common;

use assessor_ai::assessment::import::records_from_reader;
use assessor_ai::assessment::valuation::value;
use assessor_ai::assessment::{validate, validate_batch, ValuationApproach};

use common::{commercial, residential, rules, tables};

const EXPORT: &str = "\
parcel_id,property_address,property_city,property_state,property_zip,property_class,property_class_code,land_area,building_area,year_built,bedrooms,bathrooms,assessment_year,assessed_value,land_value,improvement_value,valuation_method
00512345-001,123 Main Street,Kennewick,WA,99336,Residential,R1,8500,2200,1995,4,2.5,2025,475000,125000,350000,Market
00512345-002,456 Oak Avenue,Portland,OR,97201,Residential,R2,6000,1800,nineteen-eighty,3,2,2025,325000,90000,235000,Market
";

#[test]
fn imported_export_validates_like_typed_records() {
    let records = records_from_reader(EXPORT.as_bytes()).expect("export parses");
    assert_eq!(records.len(), 2);

    let batch = validate_batch(&records, &rules());
    assert_eq!(batch.total, 2);
    assert_eq!(batch.valid_count, 1);
    assert_eq!(batch.invalid_count, 1);

    let rejected = &batch.results[1];
    assert!(rejected
        .errors
        .iter()
        .any(|message| message == "Property must be located in state WA"));
    assert!(rejected
        .errors
        .iter()
        .any(|message| message.contains("Year built")));

    let first = validate(&records[0], &rules());
    assert_eq!(first, validate(&residential(), &rules()));
}

#[test]
fn imported_records_value_like_typed_records() {
    let records = records_from_reader(EXPORT.as_bytes()).expect("export parses");
    let tables = tables();

    for approach in [ValuationApproach::Market, ValuationApproach::Cost] {
        let imported = value(&records[0], approach, &tables).expect("imported record values");
        let typed = value(&residential(), approach, &tables).expect("typed record values");
        assert_eq!(imported.estimated_value(), typed.estimated_value());
        assert_eq!(imported.confidence_score(), typed.confidence_score());
    }

    let cost = value(&records[0], ValuationApproach::Cost, &tables).expect("cost approach");
    assert_eq!(cost.estimated_value(), Some(490575.0));
}

#[test]
fn approaches_disagree_within_reason_for_commercial_property() {
    let tables = tables();
    let estimates: Vec<f64> = [
        ValuationApproach::Market,
        ValuationApproach::Cost,
        ValuationApproach::Income,
    ]
    .into_iter()
    .map(|approach| {
        let result = value(&commercial(), approach, &tables).expect("commercial values");
        assert!((0.6..=0.95).contains(&result.confidence_score()));
        result.estimated_value().expect("every approach applies")
    })
    .collect();

    assert!(estimates.iter().all(|estimate| *estimate > 0.0));
    assert!((estimates[2] - 1457652.86).abs() < 0.01);
}

#[test]
fn residential_income_is_reported_not_estimated() {
    let result = value(&residential(), ValuationApproach::Income, &tables()).expect("income runs");

    assert_eq!(result.estimated_value(), None);
}
