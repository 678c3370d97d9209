use proptest::prelude::*;

use super::{depreciation_rate, value, ValuationApproach, ValuationError, ValuationResult};
use crate::assessment::fixtures::{commercial, residential, tables};
use crate::assessment::property::{FieldValue, PropertyClass, PropertyRecord};

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 0.011
}

fn market(record: &PropertyRecord) -> super::MarketValuation {
    match value(record, ValuationApproach::Market, &tables()) {
        Ok(ValuationResult::Market(result)) => result,
        other => panic!("expected market valuation, got {other:?}"),
    }
}

fn cost(record: &PropertyRecord) -> super::CostValuation {
    match value(record, ValuationApproach::Cost, &tables()) {
        Ok(ValuationResult::Cost(result)) => result,
        other => panic!("expected cost valuation, got {other:?}"),
    }
}

fn income(record: &PropertyRecord) -> super::IncomeValuation {
    match value(record, ValuationApproach::Income, &tables()) {
        Ok(ValuationResult::Income(result)) => result,
        other => panic!("expected income valuation, got {other:?}"),
    }
}

#[test]
fn approach_names_parse() {
    assert_eq!("cost".parse::<ValuationApproach>(), Ok(ValuationApproach::Cost));
    assert_eq!(
        "comparative".parse::<ValuationApproach>(),
        Err(ValuationError::UnknownApproach("comparative".to_string()))
    );
}

#[test]
fn bare_residential_market_value_applies_class_and_location_only() {
    let record = PropertyRecord {
        property_class: Some("Residential".to_string()),
        property_city: Some("Kennewick".to_string()),
        assessed_value: Some(FieldValue::Integer(480000)),
        ..PropertyRecord::default()
    };

    let result = market(&record);

    assert!(close(result.market_value, 514080.00), "{}", result.market_value);
    assert_eq!(result.age_adjustment, 1.0);
    assert_eq!(result.size_adjustment, 1.0);
    assert_eq!(result.feature_adjustment, 1.0);
    assert_eq!(result.comparable_properties.len(), 1);
    assert_eq!(result.confidence_score, 0.68);
}

#[test]
fn full_residential_market_value_uses_every_adjustment() {
    let result = market(&residential());

    assert_eq!(result.age_adjustment, 0.95);
    assert_eq!(result.feature_adjustment, 1.08);
    assert!(close(result.market_value, 521951.85), "{}", result.market_value);
    assert_eq!(result.comparable_properties.len(), 4);
    assert_eq!(result.confidence_score, 0.78);
}

#[test]
fn market_defaults_missing_class_and_city() {
    let record = PropertyRecord {
        assessed_value: Some(FieldValue::Integer(100000)),
        ..PropertyRecord::default()
    };

    let result = market(&record);

    assert_eq!(result.property_class, "Residential");
    assert_eq!(result.property_city, "Kennewick");
    assert!(close(result.market_value, 107100.0));
}

#[test]
fn unknown_city_uses_neutral_location() {
    let record = PropertyRecord {
        property_city: Some("Pasco".to_string()),
        ..residential()
    };

    assert_eq!(market(&record).location_multiplier, 1.0);
    assert_eq!(cost(&record).land_value_per_sqft, 10.0);
}

#[test]
fn residential_cost_breakdown() {
    let result = cost(&residential());

    assert_eq!(result.building_age, 30);
    assert_eq!(result.depreciation_rate, 0.215);
    assert_eq!(result.quality_factor, 1.0);
    assert!(close(result.replacement_cost, 495000.0));
    assert!(close(result.depreciated_cost, 388575.0));
    assert_eq!(result.functional_obsolescence, 0.0);
    assert!(close(result.land_value, 102000.0));
    assert!(close(result.cost_value, 490575.0));
    assert!((0.6..=0.9).contains(&result.confidence_score));
}

#[test]
fn old_buildings_carry_functional_obsolescence() {
    let record = PropertyRecord {
        year_built: Some(FieldValue::Integer(1980)),
        ..residential()
    };

    let result = cost(&record);

    assert!(result.functional_obsolescence > 0.0);
    assert!(close(
        result.functional_obsolescence,
        result.depreciated_cost * 0.05
    ));
}

#[test]
fn commercial_land_is_priced_at_a_premium() {
    let result = cost(&commercial());

    assert_eq!(result.land_value_per_sqft, 18.0);
    assert_eq!(result.replacement_cost_per_sqft, 180.0);
}

#[test]
fn cost_fallbacks_lower_confidence() {
    let record = PropertyRecord {
        property_class: Some("Residential".to_string()),
        ..PropertyRecord::default()
    };

    let result = cost(&record);

    assert_eq!(result.building_area, 1500.0);
    assert_eq!(result.land_area, 5000.0);
    assert_eq!(result.building_age, 25);
    assert!(result.confidence_score < cost(&residential()).confidence_score);
}

#[test]
fn income_rejects_residential_records() {
    let record = PropertyRecord {
        cap_rate: Some(FieldValue::Decimal(6.5)),
        annual_income: Some(FieldValue::Integer(90000)),
        ..residential()
    };

    let result = income(&record);

    assert_eq!(result.income_value, None);
    assert_eq!(result.confidence_score, 0.0);
    assert!(result.breakdown.is_none());
    assert_eq!(
        result.error.as_deref(),
        Some("Income approach is only applicable for Commercial and Industrial properties")
    );

    let json = serde_json::to_value(ValuationResult::Income(result)).expect("serialize");
    assert_eq!(json["income_value"], serde_json::Value::Null);
    assert_eq!(json["methodology"], "income_approach");
}

#[test]
fn commercial_income_from_market_rent() {
    let result = income(&commercial());
    let breakdown = result.breakdown.as_ref().expect("breakdown");

    assert_eq!(breakdown.building_age, 15);
    assert_eq!(breakdown.age_factor, 0.9);
    assert_eq!(breakdown.vacancy_rate, 0.05);
    assert_eq!(breakdown.expense_ratio, 0.35);
    assert_eq!(breakdown.cap_rate, 0.07);
    assert!(close(breakdown.potential_gross_income, 165240.0));
    assert!(close(breakdown.net_operating_income, 102035.7));
    assert!(close(result.income_value.unwrap_or_default(), 1457652.86));
    assert_eq!(result.confidence_score, 0.8);
}

#[test]
fn income_overrides_replace_market_inputs() {
    let capped = PropertyRecord {
        cap_rate: Some(FieldValue::Decimal(8.0)),
        ..commercial()
    };
    let capped = income(&capped);
    assert_eq!(capped.breakdown.as_ref().map(|b| b.cap_rate), Some(0.08));
    assert!(close(capped.income_value.unwrap_or_default(), 1275446.25));

    let reported = PropertyRecord {
        annual_income: Some(FieldValue::Integer(200000)),
        ..commercial()
    };
    let reported = income(&reported);
    assert!(close(reported.income_value.unwrap_or_default(), 1764285.71));
    assert!(reported.confidence_score > 0.8);
}

#[test]
fn non_positive_cap_rate_is_rejected() {
    let record = PropertyRecord {
        cap_rate: Some(FieldValue::Integer(-2)),
        ..commercial()
    };

    assert_eq!(
        value(&record, ValuationApproach::Income, &tables()),
        Err(ValuationError::NonPositiveCapRate(-2.0))
    );
}

#[test]
fn result_exposes_estimate_and_tag() {
    let result = value(&residential(), ValuationApproach::Cost, &tables()).expect("valuation");

    assert_eq!(result.approach(), ValuationApproach::Cost);
    assert!(result.estimated_value().is_some());

    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["methodology"], "cost_approach");
}

#[test]
fn unrepresentable_decimal_build_years_count_as_missing() {
    let without_year = PropertyRecord {
        year_built: None,
        ..commercial()
    };

    for year_built in [1e300, -1e300] {
        let record = PropertyRecord {
            year_built: Some(FieldValue::Decimal(year_built)),
            ..commercial()
        };
        for approach in ValuationApproach::ALL {
            let result = value(&record, approach, &tables()).expect("valuation");
            let baseline = value(&without_year, approach, &tables()).expect("valuation");
            assert_eq!(result, baseline, "{approach} with year {year_built}");
        }
    }
}

#[test]
fn overflowing_building_age_is_an_error() {
    let record = PropertyRecord {
        year_built: Some(FieldValue::Integer(i64::MIN)),
        ..commercial()
    };

    for approach in ValuationApproach::ALL {
        assert_eq!(
            value(&record, approach, &tables()),
            Err(ValuationError::OutOfRange {
                quantity: "building age",
                year_built: i64::MIN,
            }),
            "{approach}"
        );
    }

    let far_future = PropertyRecord {
        year_built: Some(FieldValue::Integer(i64::MAX)),
        ..commercial()
    };
    assert_eq!(
        value(&far_future, ValuationApproach::Market, &tables()),
        Err(ValuationError::OutOfRange {
            quantity: "comparable year",
            year_built: i64::MAX,
        })
    );
    assert!(cost(&far_future).building_age < 0);
}

proptest! {
    #[test]
    fn depreciation_is_monotonic_and_capped(age in 0i64..200, class_index in 0usize..6) {
        let class = Some(PropertyClass::ALL[class_index]);
        let current = depreciation_rate(class, age);
        let next = depreciation_rate(class, age + 1);

        prop_assert!(next + 1e-12 >= current);
        prop_assert!(next <= 0.7);
    }

    #[test]
    fn confidence_scores_stay_in_band(
        assessed in 1_000.0f64..5_000_000.0,
        year_built in 1900i64..2025,
        area in 500.0f64..20_000.0,
    ) {
        let record = PropertyRecord {
            assessed_value: Some(FieldValue::Decimal(assessed)),
            year_built: Some(FieldValue::Integer(year_built)),
            building_area: Some(FieldValue::Decimal(area)),
            ..commercial()
        };

        for approach in ValuationApproach::ALL {
            let result = value(&record, approach, &tables()).expect("valuation");
            let score = result.confidence_score();
            prop_assert!((0.6..=0.95).contains(&score), "{approach}: {score}");
        }
    }
}
