use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{respond, AgentError};
use crate::assessment::{PropertyClass, ValuationApproach};
use crate::mcp::{Agent, HandlerRegistration, Message, MessageHandler, MessageType, Response};

const NAME: &str = "property_impact";

/// Legislative data provider (LegiScan, OpenStates, state legislature feeds).
pub trait BillSource: Send + Sync {
    fn fetch_bill(&self, bill_id: &str) -> Result<Option<BillDocument>, BillSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BillSourceError {
    #[error("legislative source unavailable: {0}")]
    Unavailable(String),
    #[error("malformed bill data: {0}")]
    Malformed(String),
}

/// Bill details merged from the configured legislative sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDocument {
    pub bill_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactNote {
    pub impact: ImpactLevel,
    pub description: &'static str,
}

const fn note(impact: ImpactLevel, description: &'static str) -> ImpactNote {
    ImpactNote {
        impact,
        description,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImplementationPlan {
    pub complexity: ImpactLevel,
    pub timeline: &'static str,
    pub resource_requirements: &'static str,
}

/// Estimated effect of a bill on assessment practice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillImpact {
    pub bill_id: String,
    pub summary: String,
    pub valuation_impact: BTreeMap<ValuationApproach, ImpactNote>,
    pub tax_impact: ImpactNote,
    pub property_class_impact: BTreeMap<PropertyClass, ImpactNote>,
    pub implementation: ImplementationPlan,
}

/// Recently tracked bill and the property class it mainly affects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegislativeBill {
    pub bill_id: &'static str,
    pub title: &'static str,
    pub status: &'static str,
    pub effective_date: Option<&'static str>,
    pub impact_level: ImpactLevel,
    #[serde(skip)]
    pub affects: PropertyClass,
    #[serde(skip)]
    pub effect: &'static str,
}

const TRACKED_BILLS: [LegislativeBill; 3] = [
    LegislativeBill {
        bill_id: "HB 1234",
        title: "Residential Property Tax Relief Act",
        status: "Passed",
        effective_date: Some("2026-01-01"),
        impact_level: ImpactLevel::Medium,
        affects: PropertyClass::Residential,
        effect: "Potential reduction in assessed values for primary residences",
    },
    LegislativeBill {
        bill_id: "SB 5678",
        title: "Commercial Property Assessment Standards",
        status: "In Committee",
        effective_date: None,
        impact_level: ImpactLevel::Medium,
        affects: PropertyClass::Commercial,
        effect: "Updated capitalization rates for income approach",
    },
    LegislativeBill {
        bill_id: "HB 9012",
        title: "Agricultural Land Preservation Act",
        status: "Passed",
        effective_date: Some("2025-07-01"),
        impact_level: ImpactLevel::High,
        affects: PropertyClass::Agricultural,
        effect: "New criteria for agricultural use classification",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassLegislation {
    pub bill_id: &'static str,
    pub title: &'static str,
    pub impact: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassImpact {
    pub property_class: PropertyClass,
    pub recent_legislation: Vec<ClassLegislation>,
    pub impact_summary: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegislativeOverview {
    pub session: String,
    pub recent_bills: Vec<LegislativeBill>,
    pub trends: Vec<&'static str>,
    pub outlook: &'static str,
}

fn class_summary(class: PropertyClass) -> Option<&'static str> {
    match class {
        PropertyClass::Residential => Some(
            "Recent legislation aims to provide property tax relief for homeowners, potentially reducing assessed values.",
        ),
        PropertyClass::Commercial => Some(
            "Recent legislation updates assessment standards for commercial properties, focusing on income approach methods.",
        ),
        PropertyClass::Agricultural => Some(
            "Recent legislation modifies criteria for agricultural use classification, potentially affecting qualification for current use programs.",
        ),
        _ => None,
    }
}

/// Analyzes how legislative changes affect valuation practice and property classes.
pub struct ImpactAgent<B> {
    bills: Arc<B>,
    session_year: i64,
}

impl<B> ImpactAgent<B>
where
    B: BillSource + 'static,
{
    pub fn new(bills: Arc<B>, session_year: i64) -> Self {
        Self {
            bills,
            session_year,
        }
    }

    fn analyze(&self, message: &Message) -> Result<Response, AgentError> {
        let analysis_type = message.get_str("analysis_type").unwrap_or("bill");
        debug!(analysis_type, "impact analysis requested");

        match analysis_type {
            "bill" => {
                let bill_id = message
                    .get_str("bill_id")
                    .filter(|id| !id.is_empty())
                    .ok_or(AgentError::MissingBillId)?;
                let bill = match self.bills.fetch_bill(bill_id) {
                    Ok(Some(bill)) => bill,
                    Ok(None) => return Err(AgentError::BillUnavailable(bill_id.to_string())),
                    Err(error) => {
                        warn!(bill_id, error = %error, "bill source failed");
                        return Err(AgentError::BillUnavailable(bill_id.to_string()));
                    }
                };
                Ok(Response::ok(json!({
                    "impact_analysis": bill_impact(&bill),
                    "bill_data": bill,
                })))
            }
            "property_class" => {
                let raw = message
                    .get_str("property_class")
                    .filter(|class| !class.is_empty())
                    .ok_or(AgentError::MissingPropertyClass)?;
                let impact = raw
                    .parse::<PropertyClass>()
                    .ok()
                    .and_then(class_impact)
                    .ok_or_else(|| AgentError::NoClassImpact(raw.to_string()))?;
                Ok(Response::ok(json!({ "class_impact": impact })))
            }
            "overview" => Ok(Response::ok(json!({
                "legislative_overview": self.overview(),
            }))),
            other => Err(AgentError::UnknownAnalysisType(other.to_string())),
        }
    }

    pub fn overview(&self) -> LegislativeOverview {
        LegislativeOverview {
            session: format!("{} Regular Session", self.session_year),
            recent_bills: TRACKED_BILLS.to_vec(),
            trends: vec![
                "Focus on property tax relief for residential properties",
                "Standardization of commercial property assessment methodologies",
                "Enhanced current use programs for agricultural land",
            ],
            outlook: "The legislative trend is moving toward more standardized assessment methodologies while providing targeted relief for specific property types.",
        }
    }
}

pub fn bill_impact(bill: &BillDocument) -> BillImpact {
    BillImpact {
        bill_id: bill.bill_id.clone(),
        summary: format!("Analysis of {}: {}", bill.bill_id, bill.title),
        valuation_impact: BTreeMap::from([
            (
                ValuationApproach::Market,
                note(ImpactLevel::Low, "Minimal changes to market valuation methods"),
            ),
            (
                ValuationApproach::Cost,
                note(ImpactLevel::Low, "No significant changes to cost approach"),
            ),
            (
                ValuationApproach::Income,
                note(
                    ImpactLevel::Medium,
                    "Potential changes to income capitalization rates",
                ),
            ),
        ]),
        tax_impact: note(
            ImpactLevel::Medium,
            "Potential adjustments to assessment ratios",
        ),
        property_class_impact: BTreeMap::from([
            (
                PropertyClass::Residential,
                note(ImpactLevel::Low, "Minimal impact on residential properties"),
            ),
            (
                PropertyClass::Commercial,
                note(ImpactLevel::Medium, "Moderate impact on commercial properties"),
            ),
            (
                PropertyClass::Agricultural,
                note(ImpactLevel::High, "Significant impact on agricultural properties"),
            ),
        ]),
        implementation: ImplementationPlan {
            complexity: ImpactLevel::Medium,
            timeline: "6-12 months",
            resource_requirements: "Moderate updates to assessment systems",
        },
    }
}

pub fn class_impact(class: PropertyClass) -> Option<ClassImpact> {
    let impact_summary = class_summary(class)?;
    let recent_legislation = TRACKED_BILLS
        .iter()
        .filter(|bill| bill.affects == class)
        .map(|bill| ClassLegislation {
            bill_id: bill.bill_id,
            title: bill.title,
            impact: bill.effect,
        })
        .collect();

    Some(ClassImpact {
        property_class: class,
        recent_legislation,
        impact_summary,
    })
}

impl<B> MessageHandler for ImpactAgent<B>
where
    B: BillSource + 'static,
{
    fn handle(&self, message: &Message) -> Response {
        respond(NAME, self.analyze(message))
    }
}

impl<B> Agent for ImpactAgent<B>
where
    B: BillSource + 'static,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn registrations(self: Arc<Self>) -> Vec<HandlerRegistration> {
        vec![HandlerRegistration::single(MessageType::PropertyImpact, self)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::payload;

    struct StaticBills;

    impl BillSource for StaticBills {
        fn fetch_bill(&self, bill_id: &str) -> Result<Option<BillDocument>, BillSourceError> {
            match bill_id {
                "HB 1234" => Ok(Some(BillDocument {
                    bill_id: bill_id.to_string(),
                    title: "Residential Property Tax Relief Act".to_string(),
                    description: String::new(),
                    status: Some("Passed".to_string()),
                    sources: vec!["legiscan".to_string()],
                })),
                "SB 0000" => Err(BillSourceError::Unavailable("timeout".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn agent() -> ImpactAgent<StaticBills> {
        ImpactAgent::new(Arc::new(StaticBills), 2025)
    }

    fn analyze(body: serde_json::Value) -> Response {
        agent().handle(&Message::new("property_impact", payload(body)))
    }

    #[test]
    fn bill_analysis_defaults_and_summarizes() {
        let response = analyze(json!({"bill_id": "HB 1234"}));

        assert!(response.success);
        let analysis = &response.data["impact_analysis"];
        assert_eq!(
            analysis["summary"],
            json!("Analysis of HB 1234: Residential Property Tax Relief Act")
        );
        assert_eq!(analysis["valuation_impact"]["income"]["impact"], json!("medium"));
        assert_eq!(
            analysis["property_class_impact"]["Agricultural"]["impact"],
            json!("high")
        );
        assert_eq!(response.data["bill_data"]["bill_id"], json!("HB 1234"));
    }

    #[test]
    fn bill_lookup_failures() {
        assert_eq!(
            analyze(json!({"analysis_type": "bill"})).error.as_deref(),
            Some("No bill ID provided for analysis")
        );
        assert_eq!(
            analyze(json!({"bill_id": "SB 0000"})).error.as_deref(),
            Some("Unable to retrieve data for bill SB 0000")
        );
        assert_eq!(
            analyze(json!({"bill_id": "HB 4321"})).error.as_deref(),
            Some("Unable to retrieve data for bill HB 4321")
        );
    }

    #[test]
    fn class_analysis_lists_matching_bills() {
        let response = analyze(json!({
            "analysis_type": "property_class",
            "property_class": "Commercial",
        }));

        assert!(response.success);
        let impact = &response.data["class_impact"];
        assert_eq!(impact["recent_legislation"][0]["bill_id"], json!("SB 5678"));

        let missing = analyze(json!({"analysis_type": "property_class"}));
        assert_eq!(
            missing.error.as_deref(),
            Some("No property class provided for analysis")
        );

        let public = analyze(json!({
            "analysis_type": "property_class",
            "property_class": "Public",
        }));
        assert_eq!(
            public.error.as_deref(),
            Some("No impact analysis available for property class: Public")
        );
    }

    #[test]
    fn overview_uses_session_year() {
        let response = analyze(json!({"analysis_type": "overview"}));

        let overview = &response.data["legislative_overview"];
        assert_eq!(overview["session"], json!("2025 Regular Session"));
        assert_eq!(overview["recent_bills"].as_array().map(Vec::len), Some(3));
        assert_eq!(overview["recent_bills"][1]["effective_date"], json!(null));
        assert!(overview["recent_bills"][0].get("affects").is_none());
    }

    #[test]
    fn unknown_analysis_type_is_rejected() {
        assert_eq!(
            analyze(json!({"analysis_type": "forecast"})).error.as_deref(),
            Some("Unknown analysis type: forecast")
        );
    }
}
