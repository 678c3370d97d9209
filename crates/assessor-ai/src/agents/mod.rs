//! Agents registered with the master control program.

mod impact;
mod interaction;
mod validation;
mod valuation;

pub use impact::{
    BillDocument, BillImpact, BillSource, BillSourceError, ClassImpact, ClassLegislation,
    ImpactAgent, ImpactLevel, ImpactNote, ImplementationPlan, LegislativeBill,
    LegislativeOverview,
};
pub use interaction::{
    detect_intent, GenerationError, Intent, InteractionAgent, InteractionReply, TextGenerator,
    SYSTEM_PROMPT,
};
pub use validation::ValidationAgent;
pub use valuation::ValuationAgent;

use serde_json::Value;

use crate::assessment::{PropertyRecord, ValuationError};
use crate::mcp::{Message, Response};
use crate::repository::RepositoryError;

/// Input and collaborator failures an agent turns into failure envelopes.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("No property data provided for validation")]
    MissingValidationData,
    #[error("No properties provided for batch validation")]
    MissingBatch,
    #[error("No property data provided for valuation")]
    MissingValuationData,
    #[error("Invalid property data: {0}")]
    MalformedRecord(#[source] serde_json::Error),
    #[error("Invalid valuation approach. Must be one of: market, cost, income")]
    InvalidApproach,
    #[error("Error in property valuation: {0}")]
    Valuation(#[from] ValuationError),
    #[error("No bill ID provided for analysis")]
    MissingBillId,
    #[error("Unable to retrieve data for bill {0}")]
    BillUnavailable(String),
    #[error("No property class provided for analysis")]
    MissingPropertyClass,
    #[error("No impact analysis available for property class: {0}")]
    NoClassImpact(String),
    #[error("Unknown analysis type: {0}")]
    UnknownAnalysisType(String),
    #[error("No query provided")]
    MissingQuery,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<AgentError> for Response {
    fn from(error: AgentError) -> Self {
        Response::failure(error.to_string())
    }
}

/// Collapse a handler result into an envelope, logging failures at the agent boundary.
pub(crate) fn respond(agent: &'static str, result: Result<Response, AgentError>) -> Response {
    match result {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(agent, error = %error, "request rejected");
            error.into()
        }
    }
}

/// Empty strings, arrays, and objects count as missing, like an absent key.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

/// Decode `property_data` from the payload, reporting `missing` when it is absent or empty.
pub(crate) fn property_data(
    message: &Message,
    missing: AgentError,
) -> Result<PropertyRecord, AgentError> {
    match message.get("property_data") {
        Some(value) if !is_empty(value) => {
            serde_json::from_value(value.clone()).map_err(AgentError::MalformedRecord)
        }
        _ => Err(missing),
    }
}
