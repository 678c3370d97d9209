use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::{respond, AgentError};
use crate::assessment::validation::format_currency;
use crate::assessment::{
    validate, valuation, PricingTables, PropertyRecord, ValidationRules, ValuationApproach,
};
use crate::mcp::{Agent, HandlerRegistration, Message, MessageHandler, MessageType, Response};
use crate::repository::PropertyStore;

const NAME: &str = "user_interaction";

pub const SYSTEM_PROMPT: &str = "You are an assistant for a county assessor's office. Answer \
questions about property assessment, valuation methods, and assessment procedures concisely. \
If a question needs a specific property record, ask for its parcel ID.";

const HELP_TEXT: &str = "I can look up a property by parcel ID, validate a property record, \
estimate a value with the market, cost, or income approach, and answer general questions \
about assessment. Include a parcel ID or property data in the request context.";

const APOLOGY: &str =
    "I'm sorry, I'm unable to answer that right now. Please try again later.";

/// Natural-language text generation collaborator.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str, system_prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("text generation is not configured")]
    NotConfigured,
    #[error("text generation failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PropertySearch,
    ValuationRequest,
    DataValidation,
    HelpRequest,
    GeneralInquiry,
}

/// Keyword table searched in order; the first intent with a matching keyword wins.
const INTENT_KEYWORDS: [(Intent, &[&str]); 4] = [
    (Intent::HelpRequest, &["help", "how do i", "how to", "what can you"]),
    (Intent::DataValidation, &["validate", "validation", "verify", "check"]),
    (
        Intent::ValuationRequest,
        &["valuation", "value", "worth", "appraise", "estimate"],
    ),
    (Intent::PropertySearch, &["find", "search", "look up", "lookup", "parcel"]),
];

/// Classify a free-text query, returning the intent and a confidence in `[0.5, 0.9]`.
pub fn detect_intent(query: &str) -> (Intent, f64) {
    let query = query.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS {
        let hits = keywords
            .iter()
            .filter(|keyword| query.contains(*keyword))
            .count();
        match hits {
            0 => continue,
            1 => return (intent, 0.75),
            _ => return (intent, 0.9),
        }
    }
    (Intent::GeneralInquiry, 0.5)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionReply {
    pub response: String,
    pub intent: Intent,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl InteractionReply {
    fn text(intent: Intent, confidence: f64, response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            intent,
            confidence,
            details: None,
        }
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Answers staff questions, delegating to the engines when the context names a property.
pub struct InteractionAgent<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    rules: Arc<ValidationRules>,
    tables: Arc<PricingTables>,
}

impl<S, G> InteractionAgent<S, G>
where
    S: PropertyStore + 'static,
    G: TextGenerator + 'static,
{
    pub fn new(
        store: Arc<S>,
        generator: Arc<G>,
        rules: Arc<ValidationRules>,
        tables: Arc<PricingTables>,
    ) -> Self {
        Self {
            store,
            generator,
            rules,
            tables,
        }
    }

    fn answer(&self, message: &Message) -> Result<Response, AgentError> {
        let query = message
            .get_str("query")
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .ok_or(AgentError::MissingQuery)?;
        let empty = Map::new();
        let context = message
            .get("context")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        let (intent, confidence) = detect_intent(query);
        debug!(?intent, confidence, "classified user query");

        let reply = match intent {
            Intent::PropertySearch => self.search(context, confidence)?,
            Intent::ValuationRequest => self.estimate(context, confidence)?,
            Intent::DataValidation => self.check(context, confidence)?,
            Intent::HelpRequest => InteractionReply::text(intent, confidence, HELP_TEXT),
            Intent::GeneralInquiry => self.converse(query, confidence),
        };

        Ok(Response::ok(json!(reply)))
    }

    fn parcel_id(context: &Map<String, Value>) -> Option<&str> {
        context
            .get("parcel_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    fn resolve(
        &self,
        context: &Map<String, Value>,
    ) -> Result<Option<PropertyRecord>, AgentError> {
        let inline = context
            .get("property_data")
            .filter(|data| !super::is_empty(data));
        if let Some(data) = inline {
            let record =
                serde_json::from_value(data.clone()).map_err(AgentError::MalformedRecord)?;
            return Ok(Some(record));
        }
        match Self::parcel_id(context) {
            Some(parcel_id) => Ok(self.store.get(parcel_id)?),
            None => Ok(None),
        }
    }

    fn search(
        &self,
        context: &Map<String, Value>,
        confidence: f64,
    ) -> Result<InteractionReply, AgentError> {
        let intent = Intent::PropertySearch;
        let Some(parcel_id) = Self::parcel_id(context) else {
            return Ok(InteractionReply::text(
                intent,
                confidence,
                "Please provide a parcel ID to search for a property.",
            ));
        };

        Ok(match self.store.get(parcel_id)? {
            Some(record) => {
                let address = record.property_address.as_deref().unwrap_or("unknown address");
                let city = record.property_city.as_deref().unwrap_or("unknown city");
                InteractionReply::text(
                    intent,
                    confidence,
                    format!("Found property {parcel_id} at {address}, {city}."),
                )
                .with_details(json!({ "property": record }))
            }
            None => InteractionReply::text(
                intent,
                confidence,
                format!("No property found with parcel ID {parcel_id}."),
            ),
        })
    }

    fn estimate(
        &self,
        context: &Map<String, Value>,
        confidence: f64,
    ) -> Result<InteractionReply, AgentError> {
        let intent = Intent::ValuationRequest;
        let Some(record) = self.resolve(context)? else {
            return Ok(InteractionReply::text(
                intent,
                confidence,
                "Please provide property data or a parcel ID so I can estimate a value.",
            ));
        };

        let approach = match context.get("valuation_approach").and_then(Value::as_str) {
            Some(raw) => raw
                .parse::<ValuationApproach>()
                .map_err(|_| AgentError::InvalidApproach)?,
            None => ValuationApproach::Market,
        };
        let result = valuation::value(&record, approach, &self.tables)?;

        let response = match result.estimated_value() {
            Some(estimate) => format!(
                "Estimated value using the {approach} approach: {} (confidence {:.2}).",
                format_currency(estimate),
                result.confidence_score()
            ),
            None => format!(
                "The {approach} approach does not apply to this property: only Commercial and \
                 Industrial properties can be valued by income."
            ),
        };

        Ok(InteractionReply::text(intent, confidence, response).with_details(json!({
            "valuation_results": result,
            "approach": approach,
        })))
    }

    fn check(
        &self,
        context: &Map<String, Value>,
        confidence: f64,
    ) -> Result<InteractionReply, AgentError> {
        let intent = Intent::DataValidation;
        let Some(record) = self.resolve(context)? else {
            return Ok(InteractionReply::text(
                intent,
                confidence,
                "Please provide property data or a parcel ID so I can validate it.",
            ));
        };

        let result = validate(&record, &self.rules);
        let response = if result.has_errors {
            format!(
                "Validation found {} error(s) and {} warning(s).",
                result.errors.len(),
                result.warnings.len()
            )
        } else if result.has_warnings {
            format!(
                "The record has no errors but {} warning(s) to review.",
                result.warnings.len()
            )
        } else {
            "The property record passed validation with no errors or warnings.".to_string()
        };

        Ok(InteractionReply::text(intent, confidence, response)
            .with_details(json!({ "validation_results": result })))
    }

    fn converse(&self, query: &str, confidence: f64) -> InteractionReply {
        let intent = Intent::GeneralInquiry;
        match self.generator.generate(query, SYSTEM_PROMPT) {
            Ok(text) => InteractionReply::text(intent, confidence, text),
            Err(error) => {
                warn!(error = %error, "text generation failed");
                InteractionReply::text(intent, confidence, APOLOGY)
            }
        }
    }
}

impl<S, G> MessageHandler for InteractionAgent<S, G>
where
    S: PropertyStore + 'static,
    G: TextGenerator + 'static,
{
    fn handle(&self, message: &Message) -> Response {
        respond(NAME, self.answer(message))
    }
}

impl<S, G> Agent for InteractionAgent<S, G>
where
    S: PropertyStore + 'static,
    G: TextGenerator + 'static,
{
    fn name(&self) -> &'static str {
        NAME
    }

    fn registrations(self: Arc<Self>) -> Vec<HandlerRegistration> {
        vec![HandlerRegistration::single(MessageType::UserQuery, self)]
    }
}
