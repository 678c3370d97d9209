use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::{property_data, respond, AgentError};
use crate::assessment::{valuation, PricingTables, ValuationApproach};
use crate::mcp::{Agent, HandlerRegistration, Message, MessageHandler, MessageType, Response};

const NAME: &str = "valuation";

/// Wraps the market, cost, and income calculators.
#[derive(Debug, Clone)]
pub struct ValuationAgent {
    tables: Arc<PricingTables>,
}

impl ValuationAgent {
    pub fn new(tables: Arc<PricingTables>) -> Self {
        Self { tables }
    }

    fn approach(message: &Message) -> Result<ValuationApproach, AgentError> {
        match message.get("valuation_approach") {
            None => Ok(ValuationApproach::Market),
            Some(Value::String(raw)) => raw.parse().map_err(|_| AgentError::InvalidApproach),
            Some(_) => Err(AgentError::InvalidApproach),
        }
    }

    fn value(&self, message: &Message) -> Result<Response, AgentError> {
        let record = property_data(message, AgentError::MissingValuationData)?;
        let approach = Self::approach(message)?;
        let result = valuation::value(&record, approach, &self.tables)?;

        debug!(
            parcel_id = record.parcel_id.as_deref().unwrap_or("-"),
            %approach,
            estimate = ?result.estimated_value(),
            "valued property"
        );

        Ok(Response::ok(json!({
            "valuation_results": result,
            "approach": approach,
        })))
    }
}

impl MessageHandler for ValuationAgent {
    fn handle(&self, message: &Message) -> Response {
        respond(NAME, self.value(message))
    }
}

impl Agent for ValuationAgent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn registrations(self: Arc<Self>) -> Vec<HandlerRegistration> {
        vec![HandlerRegistration::single(MessageType::PropertyValuation, self)]
    }
}
