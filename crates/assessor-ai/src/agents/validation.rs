use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use super::{property_data, respond, AgentError};
use crate::assessment::{validate, validate_batch, PropertyRecord, ValidationRules};
use crate::mcp::{
    Agent, BatchHandler, HandlerRegistration, Message, MessageHandler, MessageType, Response,
};

const NAME: &str = "data_validation";

/// Wraps the validation engine for single-record and batch requests.
#[derive(Debug, Clone)]
pub struct ValidationAgent {
    rules: Arc<ValidationRules>,
}

impl ValidationAgent {
    pub fn new(rules: Arc<ValidationRules>) -> Self {
        Self { rules }
    }

    fn validate_one(&self, message: &Message) -> Result<Response, AgentError> {
        let record = property_data(message, AgentError::MissingValidationData)?;
        let result = validate(&record, &self.rules);
        debug!(
            parcel_id = record.parcel_id.as_deref().unwrap_or("-"),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated property"
        );

        let error = result
            .has_errors
            .then(|| "Validation errors found".to_string());
        Ok(Response::new(
            !result.has_errors,
            json!({ "validation_results": result }),
            error,
        ))
    }

    fn validate_many(&self, message: &Message) -> Result<Response, AgentError> {
        let raw = match message.get("properties") {
            Some(Value::Array(items)) => items.clone(),
            Some(_) => {
                return Err(AgentError::MalformedRecord(serde::de::Error::custom(
                    "properties must be a list",
                )))
            }
            None => return Err(AgentError::MissingBatch),
        };

        let records = raw
            .iter()
            .map(|value| serde_json::from_value::<PropertyRecord>(value.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(AgentError::MalformedRecord)?;

        let batch = validate_batch(&records, &self.rules);
        let batch_results: Vec<Value> = raw
            .into_iter()
            .zip(&batch.results)
            .map(|(property_data, validation_results)| {
                json!({
                    "property_data": property_data,
                    "validation_results": validation_results,
                })
            })
            .collect();

        let all_valid = batch.all_valid();
        Ok(Response::new(
            all_valid,
            json!({
                "batch_results": batch_results,
                "summary": {
                    "total": batch.total,
                    "valid": batch.valid_count,
                    "invalid": batch.invalid_count,
                },
            }),
            (!all_valid).then(|| "Some properties have validation errors".to_string()),
        ))
    }
}

impl MessageHandler for ValidationAgent {
    fn handle(&self, message: &Message) -> Response {
        respond(NAME, self.validate_one(message))
    }
}

impl BatchHandler for ValidationAgent {
    fn handle_batch(&self, message: &Message) -> Response {
        respond(NAME, self.validate_many(message))
    }
}

impl Agent for ValidationAgent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn registrations(self: Arc<Self>) -> Vec<HandlerRegistration> {
        vec![
            HandlerRegistration::single(MessageType::PropertyValidation, self.clone()),
            HandlerRegistration::batch(MessageType::BatchValidate, self),
        ]
    }
}
