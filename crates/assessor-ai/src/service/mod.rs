//! Facade that validates and stores property records and values them on request.

mod router;

pub use router::property_router;

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::assessment::{PropertyRecord, ValidationResult, ValuationApproach, ValuationResult};
use crate::mcp::{payload, MasterControl, Message, MessageType, Response};
use crate::repository::{PropertyStore, RepositoryError};

/// Outcome of submitting a record: the validation report and whether it was stored.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Submission {
    pub parcel_id: Option<String>,
    pub stored: bool,
    pub validation_results: ValidationResult,
}

/// Service composing the master control program with the record store.
pub struct AssessmentService<S> {
    control: Arc<MasterControl>,
    store: Arc<S>,
}

impl<S> AssessmentService<S>
where
    S: PropertyStore + 'static,
{
    pub fn new(control: Arc<MasterControl>, store: Arc<S>) -> Self {
        Self { control, store }
    }

    fn dispatch(&self, message_type: MessageType, body: serde_json::Value) -> Response {
        let message = Message::new(message_type.as_str(), payload(body)).from_sender("service");
        self.control.route(&message)
    }

    /// Validate through the router and store the record only when it has no errors.
    pub fn submit(&self, record: PropertyRecord) -> Result<Submission, AssessmentServiceError> {
        let response = self.dispatch(
            MessageType::PropertyValidation,
            json!({ "property_data": record }),
        );
        let validation_results: ValidationResult = match response.decode("validation_results") {
            Some(decoded) => decoded?,
            None => return Err(AssessmentServiceError::Rejected(failure_text(response))),
        };

        let stored = !validation_results.has_errors;
        let parcel_id = record.parcel_id.clone();
        if stored {
            self.store.put(record)?;
            info!(parcel_id = parcel_id.as_deref().unwrap_or("-"), "property stored");
        }

        Ok(Submission {
            parcel_id,
            stored,
            validation_results,
        })
    }

    pub fn get(&self, parcel_id: &str) -> Result<PropertyRecord, AssessmentServiceError> {
        let record = self
            .store
            .get(parcel_id)?
            .ok_or_else(|| RepositoryError::NotFound(parcel_id.to_string()))?;
        Ok(record)
    }

    /// Value a stored record through the router.
    pub fn value(
        &self,
        parcel_id: &str,
        approach: ValuationApproach,
    ) -> Result<ValuationResult, AssessmentServiceError> {
        let record = self.get(parcel_id)?;
        let response = self.dispatch(
            MessageType::PropertyValuation,
            json!({
                "property_data": record,
                "valuation_approach": approach,
            }),
        );
        if !response.success {
            return Err(AssessmentServiceError::Rejected(failure_text(response)));
        }

        match response.decode("valuation_results") {
            Some(decoded) => Ok(decoded?),
            None => Err(AssessmentServiceError::Rejected(failure_text(response))),
        }
    }
}

fn failure_text(response: Response) -> String {
    response
        .error
        .unwrap_or_else(|| "handler returned no result".to_string())
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected handler response: {0}")]
    Decode(#[from] serde_json::Error),
}
