use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::{AssessmentService, AssessmentServiceError};
use crate::assessment::{PropertyRecord, ValuationApproach};
use crate::repository::{PropertyStore, RepositoryError};

/// Router exposing record intake, lookup, and valuation.
pub fn property_router<S>(service: Arc<AssessmentService<S>>) -> Router
where
    S: PropertyStore + 'static,
{
    Router::new()
        .route("/api/properties", post(submit_handler::<S>))
        .route("/api/properties/:parcel_id", get(record_handler::<S>))
        .route(
            "/api/properties/:parcel_id/valuation/:approach",
            get(valuation_handler::<S>),
        )
        .with_state(service)
}

fn error_response(error: AssessmentServiceError) -> Response {
    let status = match &error {
        AssessmentServiceError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        AssessmentServiceError::Repository(RepositoryError::MissingParcelId) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AssessmentServiceError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentServiceError::Repository(RepositoryError::Unavailable(_))
        | AssessmentServiceError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Json(record): Json<PropertyRecord>,
) -> Response
where
    S: PropertyStore + 'static,
{
    match service.submit(record) {
        Ok(submission) if submission.stored => {
            (StatusCode::CREATED, Json(submission)).into_response()
        }
        Ok(submission) => (StatusCode::UNPROCESSABLE_ENTITY, Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path(parcel_id): Path<String>,
) -> Response
where
    S: PropertyStore + 'static,
{
    match service.get(&parcel_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn valuation_handler<S>(
    State(service): State<Arc<AssessmentService<S>>>,
    Path((parcel_id, approach)): Path<(String, String)>,
) -> Response
where
    S: PropertyStore + 'static,
{
    let approach = match approach.parse::<ValuationApproach>() {
        Ok(approach) => approach,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match service.value(&parcel_id, approach) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}
