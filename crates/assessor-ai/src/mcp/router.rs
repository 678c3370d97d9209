use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};

use super::envelope::{Message, MessageType};
use super::registry::MasterControl;

/// HTTP surface for the master control program.
pub fn mcp_router(control: Arc<MasterControl>) -> Router {
    Router::new()
        .route("/api/mcp/status", get(status_handler))
        .route("/api/mcp/message", post(message_handler))
        .route("/api/mcp/:operation", post(operation_handler))
        .with_state(control)
}

pub(crate) async fn status_handler(State(control): State<Arc<MasterControl>>) -> Response {
    (StatusCode::OK, Json(control.status())).into_response()
}

pub(crate) async fn message_handler(
    State(control): State<Arc<MasterControl>>,
    Json(message): Json<Message>,
) -> Response {
    let response = control.route(&message);
    (StatusCode::OK, Json(response)).into_response()
}

pub(crate) async fn operation_handler(
    State(control): State<Arc<MasterControl>>,
    Path(operation): Path<String>,
    Json(payload): Json<Map<String, Value>>,
) -> Response {
    let endpoint = format!("/api/mcp/{operation}");
    let status = if MessageType::from_endpoint(&endpoint).is_some() {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };

    let response = control.process_api_request(&endpoint, payload);
    (status, Json(response)).into_response()
}
