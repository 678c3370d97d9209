mod common;

use std::sync::Arc;

use assessor_ai::mcp::{mcp_router, payload, Message, MessageType};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{commercial, control, residential};

fn message(message_type: &str, body: Value) -> Message {
    Message::new(message_type, payload(body))
}

#[test]
fn every_message_type_has_a_handler() {
    let control = control();

    for message_type in MessageType::ALL {
        assert!(control.handles(message_type), "{message_type} is unrouted");
    }

    let status = control.status();
    assert_eq!(status.mcp_status, "active");
    assert_eq!(status.message_types.len(), 5);
    let agents: Vec<&str> = status.agents.keys().map(String::as_str).collect();
    assert_eq!(
        agents,
        ["data_validation", "property_impact", "user_interaction", "valuation"]
    );
}

#[test]
fn unknown_message_types_fail_with_their_name() {
    let response = control().route(&message("frobnicate", json!({})));

    assert!(!response.success);
    assert!(response.data.is_empty());
    assert_eq!(
        response.error.as_deref(),
        Some("No handler for message type: frobnicate")
    );
}

#[test]
fn validation_and_batch_validation() {
    let control = control();

    let single = control.route(&message(
        "property_validation",
        json!({ "property_data": residential() }),
    ));
    assert!(single.success);
    assert_eq!(single.data["validation_results"]["has_errors"], json!(false));

    let mut broken = residential();
    broken.parcel_id = Some("12-34".to_string());
    let batch = control.route(&message(
        "batch_validate",
        json!({ "properties": [residential(), broken] }),
    ));
    assert!(!batch.success);
    assert_eq!(
        batch.data["summary"],
        json!({"total": 2, "valid": 1, "invalid": 1})
    );
    assert_eq!(batch.data["batch_results"].as_array().map(Vec::len), Some(2));
}

#[test]
fn valuation_defaults_to_market_and_rejects_bad_approaches() {
    let control = control();

    let market = control.route(&message(
        "property_valuation",
        json!({ "property_data": residential() }),
    ));
    assert!(market.success);
    assert_eq!(market.data["approach"], json!("market"));
    assert_eq!(
        market.data["valuation_results"]["methodology"],
        json!("market_comparison")
    );

    let cost = control.route(&message(
        "property_valuation",
        json!({ "property_data": residential(), "valuation_approach": "cost" }),
    ));
    assert_eq!(cost.data["valuation_results"]["cost_value"], json!(490575.0));

    let income = control.route(&message(
        "property_valuation",
        json!({ "property_data": residential(), "valuation_approach": "income" }),
    ));
    assert!(income.success);
    assert_eq!(income.data["valuation_results"]["income_value"], json!(null));

    let bogus = control.route(&message(
        "property_valuation",
        json!({ "property_data": commercial(), "valuation_approach": "sales" }),
    ));
    assert_eq!(
        bogus.error.as_deref(),
        Some("Invalid valuation approach. Must be one of: market, cost, income")
    );
}

#[test]
fn impact_and_user_queries() {
    let control = control();

    let bill = control.route(&message("property_impact", json!({ "bill_id": "SB 5678" })));
    assert!(bill.success);
    assert_eq!(
        bill.data["impact_analysis"]["summary"],
        json!("Analysis of SB 5678: Commercial Property Assessment Standards")
    );

    let estimate = control.route(&message(
        "user_query",
        json!({
            "query": "Estimate the value of this home",
            "context": { "parcel_id": "00512345-001", "valuation_approach": "cost" },
        }),
    ));
    assert!(estimate.success);
    assert_eq!(estimate.data["intent"], json!("valuation_request"));
    assert_eq!(
        estimate.data["response"],
        json!("Estimated value using the cost approach: $490,575.00 (confidence 0.83).")
    );

    let chat = control.route(&message(
        "user_query",
        json!({ "query": "Why did assessments rise this year?" }),
    ));
    assert!(chat.success);
    assert_eq!(chat.data["intent"], json!("general_inquiry"));
    assert_eq!(chat.data["confidence"], json!(0.5));
}

#[test]
fn public_endpoints_map_to_message_types() {
    let control = control();

    let response = control.process_api_request(
        "/api/mcp/property-value",
        payload(json!({ "property_data": commercial(), "valuation_approach": "income" })),
    );
    assert!(response.success);
    assert_eq!(response.data["approach"], json!("income"));

    let unknown = control.process_api_request("/api/mcp/forecast", payload(json!({})));
    assert_eq!(
        unknown.error.as_deref(),
        Some("Unknown endpoint: /api/mcp/forecast")
    );
}

async fn call(request: Request<Body>) -> (StatusCode, Value) {
    let response = mcp_router(Arc::new(control()))
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn http_surface_routes_envelopes() {
    let (status, body) = call(
        Request::builder()
            .uri("/api/mcp/status")
            .body(Body::empty())
            .expect("request builds"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], json!(true));

    let (status, body) = call(post(
        "/api/mcp/property-validate",
        json!({ "property_data": residential() }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = call(post(
        "/api/mcp/message",
        json!({ "type": "user_query", "sender": "staff", "payload": { "query": "help" } }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["intent"], json!("help_request"));

    let (status, body) = call(post("/api/mcp/forecast", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}
