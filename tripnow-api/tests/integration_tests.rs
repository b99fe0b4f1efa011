//! Integration tests for TripNow API endpoints

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use tripnow_api::{create_router, AppState};
use tripnow_core::{PollerConfig, RiskConfig};
use tripnow_risk::{MockRiskOracle, ResilientRiskClient};
use tripnow_store::MemoryReservationStore;
use tripnow_worker::RiskPoller;

fn create_test_server() -> TestServer {
    let state = AppState::new(Arc::new(MemoryReservationStore::new()));
    TestServer::new(create_router(state)).unwrap()
}

fn valid_request(key: &str) -> Value {
    json!({
        "customerEmail": "a@x.com",
        "tripCountry": "US",
        "amount": 500,
        "idempotencyKey": key,
    })
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["circuit"].is_null());
}

#[tokio::test]
async fn test_health_reports_circuit_state() {
    let client = Arc::new(ResilientRiskClient::new(
        Arc::new(MockRiskOracle::approving(1.0)),
        &RiskConfig::default(),
    ));
    let state = AppState::new(Arc::new(MemoryReservationStore::new())).with_risk_client(client);
    let server = TestServer::new(create_router(state)).unwrap();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["circuit"], "closed");
}

// ============ Reservation Endpoint Tests ============

#[tokio::test]
async fn test_create_reservation() {
    let server = create_test_server();

    let response = server
        .post("/api/reservations/create")
        .json(&valid_request("key-1"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["id"], 1);
    assert_eq!(body["status"], "PENDING_RISK_CHECK");
    assert!(body["riskScore"].is_null());
    assert_eq!(body["tripCountry"], "US");
    assert_eq!(body["idempotencyKey"], "key-1");
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[tokio::test]
async fn test_create_reservation_invalid() {
    let server = create_test_server();

    for body in [
        json!({ "customerEmail": "", "tripCountry": "US", "amount": 500, "idempotencyKey": "k" }),
        json!({ "customerEmail": "a@x.com", "tripCountry": "US", "amount": 0, "idempotencyKey": "k" }),
        json!({ "customerEmail": "a@x.com", "tripCountry": "US", "amount": 500, "idempotencyKey": " " }),
        json!({ "customerEmail": "a@x.com", "amount": 500, "idempotencyKey": "k" }),
    ] {
        let response = server.post("/api/reservations/create").json(&body).await;

        response.assert_status_bad_request();
        let error: Value = response.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_create_reservation_unreadable_body() {
    let server = create_test_server();

    let wrong_type = server
        .post("/api/reservations/create")
        .json(&json!({
            "customerEmail": "a@x.com",
            "tripCountry": "US",
            "amount": 99.5,
            "idempotencyKey": "k",
        }))
        .await;
    wrong_type.assert_status_bad_request();
    let error: Value = wrong_type.json();
    assert_eq!(error["code"], "BAD_REQUEST");
    assert!(error["error"].is_string());

    let not_json = server
        .post("/api/reservations/create")
        .text("{not json")
        .content_type("application/json")
        .await;
    not_json.assert_status_bad_request();
    let error: Value = not_json.json();
    assert_eq!(error["code"], "BAD_REQUEST");

    server.get("/api/reservations/1").await.assert_status_not_found();
}

#[tokio::test]
async fn test_get_reservation() {
    let server = create_test_server();
    server
        .post("/api/reservations/create")
        .json(&valid_request("key-1"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/api/reservations/1").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["customerEmail"], "a@x.com");
    assert_eq!(body["amount"], 500);
}

#[tokio::test]
async fn test_get_reservation_not_found() {
    let server = create_test_server();

    server.get("/api/reservations/42").await.assert_status_not_found();
}

#[tokio::test]
async fn test_get_reservation_invalid_id() {
    let server = create_test_server();

    server.get("/api/reservations/0").await.assert_status_bad_request();
    server.get("/api/reservations/abc").await.assert_status_bad_request();
}

#[tokio::test]
async fn test_get_by_idempotency_key() {
    let server = create_test_server();
    for key in ["shared", "shared", "other"] {
        server
            .post("/api/reservations/create")
            .json(&valid_request(key))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let response = server.get("/api/reservations/by-idempotency-key/shared").await;

    response.assert_status_ok();
    let body: Vec<Value> = response.json();
    assert_eq!(body.len(), 2);
    assert!(body.iter().all(|r| r["idempotencyKey"] == "shared"));

    server
        .get("/api/reservations/by-idempotency-key/missing")
        .await
        .assert_status_not_found();
}

// ============ End-to-end Tests ============

#[tokio::test]
async fn test_poll_cycle_resolves_created_reservation() {
    let store = Arc::new(MemoryReservationStore::new());
    let client = Arc::new(ResilientRiskClient::new(
        Arc::new(MockRiskOracle::approving(12.5)),
        &RiskConfig::default(),
    ));
    let poller = RiskPoller::new(store.clone(), client.clone(), PollerConfig::default());
    let state = AppState::new(store)
        .with_risk_client(client)
        .with_poller_metrics(poller.metrics());
    let server = TestServer::new(create_router(state)).unwrap();

    server
        .post("/api/reservations/create")
        .json(&valid_request("key-1"))
        .await
        .assert_status(StatusCode::CREATED);

    poller.run_cycle().await.unwrap();

    let body: Value = server.get("/api/reservations/1").await.json();
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["riskScore"], 12.5);
    assert_ne!(body["createdAt"], body["updatedAt"]);

    let metrics = server.get("/metrics").await;
    metrics.assert_status_ok();
    let text = metrics.text();
    assert!(text.contains("tripnow_risk_calls_total 1\n"));
    assert!(text.contains("# TYPE tripnow_poller_cycles_total counter"));
}
