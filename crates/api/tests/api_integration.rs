//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use participant::ParticipantConfig;
use reservation_store::InMemoryReservationStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup_with_config(config: ParticipantConfig) -> axum::Router {
    let state = api::create_default_state(InMemoryReservationStore::new(), &config);
    api::create_app(state, get_metrics_handle())
}

fn setup() -> axum::Router {
    setup_with_config(ParticipantConfig {
        rng_seed: Some(7),
        ..ParticipantConfig::default()
    })
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn post_command(app: &axum::Router, command: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/commands")
            .header("content-type", "application/json")
            .body(Body::from(command.to_string()))
            .unwrap(),
    )
    .await
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

fn reserve_flight(correlation_id: &str) -> Value {
    json!({
        "command": "reserve-flight",
        "correlationId": correlation_id,
        "clientId": "client-42",
        "origin": "MAD",
        "destination": "BCN",
        "departureDate": "2026-11-02"
    })
}

fn process_payment(correlation_id: &str, amount: &str) -> Value {
    json!({
        "command": "process-payment",
        "correlationId": correlation_id,
        "clientId": "client-42",
        "amount": amount
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_reserve_flight() {
    let app = setup();

    let (status, json) = post_command(&app, reserve_flight("api-trip-1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "flight-reserved");
    assert_eq!(json["correlationId"], "api-trip-1");
    assert_eq!(json["resourceReserved"], true);
    assert_eq!(json["state"], "RESERVED");

    let flight_number = json["details"]["flightNumber"].as_str().unwrap();
    assert_eq!(flight_number.len(), 6);
    assert!(flight_number[2..].chars().all(|c| c.is_ascii_digit()));
    assert!(
        json["confirmationNumber"]
            .as_str()
            .unwrap()
            .starts_with("FL-")
    );
}

#[tokio::test]
async fn test_repeated_reserve_returns_same_reply() {
    let app = setup();

    let (_, first) = post_command(&app, reserve_flight("api-trip-2")).await;
    let (status, second) = post_command(&app, reserve_flight("api-trip-2")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["reservationId"], second["reservationId"]);
    assert_eq!(first["confirmationNumber"], second["confirmationNumber"]);
    assert_eq!(first["details"], second["details"]);
}

#[tokio::test]
async fn test_invalid_request_is_bad_request() {
    let app = setup();

    let (status, json) = post_command(
        &app,
        json!({
            "command": "reserve-flight",
            "correlationId": "api-trip-3",
            "clientId": "client-42",
            "origin": "MAD",
            "destination": "MAD"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = setup();

    // Missing correlation id
    let (status, json) = post_command(&app, json!({ "command": "cancel-flight" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let (status, _) = post_command(&app, json!({ "command": "book-train" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_amount_rules() {
    let app = setup();

    let (status, json) = post_command(&app, process_payment("api-pay-1", "0")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_AMOUNT");

    let (status, json) = post_command(&app, process_payment("api-pay-2", "10000.01")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "AMOUNT_EXCEEDS_LIMIT");
    assert_eq!(json["retryable"], false);

    let (status, json) = post_command(&app, process_payment("api-pay-3", "10000.00")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "payment-processed");
    assert_eq!(json["paymentProcessed"], true);
    assert_eq!(json["amount"], "10000.00");
}

#[tokio::test]
async fn test_confirm_without_payment_is_not_found() {
    let app = setup();

    let (status, json) = post_command(
        &app,
        json!({ "command": "confirm-reservation", "correlationId": "api-none" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_compensation_replies() {
    let app = setup();

    let (status, json) = post_command(
        &app,
        json!({ "command": "cancel-hotel", "correlationId": "api-trip-4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "compensation");
    assert_eq!(json["kind"], "hotel");
    assert_eq!(json["status"], "NOTHING_TO_COMPENSATE");

    post_command(&app, reserve_flight("api-trip-4")).await;
    let cancel = json!({ "command": "cancel-flight", "correlationId": "api-trip-4" });

    let (_, first) = post_command(&app, cancel.clone()).await;
    let (_, second) = post_command(&app, cancel).await;
    assert_eq!(first["status"], "COMPENSATED");
    assert_eq!(second["status"], "ALREADY_COMPENSATED");
}

#[tokio::test]
async fn test_injected_fault_is_retryable() {
    let app = setup_with_config(ParticipantConfig {
        fault_rate: 1.0,
        rng_seed: Some(1),
        ..ParticipantConfig::default()
    });

    let (status, json) = post_command(&app, reserve_flight("api-trip-5")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "RESOURCE_UNAVAILABLE");
    assert_eq!(json["retryable"], true);

    let (status, _) = get_json(&app, "/reservations/flight/api-trip-5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_reservation() {
    let app = setup();
    post_command(&app, reserve_flight("api-trip-6")).await;

    let (status, json) = get_json(&app, "/reservations/flight/api-trip-6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["state"], "RESERVED");
    assert_eq!(json["correlationId"], "api-trip-6");
    assert!(json["details"]["flightNumber"].is_string());
    assert!(json.get("correlation_id").is_none());

    let (status, json) = get_json(&app, "/reservations/car/api-trip-6").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");

    let (status, _) = get_json(&app, "/reservations/train/api-trip-6").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_trip_over_http() {
    let app = setup();
    let trip = "api-trip-7";

    post_command(&app, reserve_flight(trip)).await;
    let (status, _) = post_command(
        &app,
        json!({
            "command": "reserve-hotel",
            "correlationId": trip,
            "clientId": "client-42",
            "city": "Barcelona",
            "checkIn": "2026-11-02",
            "checkOut": "2026-11-06"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_command(&app, process_payment(trip, "845.50")).await;
    assert_eq!(status, StatusCode::OK);

    let confirm = json!({ "command": "confirm-reservation", "correlationId": trip });
    let (status, first) = post_command(&app, confirm.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["reply"], "reservation-confirmed");

    let (_, second) = post_command(&app, confirm).await;
    assert_eq!(first["confirmationNumber"], second["confirmationNumber"]);

    let (status, payment) = get_json(&app, &format!("/reservations/payment/{trip}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payment["state"], "CONFIRMED");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    post_command(&app, reserve_flight("api-trip-8")).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("participant_commands_total"));
}
