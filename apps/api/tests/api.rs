//! End-to-end tests driving the router against an in-memory database.
//!
//! No sockets: requests go through `tower::ServiceExt::oneshot`, the same
//! way axum dispatches them in production.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use optika_api::{build_router, AppState};
use optika_db::{Database, DbConfig};

const STORE: &str = "store-recife-01";
const EMPLOYEE: &str = "emp-ana";

async fn app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build_router(AppState::new(db))
}

/// Sends a request with the gateway principal headers attached.
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-store-id", STORE)
        .header("x-employee-id", EMPLOYEE);

    let request = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(json.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or("")
}

async fn open_session(app: &Router, initial_amount_cents: i64) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/cashier/open",
        Some(json!({ "initial_amount": initial_amount_cents })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "open failed: {body}");
    body
}

async fn create_order(app: &Router, total_cents: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/orders",
        Some(json!({
            "client_id": "client-7",
            "items": [{
                "product_id": "frame-ray-201",
                "description": "Acetate frame",
                "quantity": 1,
                "unit_price": total_cents,
            }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create order failed: {body}");
    body["order"]["id"].as_str().unwrap().to_string()
}

// -----------------------------------------------------------------------------
// Scenarios
// -----------------------------------------------------------------------------

#[tokio::test]
async fn happy_path_open_sell_deliver_close() {
    let app = app().await;

    // Open the till with R$100.00.
    let session = open_session(&app, 10_000).await;
    assert_eq!(session["status"], "open");
    assert_eq!(session["initial_amount_cents"], 10_000);

    // Sell a R$150.00 order, paid in full in cash at the deposit step.
    let order_id = create_order(&app, 15_000).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({
            "status": "in_progress",
            "paymentMethod": "cash",
            "totalPaid": 15_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["amount_paid_cents"], 15_000);

    // Goods handed over: complete without further payment.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({
            "status": "completed",
            "productDelivered": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["product_delivered"], true);

    // Live session mirror shows the cash channel.
    let (status, body) = send(&app, "GET", "/cashier/open-session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["cash_sales_cents"], 15_000);
    assert_eq!(body["session"]["total_sales_cents"], 15_000);

    // Close counting exactly float + sales: balanced drawer.
    let (status, body) = send(
        &app,
        "POST",
        "/cashier/close",
        Some(json!({
            "cash_amount": 25_000,
            "card_amount": 0,
            "pix_amount": 0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "closed");
    assert_eq!(body["counted_amount_cents"], 25_000);
    assert_eq!(body["difference_cents"], 0);
}

#[tokio::test]
async fn pending_order_cannot_skip_to_completed() {
    let app = app().await;
    open_session(&app, 0).await;
    let order_id = create_order(&app, 15_000).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({
            "status": "completed",
            "productDelivered": true,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_STATUS_TRANSITION");

    // The rejection left nothing behind.
    let (_, body) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["amount_paid_cents"], 0);

    let (_, body) = send(&app, "GET", "/cashier/open-session", None).await;
    assert_eq!(body["session"]["total_sales_cents"], 0);
}

#[tokio::test]
async fn in_progress_order_cannot_be_cancelled() {
    let app = app().await;
    open_session(&app, 0).await;
    let order_id = create_order(&app, 20_000).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({
            "status": "in_progress",
            "paymentMethod": "pix",
            "totalPaid": 20_000,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({
            "status": "cancelled",
            "cancellationReason": "client changed their mind",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_STATUS_TRANSITION");

    let (_, body) = send(&app, "GET", &format!("/orders/{order_id}"), None).await;
    assert_eq!(body["order"]["status"], "in_progress");
}

#[tokio::test]
async fn second_open_is_a_conflict() {
    let app = app().await;
    open_session(&app, 5_000).await;

    let (status, body) = send(
        &app,
        "POST",
        "/cashier/open",
        Some(json!({ "initial_amount": 5_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "SESSION_ALREADY_OPEN");
}

#[tokio::test]
async fn order_needs_an_open_session() {
    let app = app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "client_id": "client-7",
            "items": [{
                "product_id": "lens-std",
                "description": "Single-vision lens",
                "quantity": 2,
                "unit_price": 7_500,
            }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NO_OPEN_SESSION");
}

#[tokio::test]
async fn finalize_unknown_order_is_not_found() {
    let app = app().await;
    open_session(&app, 0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders/no-such-order/finalize",
        Some(json!({
            "status": "cancelled",
            "cancellationReason": "ghost order",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "ORDER_NOT_FOUND");
}

#[tokio::test]
async fn cancellation_requires_a_reason() {
    let app = app().await;
    open_session(&app, 0).await;
    let order_id = create_order(&app, 9_900).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/finalize"),
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_principal_headers_are_rejected() {
    let app = app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/cashier/open-session")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn close_after_close_is_not_found() {
    let app = app().await;
    open_session(&app, 1_000).await;

    let close_body = json!({ "cash_amount": 1_000, "card_amount": 0, "pix_amount": 0 });
    let (status, _) = send(&app, "POST", "/cashier/close", Some(close_body.clone())).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "POST", "/cashier/close", Some(close_body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NO_OPEN_SESSION");
}

#[tokio::test]
async fn validation_errors_name_the_wire_fields() {
    let app = app().await;

    // The cashier surface speaks snake_case; so must its rejections.
    let (status, body) = send(
        &app,
        "POST",
        "/cashier/open",
        Some(json!({ "initial_amount": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(
        message.contains("initial_amount"),
        "expected the wire field name, got: {message}"
    );

    open_session(&app, 0).await;
    let (status, body) = send(
        &app,
        "POST",
        "/cashier/close",
        Some(json!({ "cash_amount": -1, "card_amount": 0, "pix_amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("cash_amount"));
}

#[tokio::test]
async fn absurd_unit_price_is_rejected() {
    let app = app().await;
    open_session(&app, 0).await;

    // Far beyond the per-amount cap; must come back as a validation
    // rejection, never reach the line-total arithmetic.
    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(json!({
            "client_id": "client-7",
            "items": [{
                "product_id": "frame-ray-201",
                "description": "Acetate frame",
                "quantity": 999,
                "unit_price": i64::MAX / 2,
            }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
