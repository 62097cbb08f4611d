use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common_observability::GatewayMetrics;
use prodamus_service::{
    form, notification, router, AppState, MerchantCredentials, Notification, NotificationAck,
    PayService, PaymentRequestBuilder, PaymentRequest, ProdamusDriver, ReceiptItem,
};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "s3cr3t";

fn creds() -> MerchantCredentials {
    MerchantCredentials::new("https://pay.example/ui", "shop1", SECRET, "https://shop.example/hook")
}

fn webhook_body() -> &'static str {
    "order_num=A100&payment_id=777&payment_status=success&order_id=123456&sum=250.00\
&card_number=411111******1111&card_expiry=12%2F30&card_holder=IVAN+PETROV&bank_id=42\
&customer_email=x%40y.com&date=2026-10-18T10%3A00%3A00%2B03%3A00"
}

fn header_signature(body: &str) -> String {
    common_crypto::sign(&form::decode(body).unwrap(), SECRET).unwrap()
}

#[test]
fn valid_signature_is_accepted() {
    let payload = form::decode(webhook_body()).unwrap();
    let sig = header_signature(webhook_body());
    assert!(notification::validate(&payload, &sig, SECRET));
    let n = Notification::parse(payload);
    assert!(n.is_success());
    assert_eq!(n.ack(true), NotificationAck { body: "OK".into(), status: 200 });
    assert_eq!(n.card_holder(), "IVAN PETROV");
    assert_eq!(n.date_time(), "2026-10-18T10:00:00+03:00");
}

#[test]
fn tampered_sum_is_rejected() {
    let sig = header_signature(webhook_body());
    let tampered = webhook_body().replace("sum=250.00", "sum=2500.00");
    let payload = form::decode(&tampered).unwrap();
    assert!(!notification::validate(&payload, &sig, SECRET));
    let n = Notification::parse(payload);
    assert_eq!(n.ack(false), NotificationAck { body: "NOT OK".into(), status: 400 });
}

#[test]
fn parsing_is_idempotent() {
    let a = Notification::from_form(webhook_body()).unwrap();
    let b = Notification::from_form(webhook_body()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.order_id(), b.order_id());
    assert_eq!(a.amount(), b.amount());
    assert_eq!(a.pan(), b.pan());
}

#[test]
fn form_echo_of_outbound_params_verifies() {
    // The gateway echoes nested products back form-encoded; the signature must survive that.
    let builder = PaymentRequestBuilder::new(creds()).unwrap();
    let mut req = PaymentRequest::new("A100", BigDecimal::from(251));
    req.items = vec![
        ReceiptItem::new("Widget & Co", BigDecimal::from(250), 1),
        ReceiptItem::new("Bolt", BigDecimal::from(1), 1).with_sku("B-1"),
    ];
    let params = builder.params(&req).unwrap();
    let sig = params["signature"].as_str().unwrap().to_string();
    let echoed = form::decode(&form::encode(&params).unwrap()).unwrap();
    assert!(notification::validate(&echoed, &sig, SECRET));
}

fn app() -> axum::Router {
    let driver: Arc<dyn PayService> = Arc::new(ProdamusDriver::new(creds()).unwrap());
    router(AppState::new(driver, GatewayMetrics::new().unwrap()))
}

async fn post_webhook(app: axum::Router, body: String, sig: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("POST")
        .uri("/webhooks/prodamus")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("Sign", sig)
        .body(Body::from(body))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn webhook_endpoint_acknowledges_valid_call() {
    let sig = header_signature(webhook_body());
    let (status, body) = post_webhook(app(), webhook_body().to_string(), &sig).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn webhook_endpoint_rejects_tampered_call() {
    let sig = header_signature(webhook_body());
    let tampered = webhook_body().replace("sum=250.00", "sum=2500.00");
    let (status, body) = post_webhook(app(), tampered, &sig).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "NOT OK");
}

#[tokio::test]
async fn webhook_endpoint_rejects_missing_header() {
    let req = Request::builder()
        .method("POST")
        .uri("/webhooks/prodamus")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(webhook_body()))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn webhook_endpoint_rejects_failed_status_even_when_signed() {
    let body = webhook_body().replace("payment_status=success", "payment_status=order_denied");
    let sig = header_signature(&body);
    let (status, text) = post_webhook(app(), body, &sig).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "NOT OK");
}

#[tokio::test]
async fn webhook_endpoint_accepts_json_bodies() {
    let payload: Value = json!({"order_num": "A100", "payment_status": "success", "sum": "250.00"});
    let sig = common_crypto::sign(&payload, SECRET).unwrap();
    let req = Request::builder()
        .method("POST")
        .uri("/webhooks/prodamus")
        .header("content-type", "application/json")
        .header("Sign", sig)
        .body(Body::from(payload.to_string()))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn webhook_endpoint_survives_deeply_nested_keys() {
    let body = format!("order_num{}=A100", "[b]".repeat(300_000));
    let (status, text) = post_webhook(app(), body, "deadbeef").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(text, "NOT OK");
}

#[tokio::test]
async fn webhook_endpoint_survives_deeply_nested_json() {
    let body = format!("{}{}", "[".repeat(100_000), "]".repeat(100_000));
    let req = Request::builder()
        .method("POST")
        .uri("/webhooks/prodamus")
        .header("content-type", "application/json")
        .header("Sign", "deadbeef")
        .body(Body::from(body))
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
