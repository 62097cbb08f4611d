use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bigdecimal::BigDecimal;
use common_crypto::Signer;
use common_money::parse_amount;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::form;
use crate::gateway::GatewayKind;

/// Header carrying the gateway's signature on webhook calls.
pub const SIGNATURE_HEADER: &str = "Sign";
/// `payment_status` value for a completed payment.
pub const SUCCESS_STATUS: &str = "success";

/// Plain-text reply the gateway expects for a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAck {
    pub body: String,
    pub status: u16,
}

impl NotificationAck {
    pub fn ok() -> Self {
        Self { body: "OK".into(), status: 200 }
    }

    /// `OK <token>`, used by gateway variants that confirm with a digest.
    pub fn ok_with_token(token: &str) -> Self {
        Self { body: format!("OK {token}"), status: 200 }
    }

    pub fn rejected() -> Self {
        Self { body: "NOT OK".into(), status: 400 }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

impl IntoResponse for NotificationAck {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_REQUEST);
        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], self.body).into_response()
    }
}

/// A parsed webhook payload. Accessors never fail: missing keys read as empty strings and a
/// missing or unparsable amount reads as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    raw: Map<String, Value>,
}

impl Notification {
    pub fn parse(payload: Value) -> Self {
        match payload {
            Value::Object(raw) => Self { raw },
            _ => Self { raw: Map::new() },
        }
    }

    pub fn from_form(body: &str) -> Result<Self, GatewayError> {
        form::decode(body).map(Self::parse)
    }

    pub fn from_json(body: &[u8]) -> Result<Self, GatewayError> {
        serde_json::from_slice::<Value>(body)
            .map(Self::parse)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    fn text(&self, key: &str) -> String {
        scalar_text(self.raw.get(key))
    }

    /// Merchant order id (`order_num`).
    pub fn order_id(&self) -> String { self.text("order_num") }
    pub fn payment_id(&self) -> String { self.text("payment_id") }
    pub fn status(&self) -> String { self.text("payment_status") }
    /// Gateway-side numeric order id (`order_id`).
    pub fn transaction_id(&self) -> String { self.text("order_id") }
    pub fn pan(&self) -> String { self.text("card_number") }
    pub fn card_expiry(&self) -> String { self.text("card_expiry") }
    pub fn card_holder(&self) -> String { self.text("card_holder") }
    pub fn issuer(&self) -> String { self.text("bank_id") }
    pub fn email(&self) -> String { self.text("customer_email") }
    pub fn date_time(&self) -> String { self.text("date") }

    pub fn amount(&self) -> BigDecimal {
        parse_amount(&self.text("sum")).unwrap_or_default()
    }

    pub fn provider(&self) -> GatewayKind {
        GatewayKind::Prodamus
    }

    pub fn currency(&self) -> &'static str {
        "RUB"
    }

    pub fn is_success(&self) -> bool {
        self.status() == SUCCESS_STATUS
    }

    /// `OK`/200 only for a valid notification reporting success.
    pub fn ack(&self, is_valid: bool) -> NotificationAck {
        if is_valid && self.is_success() {
            NotificationAck::ok()
        } else {
            NotificationAck::rejected()
        }
    }
}

pub(crate) fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "1".to_string(),
        _ => String::new(),
    }
}

/// Verifies and parses webhook payloads for one merchant secret.
#[derive(Debug, Clone)]
pub struct NotificationParser {
    signer: Signer,
}

impl NotificationParser {
    pub fn new(secret: &str) -> Result<Self, GatewayError> {
        Ok(Self { signer: Signer::new(secret)? })
    }

    pub fn validate(&self, payload: &Value, header_signature: &str) -> bool {
        self.signer.verify(payload, header_signature)
    }

    pub fn parse(&self, payload: Value) -> Notification {
        Notification::parse(payload)
    }
}

/// Check `header_signature` against `payload` signed with `secret`.
pub fn validate(payload: &Value, header_signature: &str, secret: &str) -> bool {
    common_crypto::verify(payload, secret, header_signature)
}
