use axum::extract::State;
use axum::http::{header, HeaderMap};
use bytes::Bytes;
use common_observability::NotificationOutcome;
use serde_json::Value;
use tracing::{info, warn};

use crate::form;
use crate::legacy::LegacyNotification;
use crate::notification::{NotificationAck, SIGNATURE_HEADER};
use crate::AppState;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

/// Decode a webhook body. Form encoding is the default; JSON when the content type says so.
fn decode_body(headers: &HeaderMap, body: &Bytes) -> Option<Value> {
    if is_json(headers) {
        serde_json::from_slice::<Value>(body).ok()
    } else {
        form::decode(&String::from_utf8_lossy(body)).ok()
    }
}

/// Gateway callback for the signed-link protocol. Never errors: every failure becomes a
/// `NOT OK` acknowledgement.
pub async fn handle_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> NotificationAck {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let Some(payload) = decode_body(&headers, &body) else {
        warn!("malformed prodamus notification body");
        state.metrics.record_notification(NotificationOutcome::Rejected);
        return NotificationAck::rejected();
    };

    let valid = state.driver.validate(&payload, &signature);
    let notification = state.driver.parse(payload);
    if !valid {
        warn!(order_id = %notification.order_id(), "prodamus notification signature mismatch");
        state.metrics.record_notification(NotificationOutcome::Rejected);
    } else if !state.driver.is_success(&notification) {
        info!(order_id = %notification.order_id(), status = %notification.status(), "prodamus notification without success status");
        state.metrics.record_notification(NotificationOutcome::FailedStatus);
    } else {
        info!(
            order_id = %notification.order_id(),
            payment_id = %notification.payment_id(),
            amount = %notification.amount(),
            "prodamus payment confirmed"
        );
        state.metrics.record_notification(NotificationOutcome::Accepted);
    }
    state.driver.acknowledge(&notification, valid)
}

/// Gateway callback for the legacy invoice protocol; the signature travels in the `key` field.
pub async fn handle_legacy_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> NotificationAck {
    let Some(client) = state.legacy.as_ref() else {
        warn!("legacy notification received but legacy flow is not configured");
        return NotificationAck::rejected();
    };
    let Some(payload) = decode_body(&headers, &body) else {
        state.metrics.record_notification(NotificationOutcome::Rejected);
        return NotificationAck::rejected();
    };
    let notification = LegacyNotification::parse(payload);
    let secret = client.config().secret();
    let valid = notification.validate(secret);
    if valid {
        info!(order_id = %notification.order_id(), provider = %notification.provider(), "legacy payment confirmed");
        state.metrics.record_notification(NotificationOutcome::Accepted);
    } else {
        warn!(order_id = %notification.order_id(), "legacy notification key mismatch");
        state.metrics.record_notification(NotificationOutcome::Rejected);
    }
    notification.ack(secret, valid)
}
