use axum::{extract::State, Json};
use common_http_errors::{ApiError, ApiResult};
use serde::Serialize;

use crate::error::GatewayError;
use crate::gateway::GatewayKind;
use crate::legacy::LegacyInvoiceRequest;
use crate::request::PaymentRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PaymentLinkResponse {
    pub url: String,
    pub provider: GatewayKind,
}

pub async fn create_payment_link(
    State(state): State<AppState>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<Json<PaymentLinkResponse>> {
    let url = state.driver.build_link(&req)?;
    state.metrics.links_built.inc();
    Ok(Json(PaymentLinkResponse { url, provider: state.driver.kind() }))
}

pub async fn create_legacy_invoice(
    State(state): State<AppState>,
    Json(req): Json<LegacyInvoiceRequest>,
) -> ApiResult<Json<PaymentLinkResponse>> {
    let Some(client) = state.legacy.as_ref() else {
        return Err(ApiError::bad_request("legacy_disabled", None));
    };
    match client.create_invoice(&req).await {
        Ok(url) => {
            state.metrics.links_built.inc();
            Ok(Json(PaymentLinkResponse { url, provider: GatewayKind::ProdamusLegacy }))
        }
        Err(err) => {
            if matches!(err, GatewayError::Upstream(_)) {
                state.metrics.upstream_failures.inc();
            }
            Err(err.into())
        }
    }
}
