use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use common_http_errors::ApiError;
use common_observability::GatewayMetrics;

pub mod config;
pub mod error;
pub mod form;
pub mod gateway;
pub mod legacy;
pub mod notification;
pub mod payment_handlers;
pub mod receipt;
pub mod request;
pub mod webhook;


pub use config::{LegacyConfig, MerchantCredentials};
pub use error::GatewayError;
pub use gateway::{GatewayKind, PayService, ProdamusDriver};
pub use legacy::{LegacyInvoiceClient, LegacyInvoiceRequest, LegacyNotification};
pub use notification::{Notification, NotificationAck, NotificationParser};
pub use receipt::{Receipt, ReceiptItem, ReceiptSerializer};
pub use request::{Customer, PaymentRequest, PaymentRequestBuilder};

#[derive(Clone)]
pub struct AppState {
    pub driver: Arc<dyn PayService>,
    pub legacy: Option<Arc<LegacyInvoiceClient>>,
    pub metrics: GatewayMetrics,
}

impl AppState {
    pub fn new(driver: Arc<dyn PayService>, metrics: GatewayMetrics) -> Self {
        Self { driver, legacy: None, metrics }
    }

    pub fn with_legacy(mut self, client: LegacyInvoiceClient) -> Self {
        self.legacy = Some(Arc::new(client));
        self
    }
}

async fn render_metrics(State(state): State<AppState>) -> Result<String, ApiError> {
    state.metrics.render().map_err(|e| ApiError::internal(e, None))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/metrics", get(render_metrics))
        .route("/webhooks/prodamus", post(webhook::handle_notification))
        .route("/webhooks/prodamus-legacy", post(webhook::handle_legacy_notification))
        .route("/payments/link", post(payment_handlers::create_payment_link))
        .route("/payments/legacy-invoice", post(payment_handlers::create_legacy_invoice))
        .with_state(state)
}
