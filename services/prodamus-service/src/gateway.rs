use serde::Serialize;
use serde_json::Value;

use crate::config::MerchantCredentials;
use crate::error::GatewayError;
use crate::notification::{Notification, NotificationAck, NotificationParser};
use crate::request::{PaymentRequest, PaymentRequestBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatewayKind {
    Prodamus,
    ProdamusLegacy,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Prodamus => "prodamus",
            GatewayKind::ProdamusLegacy => "prodamus-legacy",
        }
    }
}

impl std::fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a host needs from a payment gateway driver.
pub trait PayService: Send + Sync {
    fn kind(&self) -> GatewayKind;

    fn build_link(&self, request: &PaymentRequest) -> Result<String, GatewayError>;

    fn validate(&self, payload: &Value, signature: &str) -> bool;

    fn parse(&self, payload: Value) -> Notification;

    fn is_success(&self, notification: &Notification) -> bool {
        notification.is_success()
    }

    fn acknowledge(&self, notification: &Notification, is_valid: bool) -> NotificationAck {
        notification.ack(is_valid)
    }
}

/// Signed-link driver. One instance per credential set.
#[derive(Debug, Clone)]
pub struct ProdamusDriver {
    builder: PaymentRequestBuilder,
    parser: NotificationParser,
}

impl ProdamusDriver {
    pub fn new(credentials: MerchantCredentials) -> Result<Self, GatewayError> {
        credentials.validate()?;
        let parser = NotificationParser::new(credentials.secret())?;
        let builder = PaymentRequestBuilder::new(credentials)?;
        Ok(Self { builder, parser })
    }

    pub fn credentials(&self) -> &MerchantCredentials {
        self.builder.credentials()
    }
}

impl PayService for ProdamusDriver {
    fn kind(&self) -> GatewayKind {
        GatewayKind::Prodamus
    }

    fn build_link(&self, request: &PaymentRequest) -> Result<String, GatewayError> {
        self.builder.build_link(request)
    }

    fn validate(&self, payload: &Value, signature: &str) -> bool {
        self.parser.validate(payload, signature)
    }

    fn parse(&self, payload: Value) -> Notification {
        self.parser.parse(payload)
    }
}
