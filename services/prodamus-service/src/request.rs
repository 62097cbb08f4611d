use bigdecimal::BigDecimal;
use common_crypto::{Signer, SIGNATURE_KEY};
use common_money::ensure_non_negative;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::MerchantCredentials;
use crate::error::GatewayError;
use crate::form;
use crate::receipt::{ReceiptItem, ReceiptSerializer};

/// Value of the `do` parameter asking the gateway for a payment page.
pub const ACTION_LINK: &str = "link";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: String,
    pub amount: BigDecimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub success_url: String,
    #[serde(default)]
    pub fail_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

fn default_currency() -> String {
    "RUB".to_string()
}

impl PaymentRequest {
    pub fn new(order_id: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
            currency: default_currency(),
            success_url: String::new(),
            fail_url: String::new(),
            description: String::new(),
            customer: Customer::default(),
            items: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.order_id.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("order id is empty".into()));
        }
        ensure_non_negative(&self.amount)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        Ok(())
    }
}

/// Builds signed payment links for one set of merchant credentials.
#[derive(Debug, Clone)]
pub struct PaymentRequestBuilder {
    credentials: MerchantCredentials,
    signer: Signer,
}

impl PaymentRequestBuilder {
    pub fn new(credentials: MerchantCredentials) -> Result<Self, GatewayError> {
        credentials.validate()?;
        let signer = Signer::new(credentials.secret())?;
        Ok(Self { credentials, signer })
    }

    pub fn credentials(&self) -> &MerchantCredentials {
        &self.credentials
    }

    /// The full parameter set with `signature` computed over everything else.
    pub fn params(&self, request: &PaymentRequest) -> Result<Map<String, Value>, GatewayError> {
        request.validate()?;
        let mut params = self.unsigned_params(request);
        let signature = self.signer.sign(&Value::Object(params.clone()))?;
        params.insert(SIGNATURE_KEY.to_string(), Value::String(signature));
        Ok(params)
    }

    pub fn build_link(&self, request: &PaymentRequest) -> Result<String, GatewayError> {
        let params = self.params(request)?;
        let query = form::encode(&params)?;
        let domain = self.credentials.domain.trim();
        let separator = if domain.ends_with('?') || domain.ends_with('&') {
            ""
        } else if domain.contains('?') {
            "&"
        } else {
            "?"
        };
        debug!(order_id = %request.order_id, products = request.items.len(), "built prodamus payment link");
        Ok(format!("{domain}{separator}{query}"))
    }

    fn unsigned_params(&self, request: &PaymentRequest) -> Map<String, Value> {
        let text = |s: &str| Value::String(s.to_string());
        let mut params = Map::new();
        params.insert("order_id".into(), text(&request.order_id));
        params.insert(
            "customer_phone".into(),
            text(request.customer.phone.as_deref().unwrap_or_default()),
        );
        params.insert(
            "customer_email".into(),
            text(request.customer.email.as_deref().unwrap_or_default()),
        );
        // An empty list has no form encoding, so it must not be signed either.
        if !request.items.is_empty() {
            params.insert("products".into(), request.items.to_products());
        }
        params.insert("customer_extra".into(), text(&request.description));
        params.insert("do".into(), text(ACTION_LINK));
        params.insert("urlReturn".into(), text(&request.fail_url));
        params.insert("urlSuccess".into(), text(&request.success_url));
        params.insert("sys".into(), text(&self.credentials.sys));
        params.insert("urlNotification".into(), text(&self.credentials.notification_url));
        params
    }
}

/// One-shot link building for callers that do not keep a builder around.
pub fn build_link(
    request: &PaymentRequest,
    credentials: &MerchantCredentials,
) -> Result<String, GatewayError> {
    PaymentRequestBuilder::new(credentials.clone())?.build_link(request)
}
