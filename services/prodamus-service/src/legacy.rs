//! Token + invoice-preview protocol with MD5 notification keys.
//!
//! This is a different protocol version from the signed-link driver, not a fallback for it:
//! field names, validation and acknowledgement all differ. Deployments pick one.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::http::header::AUTHORIZATION;
use bigdecimal::BigDecimal;
use common_crypto::{basic_auth, constant_time_eq, md5_hex};
use common_money::{ensure_non_negative, format_amount, parse_amount};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::LegacyConfig;
use crate::error::GatewayError;
use crate::gateway::GatewayKind;
use crate::notification::{scalar_text, NotificationAck};
use crate::receipt::{Receipt, ReceiptItem};

const TOKEN_PATH: &str = "/info/settings/token/";
const INVOICE_PATH: &str = "/change/invoice/preview/";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyInvoiceRequest {
    pub order_id: String,
    pub amount: BigDecimal,
    pub client_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
}

impl LegacyInvoiceRequest {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.order_id.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("order id is empty".into()));
        }
        ensure_non_negative(&self.amount)
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Deserialize)]
struct InvoiceResponse {
    invoice_id: Option<Value>,
    invoice_url: Option<String>,
}

pub struct LegacyInvoiceClient {
    config: LegacyConfig,
    http: reqwest::Client,
}

impl LegacyInvoiceClient {
    pub fn new(config: LegacyConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Configuration(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &LegacyConfig {
        &self.config
    }

    /// Fetch a session token, then create an invoice and return its payment URL.
    pub async fn create_invoice(&self, request: &LegacyInvoiceRequest) -> Result<String, GatewayError> {
        request.validate()?;
        let token = self.fetch_token().await?;

        let receipt = Receipt::new(
            request.phone.clone(),
            Some(request.email.clone()),
            request.items.clone(),
        );
        let mut params = BTreeMap::new();
        params.insert("clientid", request.client_id.clone());
        params.insert("client_email", request.email.clone());
        params.insert("orderid", request.order_id.clone());
        params.insert("pay_amount", format_amount(&request.amount));
        params.insert("client_phone", receipt.phone.clone().unwrap_or_default());
        params.insert("cart", receipt.to_json());
        params.insert("token", token);

        let resp = self
            .http
            .post(self.url(INVOICE_PATH))
            .header(AUTHORIZATION, self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| upstream("invoice request failed", e))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            warn!(status, order_id = %request.order_id, "legacy invoice request rejected");
            return Err(GatewayError::Upstream(format!("unexpected status {status} while creating invoice")));
        }
        let invoice = resp
            .json::<InvoiceResponse>()
            .await
            .map_err(|e| upstream("invoice response unreadable", e))?;
        match (invoice.invoice_id, invoice.invoice_url) {
            (Some(id), Some(url)) if !id.is_null() => {
                debug!(order_id = %request.order_id, "legacy invoice created");
                Ok(url)
            }
            _ => Err(GatewayError::Upstream("invoice response without invoice_id".into())),
        }
    }

    async fn fetch_token(&self) -> Result<String, GatewayError> {
        let resp = self
            .http
            .get(self.url(TOKEN_PATH))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| upstream("token request failed", e))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            warn!(status, "legacy token request rejected");
            return Err(GatewayError::Upstream(format!("unexpected status {status} while fetching token")));
        }
        let body = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| upstream("token response unreadable", e))?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::Upstream("token response without token".into()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        basic_auth(&self.config.login, self.config.password())
    }
}

fn upstream(context: &str, err: reqwest::Error) -> GatewayError {
    warn!(error = %err, "{context}");
    GatewayError::Upstream(format!("{context}: {err}"))
}

/// Notification in the legacy field layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyNotification {
    raw: Map<String, Value>,
}

impl LegacyNotification {
    pub fn parse(payload: Value) -> Self {
        match payload {
            Value::Object(raw) => Self { raw },
            _ => Self { raw: Map::new() },
        }
    }

    fn text(&self, key: &str) -> String {
        scalar_text(self.raw.get(key))
    }

    pub fn param(&self, name: &str) -> Option<&Value> { self.raw.get(name) }
    pub fn order_id(&self) -> String { self.text("orderid") }
    pub fn payment_id(&self) -> String { self.text("paymentid") }
    pub fn transaction_id(&self) -> String { self.text("RRN") }
    pub fn pan(&self) -> String { self.text("card_number") }
    pub fn card_expiry(&self) -> String { self.text("card_expiry") }
    pub fn card_holder(&self) -> String { self.text("card_holder") }
    pub fn issuer(&self) -> String { self.text("bank_id") }
    pub fn email(&self) -> String { self.text("client_email") }
    pub fn date_time(&self) -> String { self.text("obtain_datetime") }

    pub fn amount(&self) -> BigDecimal {
        parse_amount(&self.text("sum")).unwrap_or_default()
    }

    pub fn provider(&self) -> GatewayKind {
        GatewayKind::ProdamusLegacy
    }

    /// `md5(id + sum + clientid + orderid + secret) == key`.
    pub fn validate(&self, secret: &str) -> bool {
        let key = self.text("key");
        if key.is_empty() || secret.is_empty() {
            return false;
        }
        let expected = md5_hex(&[
            self.text("id").as_str(),
            self.text("sum").as_str(),
            self.text("clientid").as_str(),
            self.text("orderid").as_str(),
            secret,
        ]);
        constant_time_eq(&expected, &key.to_ascii_lowercase())
    }

    /// The protocol reports only completed payments, so validity is the only input.
    pub fn ack(&self, secret: &str, is_valid: bool) -> NotificationAck {
        if is_valid {
            NotificationAck::ok_with_token(&md5_hex(&[self.text("id").as_str(), secret]))
        } else {
            NotificationAck::rejected()
        }
    }
}

/// Check a legacy payload's `key` field.
pub fn legacy_validate(payload: &Value, secret: &str) -> bool {
    LegacyNotification::parse(payload.clone()).validate(secret)
}
