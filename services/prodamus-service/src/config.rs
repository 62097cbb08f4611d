use anyhow::{Context, Result};
use std::env;
use zeroize::Zeroizing;

use crate::error::GatewayError;

/// Merchant credentials for the signed-link protocol. Immutable once built; rotate by
/// constructing a new driver.
#[derive(Clone)]
pub struct MerchantCredentials {
    pub domain: String,
    pub sys: String,
    secret: Zeroizing<String>,
    pub notification_url: String,
}

impl MerchantCredentials {
    pub fn new(
        domain: impl Into<String>,
        sys: impl Into<String>,
        secret: impl Into<String>,
        notification_url: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            sys: sys.into(),
            secret: Zeroizing::new(secret.into()),
            notification_url: notification_url.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let domain = env::var("PRODAMUS_DOMAIN").context("PRODAMUS_DOMAIN must be set")?;
        let sys = env::var("PRODAMUS_SYS").context("PRODAMUS_SYS must be set")?;
        let secret = env::var("PRODAMUS_SECRET").context("PRODAMUS_SECRET must be set")?;
        let notification_url = env::var("PRODAMUS_NOTIFICATION_URL").unwrap_or_default();
        Ok(Self::new(domain.trim(), sys.trim(), secret, notification_url.trim()))
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    /// Domain and secret are mandatory; the merchant code may legitimately be empty in
    /// sandbox setups.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.domain.trim().is_empty() {
            return Err(GatewayError::Configuration("domain is not configured".into()));
        }
        if self.secret.is_empty() {
            return Err(GatewayError::Configuration("secret is not configured".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("domain", &self.domain)
            .field("sys", &self.sys)
            .field("secret", &"***redacted***")
            .field("notification_url", &self.notification_url)
            .finish()
    }
}

/// Settings for the token + invoice-preview protocol.
#[derive(Clone)]
pub struct LegacyConfig {
    pub api_url: String,
    pub login: String,
    password: Zeroizing<String>,
    secret: Zeroizing<String>,
    pub timeout_secs: u64,
}

impl LegacyConfig {
    pub fn new(
        api_url: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            login: login.into(),
            password: Zeroizing::new(password.into()),
            secret: Zeroizing::new(secret.into()),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }

    /// `None` when the legacy flow is not configured at all.
    pub fn from_env() -> Result<Option<Self>> {
        let Ok(api_url) = env::var("PRODAMUS_LEGACY_API_URL") else {
            return Ok(None);
        };
        let login = env::var("PRODAMUS_LEGACY_LOGIN").context("PRODAMUS_LEGACY_LOGIN must be set")?;
        let password = env::var("PRODAMUS_LEGACY_PASSWORD").unwrap_or_default();
        let secret =
            env::var("PRODAMUS_LEGACY_SECRET").context("PRODAMUS_LEGACY_SECRET must be set")?;
        let timeout_secs = env::var("PRODAMUS_LEGACY_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(10);
        Ok(Some(
            Self::new(api_url.trim(), login.trim(), password, secret).with_timeout_secs(timeout_secs),
        ))
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.api_url.trim().is_empty() {
            return Err(GatewayError::Configuration("legacy api url is not configured".into()));
        }
        if self.login.is_empty() {
            return Err(GatewayError::Configuration("legacy login is not configured".into()));
        }
        if self.secret.is_empty() {
            return Err(GatewayError::Configuration("legacy secret is not configured".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for LegacyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyConfig")
            .field("api_url", &self.api_url)
            .field("login", &self.login)
            .field("password", &"***redacted***")
            .field("secret", &"***redacted***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
