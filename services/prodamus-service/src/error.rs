use common_crypto::CryptoError;
use common_http_errors::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// For callers that treat a bad signature as an error. The webhook endpoints report it
    /// through a `NOT OK` acknowledgement instead.
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<CryptoError> for GatewayError {
    fn from(err: CryptoError) -> Self {
        GatewayError::Configuration(err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let message = Some(err.to_string());
        match err {
            GatewayError::Configuration(_) => ApiError::Internal { code: "configuration_error", trace_id: None, message },
            GatewayError::InvalidRequest(_) => ApiError::BadRequest { code: "invalid_request", trace_id: None, message },
            GatewayError::SignatureMismatch => ApiError::BadRequest { code: "signature_mismatch", trace_id: None, message },
            GatewayError::Upstream(_) => ApiError::BadGateway { code: "upstream_error", trace_id: None, message },
        }
    }
}
