//! `application/x-www-form-urlencoded` with bracketed keys for nested values
//! (`products[0][name]=Widget`).

use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Bracket groups deeper than this are kept as one literal key.
pub const MAX_DEPTH: usize = 5;

fn config() -> serde_qs::Config {
    // Non-strict so percent-encoded brackets (`products%5B0%5D`) still nest.
    serde_qs::Config::new(MAX_DEPTH, false)
}

/// Encode a parameter map as a query string. Nested maps and arrays become bracketed keys.
pub fn encode(params: &Map<String, Value>) -> Result<String, GatewayError> {
    serde_qs::to_string(params).map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}

/// Decode a form body into a JSON object. Indexed groups (`products[0]`) and `key[]` become
/// arrays, every scalar stays a string. A key repeated at the same path is an error.
pub fn decode(body: &str) -> Result<Value, GatewayError> {
    config()
        .deserialize_str::<Map<String, Value>>(body)
        .map(Value::Object)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
}
