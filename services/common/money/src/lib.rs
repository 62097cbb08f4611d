use bigdecimal::{BigDecimal, Signed};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount must not be negative")]
    Negative,
}

/// Round a monetary value to 2 decimal places, half away from zero.
pub fn normalize_scale(value: &BigDecimal) -> BigDecimal {
    let (_, scale) = value.as_bigint_and_exponent();
    if scale <= 2 {
        return value.with_scale(2);
    }
    // with_scale truncates toward zero, so shift by half a cent first.
    let half_cent = BigDecimal::new(5.into(), 3);
    if value.is_negative() {
        (value - half_cent).with_scale(2)
    } else {
        (value + half_cent).with_scale(2)
    }
}

/// Wire rendering used in signed parameter maps: always two decimals, no exponent.
pub fn format_amount(value: &BigDecimal) -> String {
    normalize_scale(value).to_string()
}

/// Parse an amount as the gateway sends it. Accepts a comma decimal separator.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, MoneyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MoneyError::Invalid(raw.to_string()));
    }
    BigDecimal::from_str(&trimmed.replace(',', "."))
        .map_err(|_| MoneyError::Invalid(raw.to_string()))
}

/// Reject negative amounts; zero is allowed.
pub fn ensure_non_negative(value: &BigDecimal) -> Result<(), MoneyError> {
    if value.is_negative() {
        return Err(MoneyError::Negative);
    }
    Ok(())
}
