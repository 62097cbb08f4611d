use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

mod canonical;

pub use canonical::{canonicalize, SIGNATURE_KEY};

type HmacSha256 = Hmac<Sha256>;

/// Errors produced by the common-crypto helpers.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("signing secret is empty")]
    EmptySecret,
    #[error("invalid HMAC key length")]
    InvalidMacKey,
}

/// HMAC-SHA256 signer bound to one merchant secret.
#[derive(Clone)]
pub struct Signer(Zeroizing<Vec<u8>>);

impl Signer {
    /// Construct a signer; an empty secret is rejected.
    pub fn new<B>(secret: B) -> Result<Self, CryptoError>
    where
        B: AsRef<[u8]>,
    {
        let slice = secret.as_ref();
        if slice.is_empty() {
            return Err(CryptoError::EmptySecret);
        }
        Ok(Self(Zeroizing::new(slice.to_vec())))
    }

    /// Lowercase hex HMAC-SHA256 over the canonical form of `value`.
    pub fn sign(&self, value: &Value) -> Result<String, CryptoError> {
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(&self.0).map_err(|_| CryptoError::InvalidMacKey)?;
        mac.update(canonicalize(value).as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Recompute the signature for `value` and compare it to `provided` in constant time.
    pub fn verify(&self, value: &Value, provided: &str) -> bool {
        let provided = provided.trim();
        if provided.is_empty() {
            return false;
        }
        match self.sign(value) {
            Ok(expected) => constant_time_eq(&expected, &provided.to_ascii_lowercase()),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("secret", &"***redacted***")
            .finish()
    }
}

/// Sign `value` with `secret`.
pub fn sign(value: &Value, secret: &str) -> Result<String, CryptoError> {
    Signer::new(secret)?.sign(value)
}

/// Verify `provided` against `value` signed with `secret`. Any failure, including an empty
/// secret or an empty signature, yields `false`.
pub fn verify(value: &Value, secret: &str, provided: &str) -> bool {
    match Signer::new(secret) {
        Ok(signer) => signer.verify(value, provided),
        Err(_) => false,
    }
}

/// Constant-time string equality. Strings of different length compare unequal.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).unwrap_u8() == 1
}

/// Lowercase hex MD5 over the concatenation of `parts`.
pub fn md5_hex(parts: &[&str]) -> String {
    let digest = md5::compute(parts.concat().as_bytes());
    format!("{:x}", digest)
}

/// `Basic` authorization header value for `login:password`.
pub fn basic_auth(login: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{login}:{password}"))
    )
}
