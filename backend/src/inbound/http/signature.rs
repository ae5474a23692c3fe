//! HMAC-SHA256 verification of gateway payment notifications.
//!
//! Gateways sign the raw request body with the shared webhook secret and send
//! the lowercase hex digest in [`SIGNATURE_HEADER`].

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::Error;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "X-Gateway-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Checks notification signatures against the webhook secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Arc<[u8]>,
}

impl WebhookVerifier {
    /// Build a verifier keyed by `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    fn mac(&self) -> Result<HmacSha256, Error> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| Error::internal(format!("invalid webhook key: {err}")))
    }

    /// Verify `signature` (hex) over `body` in constant time.
    ///
    /// # Errors
    ///
    /// Returns `unauthorized` when the signature is missing, not hex or does
    /// not match.
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), Error> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::unauthorized("gateway signature required"))?;
        let expected = hex::decode(signature)
            .map_err(|_| Error::unauthorized("gateway signature is not valid hex"))?;
        let mut mac = self.mac()?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| Error::unauthorized("gateway signature mismatch"))
    }

    /// Hex signature for `body`.
    #[cfg(any(test, feature = "test-support"))]
    pub fn sign(&self, body: &[u8]) -> Result<String, Error> {
        let mut mac = self.mac()?;
        mac.update(body);
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}
