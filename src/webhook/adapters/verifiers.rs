//! Signature verifier implementations.

use crate::webhook::ports::SignatureVerifier;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Accepts every signature.
///
/// This performs no authentication at all. It is only suitable for local
/// debugging; deployments must configure [`HmacSha256Verifier`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl SignatureVerifier for AcceptAllVerifier {
    fn verify(&self, _signature: &str, _body: &[u8]) -> bool {
        debug!("accepting webhook signature without verification");
        true
    }
}

/// Errors raised while configuring a verifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookSecretError {
    /// The signing secret was empty.
    #[error("webhook signing secret must not be empty")]
    Empty,
}

/// Verifies hex-encoded HMAC-SHA256 signatures of the raw body.
///
/// A `sha256=` prefix on the signature is accepted and ignored.
#[derive(Clone)]
pub struct HmacSha256Verifier {
    mac: HmacSha256,
}

impl HmacSha256Verifier {
    const PREFIX: &'static str = "sha256=";

    /// Creates a verifier for the shared `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookSecretError::Empty`] when `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, WebhookSecretError> {
        let key = secret.as_ref();
        if key.is_empty() {
            return Err(WebhookSecretError::Empty);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| WebhookSecretError::Empty)?;
        Ok(Self { mac })
    }

    /// Returns the hex-encoded signature of `body`.
    #[must_use]
    pub fn sign(&self, body: &[u8]) -> String {
        hex::encode(self.digest(body))
    }

    fn digest(&self, body: &[u8]) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(body);
        mac.finalize().into_bytes().to_vec()
    }
}

impl fmt::Debug for HmacSha256Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSha256Verifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SignatureVerifier for HmacSha256Verifier {
    fn verify(&self, signature: &str, body: &[u8]) -> bool {
        let trimmed = signature.trim();
        let encoded = trimmed.strip_prefix(Self::PREFIX).unwrap_or(trimmed);
        let Ok(provided) = hex::decode(encoded) else {
            warn!("webhook signature is not valid hex");
            return false;
        };
        let valid: bool = self.digest(body).ct_eq(&provided).into();
        if !valid {
            warn!("webhook signature verification failed");
        }
        valid
    }
}

/// Verifier chosen from the configured signing secret.
#[derive(Debug, Clone)]
pub enum DeliveryVerifier {
    /// No secret configured; signatures are not checked.
    AcceptAll(AcceptAllVerifier),
    /// Signatures are checked against the shared secret.
    Hmac(HmacSha256Verifier),
}

impl DeliveryVerifier {
    /// Selects HMAC verification when `secret` is set, accept-all otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookSecretError::Empty`] when a secret is set but empty.
    pub fn from_secret(secret: Option<&str>) -> Result<Self, WebhookSecretError> {
        match secret {
            Some(key) => HmacSha256Verifier::new(key).map(Self::Hmac),
            None => {
                warn!("no webhook secret configured; delivery signatures are not checked");
                Ok(Self::AcceptAll(AcceptAllVerifier))
            }
        }
    }

    /// Returns whether signatures are checked.
    #[must_use]
    pub const fn is_authenticating(&self) -> bool {
        matches!(self, Self::Hmac(_))
    }
}

impl SignatureVerifier for DeliveryVerifier {
    fn verify(&self, signature: &str, body: &[u8]) -> bool {
        match self {
            Self::AcceptAll(verifier) => verifier.verify(signature, body),
            Self::Hmac(verifier) => verifier.verify(signature, body),
        }
    }
}
