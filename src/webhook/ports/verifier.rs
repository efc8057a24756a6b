//! Signature verification port for inbound deliveries.

/// Decides whether a delivery's signature authenticates its body.
///
/// Implementations must be safe to call from concurrent requests.
#[cfg_attr(test, mockall::automock)]
pub trait SignatureVerifier: Send + Sync {
    /// Returns whether `signature` is valid for the raw `body`.
    fn verify(&self, signature: &str, body: &[u8]) -> bool;
}
