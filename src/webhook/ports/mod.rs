//! Port contracts for webhook deliveries.

pub mod handler;
pub mod verifier;

pub use handler::WebhookEventHandler;
pub use verifier::SignatureVerifier;

#[cfg(test)]
pub use handler::MockWebhookEventHandler;
#[cfg(test)]
pub use verifier::MockSignatureVerifier;
