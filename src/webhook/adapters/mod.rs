//! Adapter implementations for the webhook ports.

pub mod listener;
pub mod verifiers;

pub use listener::{LoggingEventHandler, rejection_status, webhook_router};
pub use verifiers::{
    AcceptAllVerifier, DeliveryVerifier, HmacSha256Verifier, WebhookSecretError,
};
