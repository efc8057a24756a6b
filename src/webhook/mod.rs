//! Webhook session lifecycle and inbound delivery dispatch.
//!
//! A session registers one webhook per supported event against a workspace
//! and removes them again on teardown. Deliveries arriving in between are
//! authenticated and decoded into typed payloads by the dispatcher. The
//! module follows hexagonal architecture:
//!
//! - Payload kinds, the decoding registry and webhook naming in [`domain`]
//! - Signature verification and event handling ports in [`ports`]
//! - Verifiers and the axum listener in [`adapters`]
//! - Session lifecycle and dispatch in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
