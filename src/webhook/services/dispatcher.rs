//! Authenticate-then-decode gate for inbound deliveries.

use crate::clockify::domain::WebhookEvent;
use crate::webhook::{
    domain::{PayloadKind, PayloadRegistry, ReceivedEvent},
    ports::SignatureVerifier,
};
use http::HeaderMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Header naming the delivered event.
pub const EVENT_TYPE_HEADER: &str = "clockify-webhook-event-type";

/// Header carrying the delivery signature.
pub const SIGNATURE_HEADER: &str = "clockify-signature";

/// Reasons a delivery is rejected.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The event type header is absent or empty.
    #[error("missing Clockify-Webhook-Event-Type header")]
    MissingEventType,

    /// The event type is not one the dispatcher decodes.
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(String),

    /// The signature header is absent or empty.
    #[error("missing Clockify-Signature header for {event}")]
    MissingSignature {
        /// Event named by the delivery.
        event: WebhookEvent,
    },

    /// The verifier rejected the signature.
    #[error("invalid signature for {event}")]
    InvalidSignature {
        /// Event named by the delivery.
        event: WebhookEvent,
    },

    /// The body did not decode into the event's payload.
    #[error("failed to decode {kind} payload for {event}: {source}")]
    PayloadDecode {
        /// Event named by the delivery.
        event: WebhookEvent,
        /// Expected payload shape.
        kind: PayloadKind,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
}

impl DispatchError {
    /// Returns the event named by the delivery, once it was recognised.
    #[must_use]
    pub const fn event(&self) -> Option<WebhookEvent> {
        match self {
            Self::MissingEventType | Self::UnsupportedEvent(_) => None,
            Self::MissingSignature { event }
            | Self::InvalidSignature { event }
            | Self::PayloadDecode { event, .. } => Some(*event),
        }
    }
}

/// Authenticates deliveries and decodes their bodies.
///
/// The dispatcher holds no mutable state and can serve concurrent
/// requests behind an `Arc`.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher<V> {
    verifier: V,
    registry: PayloadRegistry,
}

impl<V: SignatureVerifier> WebhookDispatcher<V> {
    /// Creates a dispatcher for every supported event.
    #[must_use]
    pub fn new(verifier: V) -> Self {
        Self::with_registry(verifier, PayloadRegistry::standard())
    }

    /// Creates a dispatcher with an explicit event table.
    #[must_use]
    pub const fn with_registry(verifier: V, registry: PayloadRegistry) -> Self {
        Self { verifier, registry }
    }

    /// Authenticates and decodes one delivery.
    ///
    /// Checks run in order: event type header, event support, signature
    /// header, signature validity, body decoding.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] of the first failing check.
    pub fn process(&self, headers: &HeaderMap, body: &[u8]) -> Result<ReceivedEvent, DispatchError> {
        let event_type = header_value(headers, EVENT_TYPE_HEADER).ok_or_else(|| {
            warn!("missing event type header");
            DispatchError::MissingEventType
        })?;
        debug!(event = event_type, "processing webhook delivery");

        let (event, kind) = self.registry.lookup(event_type).ok_or_else(|| {
            warn!(event = event_type, "unsupported event type");
            DispatchError::UnsupportedEvent(event_type.to_owned())
        })?;

        let signature = header_value(headers, SIGNATURE_HEADER).ok_or_else(|| {
            warn!(event = %event, "missing signature header");
            DispatchError::MissingSignature { event }
        })?;
        if !self.verifier.verify(signature, body) {
            warn!(event = %event, "invalid signature");
            return Err(DispatchError::InvalidSignature { event });
        }

        let payload = kind.decode(body).map_err(|source| {
            warn!(event = %event, kind = %kind, error = %source, "failed to decode payload");
            DispatchError::PayloadDecode {
                event,
                kind,
                source,
            }
        })?;
        Ok(ReceivedEvent { event, payload })
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
