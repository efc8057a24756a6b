//! HTTP listener receiving webhook deliveries.

use crate::webhook::{
    domain::{EventPayload, ReceivedEvent},
    ports::{SignatureVerifier, WebhookEventHandler},
    services::{DispatchError, WebhookDispatcher},
};
use async_trait::async_trait;
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state of the listener routes.
struct ListenerState<V, H> {
    dispatcher: Arc<WebhookDispatcher<V>>,
    handler: Arc<H>,
}

impl<V, H> Clone for ListenerState<V, H> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Builds the router accepting deliveries with `POST /`.
///
/// Accepted deliveries are passed to `handler` and answered with `200 OK`;
/// rejected ones are answered with the status of their [`DispatchError`].
pub fn webhook_router<V, H>(dispatcher: Arc<WebhookDispatcher<V>>, handler: Arc<H>) -> Router
where
    V: SignatureVerifier + 'static,
    H: WebhookEventHandler + 'static,
{
    Router::new()
        .route("/", post(receive_delivery::<V, H>))
        .with_state(ListenerState {
            dispatcher,
            handler,
        })
}

async fn receive_delivery<V, H>(
    State(state): State<ListenerState<V, H>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    V: SignatureVerifier + 'static,
    H: WebhookEventHandler + 'static,
{
    match state.dispatcher.process(&headers, &body) {
        Ok(received) => {
            state.handler.handle(received).await;
            StatusCode::OK.into_response()
        }
        Err(error) => {
            let status = rejection_status(&error);
            warn!(status = status.as_u16(), error = %error, "rejected webhook delivery");
            (status, error.to_string()).into_response()
        }
    }
}

/// Maps a dispatch failure to the response status.
#[must_use]
pub const fn rejection_status(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::MissingEventType | DispatchError::PayloadDecode { .. } => {
            StatusCode::BAD_REQUEST
        }
        DispatchError::UnsupportedEvent(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DispatchError::MissingSignature { .. } | DispatchError::InvalidSignature { .. } => {
            StatusCode::UNAUTHORIZED
        }
    }
}

/// Handler that logs each decoded delivery.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventHandler;

#[async_trait]
impl WebhookEventHandler for LoggingEventHandler {
    async fn handle(&self, received: ReceivedEvent) {
        let subject = match &received.payload {
            EventPayload::TimeEntry(entry) => entry.id.to_string(),
            EventPayload::Client(client) => client.name.clone(),
            EventPayload::Project(project) => project.name.clone(),
            EventPayload::Tag(tag) => tag.name.clone(),
        };
        info!(
            event = %received.event,
            kind = %received.payload.kind(),
            subject = %subject,
            "webhook processed"
        );
    }
}
