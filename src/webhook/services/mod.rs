//! Webhook session and dispatch services.

mod dispatcher;
mod lifecycle;

pub use dispatcher::{DispatchError, EVENT_TYPE_HEADER, SIGNATURE_HEADER, WebhookDispatcher};
pub use lifecycle::{WebhookLifecycleError, WebhookLifecycleResult, WorkspaceWebhookService};
