//! Webhook session lifecycle for one workspace.

use crate::batch::{BatchError, BatchFailure};
use crate::clockify::{
    domain::{NewWebhook, Webhook, WebhookEvent, WebhookId, Workspace},
    ports::{ClockifyApi, ClockifyApiError},
};
use crate::webhook::domain::make_webhook_name;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised by webhook session operations.
#[derive(Debug, Clone, Error)]
pub enum WebhookLifecycleError {
    /// Registering the webhook for one event failed.
    #[error("failed to create webhook for {event}: {source}")]
    Registration {
        /// Event whose registration failed.
        event: WebhookEvent,
        /// API failure.
        #[source]
        source: ClockifyApiError,
    },

    /// One or more webhooks could not be deleted.
    #[error("failed to delete webhooks: {0}")]
    Teardown(BatchError<WebhookId, ClockifyApiError>),

    /// Webhooks of a previous session are still registered.
    #[error("webhook session is already active")]
    SessionActive,
}

/// Result type for webhook session operations.
pub type WebhookLifecycleResult<T> = Result<T, WebhookLifecycleError>;

/// Owns the webhooks that make a workspace report its events to one URL.
///
/// The service accepts a single event per registration, so a session holds
/// one webhook per [`WebhookEvent`]. Operations take `&mut self`; callers
/// serialize them by ownership.
pub struct WorkspaceWebhookService<A, R = StdRng>
where
    A: ClockifyApi,
    R: Rng + Send,
{
    api: Arc<A>,
    workspace: Workspace,
    url: String,
    rng: R,
    registered: BTreeMap<WebhookEvent, Webhook>,
    stranded: Vec<Webhook>,
}

impl<A: ClockifyApi> WorkspaceWebhookService<A> {
    /// Creates a session service naming webhooks from OS entropy.
    #[must_use]
    pub fn new(api: Arc<A>, workspace: Workspace, url: impl Into<String>) -> Self {
        Self::with_rng(api, workspace, url, StdRng::from_entropy())
    }
}

impl<A, R> WorkspaceWebhookService<A, R>
where
    A: ClockifyApi,
    R: Rng + Send,
{
    /// Creates a session service drawing webhook name suffixes from `rng`.
    #[must_use]
    pub fn with_rng(api: Arc<A>, workspace: Workspace, url: impl Into<String>, rng: R) -> Self {
        Self {
            api,
            workspace,
            url: url.into(),
            rng,
            registered: BTreeMap::new(),
            stranded: Vec::new(),
        }
    }

    /// Returns the monitored workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Returns the delivery URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the webhooks of the active session, keyed by event.
    #[must_use]
    pub const fn registered(&self) -> &BTreeMap<WebhookEvent, Webhook> {
        &self.registered
    }

    /// Returns webhooks created by a failed [`Self::create`] and not yet
    /// deleted.
    #[must_use]
    pub fn stranded(&self) -> &[Webhook] {
        &self.stranded
    }

    /// Returns whether webhooks of a published session are still held.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.registered.is_empty()
    }

    /// Registers one webhook per supported event.
    ///
    /// Either every registration succeeds and the set is published, or
    /// none is published. Webhooks created before a failure are kept as
    /// stranded so that [`Self::delete`] removes them.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookLifecycleError::SessionActive`] while webhooks of a
    /// previous session are still held, or
    /// [`WebhookLifecycleError::Registration`] for the first failing event.
    pub async fn create(&mut self) -> WebhookLifecycleResult<()> {
        if self.is_active() {
            return Err(WebhookLifecycleError::SessionActive);
        }

        let mut created = BTreeMap::new();
        for event in WebhookEvent::ALL {
            let name = make_webhook_name(&self.workspace.name, &mut self.rng);
            let request =
                NewWebhook::for_workspace(name, self.url.as_str(), event, &self.workspace.id);
            match self.api.create_webhook(&self.workspace.id, &request).await {
                Ok(webhook) => {
                    info!(
                        event = %event,
                        webhook_id = %webhook.id,
                        name = %webhook.name,
                        "created webhook"
                    );
                    created.insert(event, webhook);
                }
                Err(source) => {
                    self.stranded.extend(created.into_values());
                    warn!(
                        event = %event,
                        error = %source,
                        stranded = self.stranded.len(),
                        "failed to create webhook"
                    );
                    return Err(WebhookLifecycleError::Registration { event, source });
                }
            }
        }

        info!(
            workspace = %self.workspace,
            url = %self.url,
            count = created.len(),
            "webhook session registered"
        );
        self.registered = created;
        Ok(())
    }

    /// Deletes every registered and stranded webhook.
    ///
    /// Every deletion is attempted. Webhooks that could not be deleted stay
    /// held so a later call can retry them.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookLifecycleError::Teardown`] listing each failed
    /// deletion.
    pub async fn delete(&mut self) -> WebhookLifecycleResult<()> {
        let mut deleted = HashSet::new();
        let mut failures = Vec::new();
        for webhook in self.registered.values().chain(&self.stranded) {
            match self
                .api
                .delete_webhook(&self.workspace.id, &webhook.id)
                .await
            {
                Ok(()) => {
                    info!(
                        webhook_id = %webhook.id,
                        event = %webhook.webhook_event,
                        "deleted webhook"
                    );
                    deleted.insert(webhook.id.clone());
                }
                Err(cause) => {
                    warn!(webhook_id = %webhook.id, error = %cause, "failed to delete webhook");
                    failures.push(BatchFailure::new(webhook.id.clone(), cause));
                }
            }
        }

        self.registered.retain(|_, webhook| !deleted.contains(&webhook.id));
        self.stranded.retain(|webhook| !deleted.contains(&webhook.id));

        BatchError::from_failures(failures)
            .map_or(Ok(()), |errors| Err(WebhookLifecycleError::Teardown(errors)))
    }
}
