//! Webhook registrations and the event types they subscribe to.

use super::{WebhookId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Workspace event a webhook subscribes to.
///
/// The service accepts exactly one event per registration. Only the events
/// this crate listens for are modelled; any other event name fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEvent {
    /// A timer was started.
    NewTimerStarted,
    /// A running timer was stopped.
    TimerStopped,
    /// A client was created.
    NewClient,
    /// A project was created.
    NewProject,
    /// A tag was created.
    NewTag,
}

impl WebhookEvent {
    /// Every supported event, in registration order.
    pub const ALL: [Self; 5] = [
        Self::NewTimerStarted,
        Self::TimerStopped,
        Self::NewClient,
        Self::NewProject,
        Self::NewTag,
    ];

    /// Returns the wire name of the event.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewTimerStarted => "NEW_TIMER_STARTED",
            Self::TimerStopped => "TIMER_STOPPED",
            Self::NewClient => "NEW_CLIENT",
            Self::NewProject => "NEW_PROJECT",
            Self::NewTag => "NEW_TAG",
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an event name is not one of [`WebhookEvent::ALL`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported webhook event: {0}")]
pub struct ParseWebhookEventError(pub String);

impl TryFrom<&str> for WebhookEvent {
    type Error = ParseWebhookEventError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == value.trim())
            .ok_or_else(|| ParseWebhookEventError(value.to_owned()))
    }
}

/// Scope a webhook is triggered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerSourceType {
    /// Every matching event in the listed workspaces.
    WorkspaceId,
    /// Matching events in the listed projects.
    ProjectId,
    /// Matching events by the listed users.
    UserId,
}

/// A registered webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Webhook identifier.
    pub id: WebhookId,
    /// Display name.
    pub name: String,
    /// Delivery URL.
    pub url: String,
    /// Subscribed event.
    pub webhook_event: WebhookEvent,
    /// Identifiers of the trigger scope.
    #[serde(default)]
    pub trigger_source: Vec<String>,
    /// Kind of the trigger scope.
    pub trigger_source_type: TriggerSourceType,
    /// Owning workspace.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Whether deliveries are enabled.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

/// Request body for registering a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebhook {
    /// Display name, at most 30 characters.
    pub name: String,
    /// Delivery URL.
    pub url: String,
    /// Subscribed event.
    pub webhook_event: WebhookEvent,
    /// Identifiers of the trigger scope.
    pub trigger_source: Vec<String>,
    /// Kind of the trigger scope.
    pub trigger_source_type: TriggerSourceType,
}

impl NewWebhook {
    /// Creates a request that fires for `event` anywhere in `workspace_id`.
    #[must_use]
    pub fn for_workspace(
        name: impl Into<String>,
        url: impl Into<String>,
        event: WebhookEvent,
        workspace_id: &WorkspaceId,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            webhook_event: event,
            trigger_source: vec![workspace_id.as_str().to_owned()],
            trigger_source_type: TriggerSourceType::WorkspaceId,
        }
    }
}
