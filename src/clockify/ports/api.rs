//! API port for the remote time-tracking service.

use crate::clockify::domain::{
    Client, EntityKind, NewProject, NewTimeEntry, NewWebhook, Project, ProjectId, Task, TimeEntry,
    TimeRange, User, UserId, Webhook, WebhookId, Workspace, WorkspaceId,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for Clockify API operations.
pub type ClockifyApiResult<T> = Result<T, ClockifyApiError>;

/// One-based page number for paginated listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Page(u32);

impl Page {
    /// The first page.
    pub const FIRST: Self = Self(1);

    /// Returns the page following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability surface of the Clockify REST API consumed by clocksync.
///
/// Listing operations return one page at a time; an empty page marks the
/// end of the sequence. Every call is a single bounded round trip with no
/// retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClockifyApi: Send + Sync {
    /// Returns the user owning the API key.
    async fn current_user(&self) -> ClockifyApiResult<User>;

    /// Lists every workspace the user belongs to.
    async fn list_workspaces(&self) -> ClockifyApiResult<Vec<Workspace>>;

    /// Lists one page of clients in a workspace.
    async fn list_clients(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Client>>;

    /// Lists one page of projects in a workspace.
    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Project>>;

    /// Lists one page of tasks in a project.
    async fn list_tasks(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Task>>;

    /// Lists one page of a user's time entries in a workspace.
    ///
    /// The service can only filter by user and workspace; project filtering
    /// is left to the caller.
    async fn list_time_entries(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        range: TimeRange,
        page: Page,
    ) -> ClockifyApiResult<Vec<TimeEntry>>;

    /// Creates a client.
    async fn create_client(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Client>;

    /// Creates a project.
    async fn create_project(
        &self,
        workspace_id: &WorkspaceId,
        project: &NewProject,
    ) -> ClockifyApiResult<Project>;

    /// Creates an active task in a project.
    async fn create_task(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        name: &str,
    ) -> ClockifyApiResult<Task>;

    /// Creates a time entry on behalf of a user.
    async fn create_time_entry(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        entry: &NewTimeEntry,
    ) -> ClockifyApiResult<TimeEntry>;

    /// Registers a webhook.
    async fn create_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook: &NewWebhook,
    ) -> ClockifyApiResult<Webhook>;

    /// Removes a webhook.
    async fn delete_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook_id: &WebhookId,
    ) -> ClockifyApiResult<()>;
}

/// Errors returned by Clockify API adapters.
#[derive(Debug, Clone, Error)]
pub enum ClockifyApiError {
    /// A lookup by exact name found nothing.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of entity looked up.
        kind: EntityKind,
        /// Name that was looked up.
        name: String,
    },

    /// The service answered with a non-success status.
    #[error("Clockify returned HTTP {status} for {endpoint}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request method and path.
        endpoint: String,
        /// Response body, possibly empty.
        body: String,
    },

    /// The request could not be built or sent.
    #[error("Clockify transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The response body did not match the expected shape.
    #[error("failed to decode Clockify response: {0}")]
    Decode(Arc<dyn std::error::Error + Send + Sync>),
}

impl ClockifyApiError {
    /// Builds a [`ClockifyApiError::NotFound`].
    #[must_use]
    pub fn not_found(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Wraps a transport error.
    #[must_use]
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a decoding error.
    #[must_use]
    pub fn decode(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Decode(Arc::new(err))
    }

    /// Returns whether this is a [`ClockifyApiError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
