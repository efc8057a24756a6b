//! Workspace, user and hierarchy entities.

use super::{ClientId, ProjectId, TagId, TaskId, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of remote entity, used in lookup errors and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A workspace.
    Workspace,
    /// A client.
    Client,
    /// A project.
    Project,
    /// A task.
    Task,
    /// A time entry.
    TimeEntry,
    /// A webhook.
    Webhook,
}

impl EntityKind {
    /// Returns the lower-case display name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workspace => "workspace",
            Self::Client => "client",
            Self::Project => "project",
            Self::Task => "task",
            Self::TimeEntry => "time entry",
            Self::Webhook => "webhook",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Clockify workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Workspace <{}>: {}", self.id, self.name)
    }
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Login e-mail address.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Workspace currently selected in the UI.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub active_workspace: Option<WorkspaceId>,
    /// Workspace selected on login.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub default_workspace: Option<WorkspaceId>,
}

/// A client (customer) owning projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Client identifier.
    pub id: ClientId,
    /// Display name, unique within a workspace.
    pub name: String,
    /// Owning workspace.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Whether the client is archived.
    #[serde(default)]
    pub archived: bool,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Client {
    /// Builds the placeholder client used by dry runs.
    #[must_use]
    pub fn dry_run(name: impl Into<String>) -> Self {
        Self {
            id: ClientId::dry_run(),
            name: name.into(),
            workspace_id: None,
            archived: false,
            note: None,
        }
    }
}

/// A project, optionally owned by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Owning client, if any.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub client_id: Option<ClientId>,
    /// Owning client name as denormalized by the service.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub client_name: Option<String>,
    /// Owning workspace.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Whether time on the project is billable by default.
    #[serde(default)]
    pub billable: bool,
    /// Whether the project is visible to the whole workspace.
    #[serde(default)]
    pub public: bool,
    /// Whether the project is archived.
    #[serde(default)]
    pub archived: bool,
    /// Display colour, `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Project {
    /// Builds the placeholder project used by dry runs.
    #[must_use]
    pub fn dry_run(name: impl Into<String>, client_id: Option<ClientId>) -> Self {
        Self {
            id: ProjectId::dry_run(),
            name: name.into(),
            client_id,
            client_name: None,
            workspace_id: None,
            billable: true,
            public: false,
            archived: false,
            color: None,
            note: None,
        }
    }
}

/// Request body for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    /// Project name.
    pub name: String,
    /// Owning client.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    /// Billable by default.
    pub billable: bool,
    /// Visible to the whole workspace.
    pub public: bool,
}

impl NewProject {
    /// Creates a billable, private project request.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client_id: None,
            billable: true,
            public: false,
        }
    }

    /// Sets the owning client.
    #[must_use]
    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }
}

/// A task within a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Display name, unique within a project.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// Task status, `ACTIVE` or `DONE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// ISO-8601 duration estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
}

impl Task {
    /// Builds the placeholder task used by dry runs.
    #[must_use]
    pub fn dry_run(name: impl Into<String>, project_id: ProjectId) -> Self {
        Self {
            id: TaskId::dry_run(),
            name: name.into(),
            project_id,
            status: Some("ACTIVE".to_owned()),
            estimate: None,
        }
    }
}

/// A workspace tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Tag identifier.
    pub id: TagId,
    /// Display name.
    pub name: String,
    /// Owning workspace.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub workspace_id: Option<WorkspaceId>,
    /// Whether the tag is archived.
    #[serde(default)]
    pub archived: bool,
}
