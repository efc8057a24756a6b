//! Wire-format model of the Clockify REST API.
//!
//! The types mirror the JSON shapes the service returns and accepts. Fields
//! the service sends as empty strings for "no value" (project and task
//! references on time entries, the client reference on projects) are
//! normalized to `None` on the way in.

mod entities;
mod ids;
mod time_entry;
mod webhook;

pub use entities::{Client, EntityKind, NewProject, Project, Tag, Task, User, Workspace};
pub use ids::{
    ClientId, DRY_RUN_ID, ProjectId, TagId, TaskId, TimeEntryId, UserId, WebhookId, WorkspaceId,
};
pub use time_entry::{NewTimeEntry, TimeEntry, TimeInterval, TimeRange};
pub use webhook::{
    NewWebhook, ParseWebhookEventError, TriggerSourceType, Webhook, WebhookEvent,
};

use serde::{Deserialize, Deserializer};

/// Deserializes an optional identifier, mapping `null` and `""` to `None`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()).map(T::from))
}

/// Deserializes a value, mapping an explicit `null` to its default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}
