//! Time entries and the request shapes used to create and list them.

use super::{ProjectId, TagId, TaskId, TimeEntryId, UserId, WorkspaceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start and end of a time entry. A running timer has no end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant, absent while the timer runs.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// ISO-8601 duration as computed by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// A logged time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Entry identifier.
    pub id: TimeEntryId,
    /// Free-form description.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub description: String,
    /// Attached tags.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub tag_ids: Vec<TagId>,
    /// Owning user.
    pub user_id: UserId,
    /// Billable flag.
    #[serde(default)]
    pub billable: bool,
    /// Task the time was logged against.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub task_id: Option<TaskId>,
    /// Project the time was logged against.
    #[serde(default, deserialize_with = "super::empty_as_none")]
    pub project_id: Option<ProjectId>,
    /// Start and end.
    pub time_interval: TimeInterval,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Whether the entry is locked against edits.
    #[serde(default)]
    pub is_locked: bool,
}

impl fmt::Display for TimeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "TimeEntry {}", self.id)
        } else {
            f.write_str(&self.description)
        }
    }
}

/// Request body for creating a time entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant; omitted to start a running timer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    /// Billable flag.
    pub billable: bool,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Project to log against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    /// Task to log against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Tags to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<TagId>,
}

impl NewTimeEntry {
    /// Copies interval, billable flag, description and tags from `source`
    /// and points the copy at the given project and task.
    #[must_use]
    pub fn copy_of(source: &TimeEntry, project_id: ProjectId, task_id: TaskId) -> Self {
        Self {
            start: source.time_interval.start,
            end: source.time_interval.end,
            billable: source.billable,
            description: source.description.clone(),
            project_id: Some(project_id),
            task_id: Some(task_id),
            tag_ids: source.tag_ids.clone(),
        }
    }
}

/// Optional bounds for listing time entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    /// Only entries starting at or after this instant.
    pub start: Option<DateTime<Utc>>,
    /// Only entries starting before this instant.
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Returns an unbounded range.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Returns whether `instant` falls within the range.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start) && self.end.is_none_or(|end| instant < end)
    }
}
