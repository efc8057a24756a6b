//! Error types for migration runs.

use super::MigrationPhase;
use crate::clockify::{domain::TaskId, ports::ClockifyApiError};
use std::fmt;
use thiserror::Error;

/// Errors raised by pure migration domain logic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MigrationDomainError {
    /// A task name is not in `<project>/TASK<number>` form.
    #[error("task name '{0}' does not match expected format '<project>/TASK<number>'")]
    FormatMismatch(String),

    /// A required configuration value is blank.
    #[error("migration configuration is missing '{0}'")]
    MissingConfigValue(&'static str),

    /// A run tried to skip or revisit a phase.
    #[error("invalid migration phase transition from {from} to {to}")]
    InvalidPhaseTransition {
        /// Phase the run was in.
        from: MigrationPhase,
        /// Phase that was requested.
        to: MigrationPhase,
    },
}

/// Level of the client, project and task hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HierarchyKind {
    /// A client.
    Client,
    /// A project.
    Project,
    /// A task.
    Task,
}

impl HierarchyKind {
    /// Returns the lower-case name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Project => "project",
            Self::Task => "task",
        }
    }
}

impl fmt::Display for HierarchyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure confined to a single time entry. Recorded, never propagated.
#[derive(Debug, Clone, Error)]
pub enum EntryError {
    /// The source entry is not logged against a task.
    #[error("time entry has no task reference")]
    MissingTaskReference,

    /// The source project's tasks could not be listed.
    #[error("failed to load source tasks: {0}")]
    SourceTasks(#[source] ClockifyApiError),

    /// The entry's task is not among the source project's tasks.
    #[error("source task {0} not found")]
    SourceTaskNotFound(TaskId),

    /// The source task name could not be parsed.
    #[error(transparent)]
    Parse(#[from] MigrationDomainError),

    /// The client is unknown and client creation is disabled.
    #[error("client '{0}' not found and auto-creation disabled")]
    ClientCreationDisabled(String),

    /// Looking up or creating a hierarchy level failed.
    #[error("failed to get/create {kind} '{name}': {source}")]
    Resolve {
        /// Hierarchy level being resolved.
        kind: HierarchyKind,
        /// Name being resolved.
        name: String,
        /// Underlying API failure.
        source: ClockifyApiError,
    },

    /// The target time entry could not be created.
    #[error("failed to create target time entry: {0}")]
    CreateTimeEntry(#[source] ClockifyApiError),
}

/// Failure that aborts a run before any entry is processed.
#[derive(Debug, Clone, Error)]
pub enum MigrationError {
    /// The configuration is incomplete.
    #[error("invalid migration configuration: {0}")]
    Config(#[source] MigrationDomainError),

    /// The source workspace does not exist.
    #[error("source workspace '{0}' not found")]
    WorkspaceNotFound(String),

    /// The source project does not exist in the source workspace.
    #[error("source project '{project}' not found in workspace '{workspace}'")]
    ProjectNotFound {
        /// Source workspace name.
        workspace: String,
        /// Missing project name.
        project: String,
    },

    /// The target workspace does not exist. It is never created.
    #[error("target workspace '{0}' not found - please create it manually first")]
    TargetWorkspaceMissing(String),

    /// A remote call needed to start the run failed.
    #[error("failed to {step}: {source}")]
    Api {
        /// What the run was doing.
        step: &'static str,
        /// Underlying API failure.
        source: ClockifyApiError,
    },

    /// The run's phase bookkeeping was violated.
    #[error("internal migration error: {0}")]
    Internal(#[source] MigrationDomainError),
}

impl MigrationError {
    pub(crate) const fn api(step: &'static str, source: ClockifyApiError) -> Self {
        Self::Api { step, source }
    }
}
