//! Parsing of legacy `<project>/TASK<number>` task names.

use super::{MigrationConfig, MigrationDomainError};

const TASK_MARKER: &str = "/TASK";

/// A legacy task name split into its project and task number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTaskName {
    project: String,
    number: String,
}

impl LegacyTaskName {
    /// Parses `<project>/TASK<digits>`.
    ///
    /// The project is everything before the last `/TASK`, trimmed; the
    /// number is the ASCII digit run after it and must reach the end of the
    /// name. Leading zeros are kept.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::FormatMismatch`] when the marker is
    /// absent, the number is empty or not all digits, or the project is
    /// blank.
    pub fn parse(task_name: &str) -> Result<Self, MigrationDomainError> {
        let mismatch = || MigrationDomainError::FormatMismatch(task_name.to_owned());
        let (project, number) = task_name.rsplit_once(TASK_MARKER).ok_or_else(mismatch)?;
        let project_name = project.trim();
        if project_name.is_empty()
            || number.is_empty()
            || !number.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(mismatch());
        }
        Ok(Self {
            project: project_name.to_owned(),
            number: number.to_owned(),
        })
    }

    /// Returns the legacy project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the task number digits.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the target task name, `"TASK {number}"`.
    #[must_use]
    pub fn task_name(&self) -> String {
        format!("TASK {}", self.number)
    }
}

/// Everything derived from one source task name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTaskMapping {
    original_task_name: String,
    project_name: String,
    task_number: String,
    new_task_name: String,
    client_name: String,
}

impl ProjectTaskMapping {
    /// Parses `task_name` and resolves its client name under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::FormatMismatch`] when the name is not
    /// a legacy task name.
    pub fn derive(task_name: &str, config: &MigrationConfig) -> Result<Self, MigrationDomainError> {
        let parsed = LegacyTaskName::parse(task_name)?;
        let new_task_name = parsed.task_name();
        let client_name = config.client_name_for(parsed.project());
        Ok(Self {
            original_task_name: task_name.to_owned(),
            project_name: parsed.project,
            task_number: parsed.number,
            new_task_name,
            client_name,
        })
    }

    /// Returns the source task name.
    #[must_use]
    pub fn original_task_name(&self) -> &str {
        &self.original_task_name
    }

    /// Returns the target project name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Returns the task number digits.
    #[must_use]
    pub fn task_number(&self) -> &str {
        &self.task_number
    }

    /// Returns the target task name.
    #[must_use]
    pub fn new_task_name(&self) -> &str {
        &self.new_task_name
    }

    /// Returns the target client name.
    #[must_use]
    pub fn client_name(&self) -> &str {
        &self.client_name
    }
}
