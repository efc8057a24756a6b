//! Run parameters for a migration.

use super::MigrationDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Client name used when neither a mapping nor auto-creation applies.
const DEFAULT_CLIENT_NAME: &str = "Default Client";

/// Number of time entries processed per batch. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct BatchSize(usize);

impl BatchSize {
    /// Batch size used when none, or zero, is configured.
    pub const DEFAULT: Self = Self(50);

    /// Returns the batch size.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<usize> for BatchSize {
    fn from(value: usize) -> Self {
        if value == 0 { Self::DEFAULT } else { Self(value) }
    }
}

impl From<BatchSize> for usize {
    fn from(value: BatchSize) -> Self {
        value.0
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable parameters of one migration run.
///
/// Deserializes from the JSON configuration file format (camelCase keys);
/// every key other than the three names is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    source_workspace_name: String,
    source_project_name: String,
    target_workspace_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    client_mapping: BTreeMap<String, String>,
    #[serde(default)]
    default_client_name: String,
    #[serde(default)]
    batch_size: BatchSize,
    #[serde(default)]
    dry_run: bool,
    #[serde(default)]
    skip_existing: bool,
    #[serde(default)]
    create_clients: bool,
}

impl MigrationConfig {
    /// Creates a configuration with default options.
    #[must_use]
    pub fn new(
        source_workspace_name: impl Into<String>,
        source_project_name: impl Into<String>,
        target_workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            source_workspace_name: source_workspace_name.into(),
            source_project_name: source_project_name.into(),
            target_workspace_name: target_workspace_name.into(),
            client_mapping: BTreeMap::new(),
            default_client_name: DEFAULT_CLIENT_NAME.to_owned(),
            batch_size: BatchSize::DEFAULT,
            dry_run: false,
            skip_existing: false,
            create_clients: false,
        }
    }

    /// Maps a legacy project name to an explicit client name.
    #[must_use]
    pub fn with_client_mapping(
        mut self,
        project_name: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Self {
        self.client_mapping
            .insert(project_name.into(), client_name.into());
        self
    }

    /// Sets the fallback client name.
    #[must_use]
    pub fn with_default_client_name(mut self, name: impl Into<String>) -> Self {
        self.default_client_name = name.into();
        self
    }

    /// Sets the batch size; zero selects [`BatchSize::DEFAULT`].
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = BatchSize::from(batch_size);
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enables or disables skipping entries already present in the target.
    #[must_use]
    pub const fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    /// Enables or disables automatic client creation.
    #[must_use]
    pub const fn with_create_clients(mut self, create_clients: bool) -> Self {
        self.create_clients = create_clients;
        self
    }

    /// Checks that the workspace and project names are present.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationDomainError::MissingConfigValue`] naming the first
    /// blank field.
    pub fn validate(&self) -> Result<(), MigrationDomainError> {
        let required = [
            ("sourceWorkspaceName", &self.source_workspace_name),
            ("sourceProjectName", &self.source_project_name),
            ("targetWorkspaceName", &self.target_workspace_name),
        ];
        required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map_or(Ok(()), |(field, _)| {
                Err(MigrationDomainError::MissingConfigValue(field))
            })
    }

    /// Returns the client name for a legacy project.
    ///
    /// An explicit mapping wins; otherwise `"{project} Client"` when client
    /// creation is enabled; otherwise the default client name.
    #[must_use]
    pub fn client_name_for(&self, project_name: &str) -> String {
        if let Some(mapped) = self.client_mapping.get(project_name) {
            return mapped.clone();
        }
        if self.create_clients {
            return format!("{project_name} Client");
        }
        self.default_client_name().to_owned()
    }

    /// Returns the source workspace name.
    #[must_use]
    pub fn source_workspace_name(&self) -> &str {
        &self.source_workspace_name
    }

    /// Returns the source project name.
    #[must_use]
    pub fn source_project_name(&self) -> &str {
        &self.source_project_name
    }

    /// Returns the target workspace name.
    #[must_use]
    pub fn target_workspace_name(&self) -> &str {
        &self.target_workspace_name
    }

    /// Returns the explicit project-to-client mapping.
    #[must_use]
    pub const fn client_mapping(&self) -> &BTreeMap<String, String> {
        &self.client_mapping
    }

    /// Returns the fallback client name, `"Default Client"` when blank.
    #[must_use]
    pub fn default_client_name(&self) -> &str {
        if self.default_client_name.trim().is_empty() {
            DEFAULT_CLIENT_NAME
        } else {
            &self.default_client_name
        }
    }

    /// Returns the batch size.
    #[must_use]
    pub const fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    /// Returns whether mutations are simulated.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns whether entries already in the target are skipped.
    #[must_use]
    pub const fn skip_existing(&self) -> bool {
        self.skip_existing
    }

    /// Returns whether missing clients are created.
    #[must_use]
    pub const fn create_clients(&self) -> bool {
        self.create_clients
    }
}
