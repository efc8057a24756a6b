//! Process configuration shared by the command-line tools.
//!
//! Settings come from flags, the environment and an optional `.env` file,
//! in that order of precedence.

use crate::clockify::adapters::ClockifyApiSettings;
use crate::migration::domain::MigrationConfig;
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Connection settings for the Clockify REST API.
#[derive(Clone, Args)]
pub struct ClockifyArgs {
    /// API key sent with every request.
    #[arg(long, env = "CLOCKIFY_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the REST API.
    #[arg(long, env = "CLOCKIFY_BASE_URL", default_value = ClockifyApiSettings::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds.
    #[arg(long, env = "CLOCKIFY_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Records requested per page.
    #[arg(long, env = "CLOCKIFY_PAGE_SIZE", default_value_t = ClockifyApiSettings::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,
}

impl ClockifyArgs {
    /// Converts the arguments into adapter settings.
    #[must_use]
    pub fn api_settings(&self) -> ClockifyApiSettings {
        ClockifyApiSettings::new(self.api_key.as_str())
            .with_base_url(self.base_url.as_str())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_page_size(self.page_size)
    }
}

impl std::fmt::Debug for ClockifyArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockifyArgs")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .finish()
    }
}

/// Errors raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid migration config.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File that was requested.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },

    /// The `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

/// Loads a `.env` file from the working directory or its parents.
///
/// A missing file is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Dotenv`] when a file exists but is malformed.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(error) if error.not_found() => Ok(()),
        Err(error) => Err(ConfigError::Dotenv(error)),
    }
}

/// Reads a camelCase JSON migration config from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
pub fn load_migration_config(path: &Path) -> Result<MigrationConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ClockifyArgs, ConfigError, load_migration_config};
    use clap::Parser;
    use rstest::rstest;
    use std::path::Path;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        clockify: ClockifyArgs,
    }

    #[rstest]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "clocksync",
            "--api-key",
            "secret-key",
            "--base-url",
            "http://localhost:9000/api/v1/",
            "--timeout-secs",
            "5",
            "--page-size",
            "25",
        ])
        .expect("arguments parse");

        let settings = cli.clockify.api_settings();

        assert_eq!(settings.base_url(), "http://localhost:9000/api/v1/");
        assert_eq!(settings.page_size(), 25);
    }

    #[rstest]
    fn debug_output_hides_api_key() {
        let cli = Cli::try_parse_from(["clocksync", "--api-key", "secret-key"])
            .expect("arguments parse");

        let rendered = format!("{:?}", cli.clockify);

        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[rstest]
    fn missing_config_file_is_a_read_error() {
        let result = load_migration_config(Path::new("/nonexistent/clocksync/migration.json"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
