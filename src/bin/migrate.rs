//! Migrates legacy `<project>/TASK<number>` time entries between Clockify
//! workspaces.
//!
//! Usage:
//!
//! ```text
//! clocksync-migrate --config <path> [--dry-run] [--json]
//! ```
//!
//! The API key is read from `--api-key` or `CLOCKIFY_API_KEY`. The config
//! file is camelCase JSON, for example:
//!
//! ```json
//! {
//!   "sourceWorkspaceName": "Legacy",
//!   "sourceProjectName": "Tickets",
//!   "targetWorkspaceName": "Clients",
//!   "clientMapping": { "Acme": "Acme Holdings" },
//!   "defaultClientName": "Default Client",
//!   "batchSize": 50,
//!   "dryRun": false,
//!   "skipExisting": true,
//!   "createClients": true
//! }
//! ```
//!
//! The process exits with status 2 when some entries failed to migrate.

use clap::Parser;
use clocksync::clockify::adapters::HttpClockifyApi;
use clocksync::config::{ClockifyArgs, load_dotenv, load_migration_config};
use clocksync::migration::services::MigrationService;
use clocksync::telemetry::{LogFormat, init_tracing};
use mockable::DefaultClock;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::warn;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "clocksync-migrate", version, about)]
struct Cli {
    #[command(flatten)]
    clockify: ClockifyArgs,

    /// Path to the JSON migration config.
    #[arg(long, short, env = "CLOCKSYNC_MIGRATION_CONFIG")]
    config: PathBuf,

    /// Simulate the run without creating anything.
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,

    /// Log record format.
    #[arg(long, env = "CLOCKSYNC_LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    load_dotenv()?;
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let loaded = load_migration_config(&cli.config)?;
    let config = if cli.dry_run {
        loaded.with_dry_run(true)
    } else {
        loaded
    };

    let api = HttpClockifyApi::new(&cli.clockify.api_settings())?;
    let service = MigrationService::new(Arc::new(api), Arc::new(DefaultClock));
    let stats = service.execute_migration(&config).await?;
    let summary = stats.summary();

    let mut stdout = io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &summary)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{summary}")?;
    }

    if summary.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(failed = summary.errors.len(), "some entries were not migrated");
        Ok(ExitCode::from(2))
    }
}
