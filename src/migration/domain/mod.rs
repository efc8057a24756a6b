//! Domain model for migration runs.

mod config;
mod error;
mod mapping;
mod phase;
mod stats;

pub use config::{BatchSize, MigrationConfig};
pub use error::{EntryError, HierarchyKind, MigrationDomainError, MigrationError};
pub use mapping::{LegacyTaskName, ProjectTaskMapping};
pub use phase::MigrationPhase;
pub use stats::{EntryOutcome, MigrationRunId, MigrationStats, MigrationSummary};
