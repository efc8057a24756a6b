//! Service layer for migration runs.

mod hierarchy;
mod orchestrator;

pub use hierarchy::{HierarchyCache, HierarchyResolver, Resolution};
pub use orchestrator::{MigrationResult, MigrationService};
