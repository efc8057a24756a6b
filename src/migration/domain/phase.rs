//! Phases of a migration run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a migration run. Phases advance strictly in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    /// Resolving the user, workspaces and source project.
    Initializing,
    /// Fetching source time entries.
    Fetching,
    /// Re-creating entries batch by batch.
    ProcessingBatches,
    /// Run complete; statistics are final.
    Finalized,
}

impl MigrationPhase {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Fetching => "fetching",
            Self::ProcessingBatches => "processing_batches",
            Self::Finalized => "finalized",
        }
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Initializing, Self::Fetching)
                | (Self::Fetching, Self::ProcessingBatches)
                | (Self::ProcessingBatches, Self::Finalized)
        )
    }

    /// Returns whether the phase is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
