//! Statistics accumulated over one migration run.

use super::{EntryError, HierarchyKind, MigrationDomainError, MigrationPhase};
use crate::batch::{BatchError, BatchFailure};
use crate::clockify::domain::TimeEntryId;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier correlating the log lines and summary of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationRunId(Uuid);

impl MigrationRunId {
    /// Generates a random run identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for MigrationRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MigrationRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to a successfully handled source entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// The target entry was created.
    Created,
    /// Dry run: the target entry would have been created.
    WouldCreate,
    /// An identical entry already exists in the target.
    SkippedExisting,
}

impl EntryOutcome {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::WouldCreate => "would_create",
            Self::SkippedExisting => "skipped_existing",
        }
    }
}

/// Counters, outcomes and failures of one run.
///
/// Created when the run starts and finalized exactly once when it ends.
/// Only the migration service mutates it.
#[derive(Debug, Clone)]
pub struct MigrationStats {
    run_id: MigrationRunId,
    dry_run: bool,
    phase: MigrationPhase,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    time_entries_found: usize,
    time_entries_processed: usize,
    time_entries_created: usize,
    time_entries_skipped: usize,
    projects_created: usize,
    tasks_created: usize,
    clients_created: usize,
    outcomes: Vec<(TimeEntryId, EntryOutcome)>,
    failures: Vec<BatchFailure<TimeEntryId, EntryError>>,
}

impl MigrationStats {
    /// Starts statistics for a run in the `Initializing` phase.
    #[must_use]
    pub fn new(run_id: MigrationRunId, dry_run: bool, clock: &impl Clock) -> Self {
        Self {
            run_id,
            dry_run,
            phase: MigrationPhase::Initializing,
            started_at: clock.utc(),
            finished_at: None,
            time_entries_found: 0,
            time_entries_processed: 0,
            time_entries_created: 0,
            time_entries_skipped: 0,
            projects_created: 0,
            tasks_created: 0,
            clients_created: 0,
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn advance_to(&mut self, target: MigrationPhase) -> Result<(), MigrationDomainError> {
        if !self.phase.can_transition_to(target) {
            return Err(MigrationDomainError::InvalidPhaseTransition {
                from: self.phase,
                to: target,
            });
        }
        self.phase = target;
        Ok(())
    }

    pub(crate) const fn set_entries_found(&mut self, count: usize) {
        self.time_entries_found = count;
    }

    pub(crate) fn record_outcome(&mut self, entry_id: TimeEntryId, outcome: EntryOutcome) {
        self.time_entries_processed += 1;
        match outcome {
            EntryOutcome::Created | EntryOutcome::WouldCreate => self.time_entries_created += 1,
            EntryOutcome::SkippedExisting => self.time_entries_skipped += 1,
        }
        self.outcomes.push((entry_id, outcome));
    }

    pub(crate) fn record_failure(&mut self, entry_id: TimeEntryId, error: EntryError) {
        self.failures.push(BatchFailure::new(entry_id, error));
    }

    pub(crate) const fn record_created(&mut self, kind: HierarchyKind) {
        match kind {
            HierarchyKind::Client => self.clients_created += 1,
            HierarchyKind::Project => self.projects_created += 1,
            HierarchyKind::Task => self.tasks_created += 1,
        }
    }

    pub(crate) fn finalize(&mut self, clock: &impl Clock) -> Result<(), MigrationDomainError> {
        self.advance_to(MigrationPhase::Finalized)?;
        self.finished_at = Some(clock.utc());
        Ok(())
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn run_id(&self) -> MigrationRunId {
        self.run_id
    }

    /// Returns whether the run was a dry run.
    #[must_use]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> MigrationPhase {
        self.phase
    }

    /// Returns when the run started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the run finished, once finalized.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns the run duration, once finalized.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.finished_at.map(|finished| finished - self.started_at)
    }

    /// Returns how many source entries belonged to the source project.
    #[must_use]
    pub const fn time_entries_found(&self) -> usize {
        self.time_entries_found
    }

    /// Returns how many entries were handled without error.
    #[must_use]
    pub const fn time_entries_processed(&self) -> usize {
        self.time_entries_processed
    }

    /// Returns how many target entries were created, or would have been.
    #[must_use]
    pub const fn time_entries_created(&self) -> usize {
        self.time_entries_created
    }

    /// Returns how many entries were skipped as already present.
    #[must_use]
    pub const fn time_entries_skipped(&self) -> usize {
        self.time_entries_skipped
    }

    /// Returns how many projects were created, or would have been.
    #[must_use]
    pub const fn projects_created(&self) -> usize {
        self.projects_created
    }

    /// Returns how many tasks were created, or would have been.
    #[must_use]
    pub const fn tasks_created(&self) -> usize {
        self.tasks_created
    }

    /// Returns how many clients were created, or would have been.
    #[must_use]
    pub const fn clients_created(&self) -> usize {
        self.clients_created
    }

    /// Returns per-entry outcomes in processing order.
    #[must_use]
    pub fn outcomes(&self) -> &[(TimeEntryId, EntryOutcome)] {
        &self.outcomes
    }

    /// Returns per-entry failures in processing order.
    #[must_use]
    pub fn failures(&self) -> &[BatchFailure<TimeEntryId, EntryError>] {
        &self.failures
    }

    /// Returns the failures as one aggregate error, if there were any.
    #[must_use]
    pub fn errors(&self) -> Option<BatchError<TimeEntryId, EntryError>> {
        BatchError::from_failures(self.failures.clone())
    }

    /// Builds a serializable report of the run.
    #[must_use]
    pub fn summary(&self) -> MigrationSummary {
        MigrationSummary {
            run_id: self.run_id,
            dry_run: self.dry_run,
            phase: self.phase,
            started_at: self.started_at,
            finished_at: self.finished_at,
            duration_ms: self.duration().map(|duration| duration.num_milliseconds()),
            time_entries_found: self.time_entries_found,
            time_entries_processed: self.time_entries_processed,
            time_entries_created: self.time_entries_created,
            time_entries_skipped: self.time_entries_skipped,
            projects_created: self.projects_created,
            tasks_created: self.tasks_created,
            clients_created: self.clients_created,
            errors: self
                .failures
                .iter()
                .map(|failure| format!("Failed to process entry {}: {}", failure.id, failure.cause))
                .collect(),
        }
    }
}

/// Flat, serializable report of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    /// Run identifier.
    pub run_id: MigrationRunId,
    /// Whether mutations were simulated.
    pub dry_run: bool,
    /// Phase at the time of the report.
    pub phase: MigrationPhase,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
    /// Run duration in milliseconds.
    pub duration_ms: Option<i64>,
    /// Source entries in the source project.
    pub time_entries_found: usize,
    /// Entries handled without error.
    pub time_entries_processed: usize,
    /// Target entries created.
    pub time_entries_created: usize,
    /// Entries skipped as already present.
    pub time_entries_skipped: usize,
    /// Projects created.
    pub projects_created: usize,
    /// Tasks created.
    pub tasks_created: usize,
    /// Clients created.
    pub clients_created: usize,
    /// One line per failed entry.
    pub errors: Vec<String>,
}

impl fmt::Display for MigrationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = if self.dry_run {
            "=== MIGRATION COMPLETED (DRY RUN) ==="
        } else {
            "=== MIGRATION COMPLETED ==="
        };
        writeln!(f, "{heading}")?;
        writeln!(f, "Run: {}", self.run_id)?;
        if let Some(duration_ms) = self.duration_ms {
            writeln!(f, "Duration: {duration_ms} ms")?;
        }
        writeln!(f, "Time Entries Found: {}", self.time_entries_found)?;
        writeln!(f, "Time Entries Processed: {}", self.time_entries_processed)?;
        writeln!(f, "Time Entries Created: {}", self.time_entries_created)?;
        writeln!(f, "Time Entries Skipped: {}", self.time_entries_skipped)?;
        writeln!(f, "Projects Created: {}", self.projects_created)?;
        writeln!(f, "Tasks Created: {}", self.tasks_created)?;
        writeln!(f, "Clients Created: {}", self.clients_created)?;
        write!(f, "Errors: {}", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}
