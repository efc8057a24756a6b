//! Migration orchestration service.

use super::hierarchy::{HierarchyResolver, Resolution};
use crate::clockify::{
    domain::{
        NewTimeEntry, Project, ProjectId, Task, TaskId, TimeEntry, TimeRange, User, Workspace,
    },
    ports::{ClockifyApi, ClockifyApiExt},
};
use crate::migration::domain::{
    EntryError, EntryOutcome, HierarchyKind, MigrationConfig, MigrationError, MigrationPhase,
    MigrationRunId, MigrationStats, ProjectTaskMapping,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{Instrument, info, info_span, warn};

/// Result type for migration runs.
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Re-creates the source project's time entries in the target workspace.
#[derive(Clone)]
pub struct MigrationService<A, C>
where
    A: ClockifyApi,
    C: Clock + Send + Sync,
{
    api: Arc<A>,
    clock: Arc<C>,
}

impl<A, C> MigrationService<A, C>
where
    A: ClockifyApi,
    C: Clock + Send + Sync,
{
    /// Creates a new migration service.
    #[must_use]
    pub const fn new(api: Arc<A>, clock: Arc<C>) -> Self {
        Self { api, clock }
    }

    /// Runs one migration.
    ///
    /// Entry-level failures are recorded in the returned statistics and never
    /// abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError`] when the configuration is incomplete, the
    /// user, workspaces or source project cannot be resolved, or the source
    /// entries cannot be fetched.
    pub async fn execute_migration(
        &self,
        config: &MigrationConfig,
    ) -> MigrationResult<MigrationStats> {
        config.validate().map_err(MigrationError::Config)?;
        let run_id = MigrationRunId::new();
        let span = info_span!("migration", run_id = %run_id, dry_run = config.dry_run());
        self.run(run_id, config).instrument(span).await
    }

    async fn run(
        &self,
        run_id: MigrationRunId,
        config: &MigrationConfig,
    ) -> MigrationResult<MigrationStats> {
        info!(
            source_workspace = config.source_workspace_name(),
            source_project = config.source_project_name(),
            target_workspace = config.target_workspace_name(),
            "starting migration"
        );
        let mut stats = MigrationStats::new(run_id, config.dry_run(), &*self.clock);
        let mut run = MigrationRun::initialize(&*self.api, config).await?;

        stats
            .advance_to(MigrationPhase::Fetching)
            .map_err(MigrationError::Internal)?;
        let entries = run.fetch_source_entries().await?;
        stats.set_entries_found(entries.len());
        if config.skip_existing() {
            run.load_target_fingerprints().await?;
        }

        stats
            .advance_to(MigrationPhase::ProcessingBatches)
            .map_err(MigrationError::Internal)?;
        run.process_batches(&entries, &mut stats).await;

        stats
            .finalize(&*self.clock)
            .map_err(MigrationError::Internal)?;
        log_summary(&stats);
        Ok(stats)
    }
}

/// Identity of a time entry for duplicate detection in the target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EntryFingerprint {
    project_id: Option<ProjectId>,
    task_id: Option<TaskId>,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    description: String,
}

impl EntryFingerprint {
    fn of_entry(entry: &TimeEntry) -> Self {
        Self {
            project_id: entry.project_id.clone(),
            task_id: entry.task_id.clone(),
            start: entry.time_interval.start,
            end: entry.time_interval.end,
            description: entry.description.clone(),
        }
    }

    fn of_request(request: &NewTimeEntry) -> Self {
        Self {
            project_id: request.project_id.clone(),
            task_id: request.task_id.clone(),
            start: request.start,
            end: request.end,
            description: request.description.clone(),
        }
    }
}

/// State owned by a single run.
struct MigrationRun<'a, A: ClockifyApi + ?Sized> {
    api: &'a A,
    config: &'a MigrationConfig,
    user: User,
    source_workspace: Workspace,
    source_project: Project,
    target_workspace: Workspace,
    resolver: HierarchyResolver<'a, A>,
    source_tasks: Option<HashMap<TaskId, Task>>,
    target_fingerprints: HashSet<EntryFingerprint>,
}

impl<'a, A: ClockifyApi + ?Sized> MigrationRun<'a, A> {
    async fn initialize(api: &'a A, config: &'a MigrationConfig) -> MigrationResult<Self> {
        let user = api
            .current_user()
            .await
            .map_err(|source| MigrationError::api("get current user", source))?;

        let source_workspace = api
            .find_workspace_by_name(config.source_workspace_name())
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    MigrationError::WorkspaceNotFound(config.source_workspace_name().to_owned())
                } else {
                    MigrationError::api("find source workspace", source)
                }
            })?;

        let source_project = api
            .find_project_by_name(&source_workspace.id, config.source_project_name())
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    MigrationError::ProjectNotFound {
                        workspace: source_workspace.name.clone(),
                        project: config.source_project_name().to_owned(),
                    }
                } else {
                    MigrationError::api("find source project", source)
                }
            })?;

        let target_workspace = api
            .find_workspace_by_name(config.target_workspace_name())
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    MigrationError::TargetWorkspaceMissing(
                        config.target_workspace_name().to_owned(),
                    )
                } else {
                    MigrationError::api("find target workspace", source)
                }
            })?;
        info!(workspace = %target_workspace, "using existing target workspace");

        let mut resolver = HierarchyResolver::new(api, target_workspace.id.clone(), config);
        let cached = resolver
            .seed_clients()
            .await
            .map_err(|source| MigrationError::api("cache target clients", source))?;
        info!(clients = cached, "cached existing clients in target workspace");

        Ok(Self {
            api,
            config,
            user,
            source_workspace,
            source_project,
            target_workspace,
            resolver,
            source_tasks: None,
            target_fingerprints: HashSet::new(),
        })
    }

    async fn fetch_source_entries(&self) -> MigrationResult<Vec<TimeEntry>> {
        let entries = self
            .api
            .project_time_entries(
                &self.source_workspace.id,
                &self.user.id,
                &self.source_project.id,
                TimeRange::unbounded(),
            )
            .await
            .map_err(|source| MigrationError::api("get source time entries", source))?;
        info!(count = entries.len(), "found time entries to migrate");
        Ok(entries)
    }

    async fn load_target_fingerprints(&mut self) -> MigrationResult<()> {
        let existing = self
            .api
            .all_time_entries(
                &self.target_workspace.id,
                &self.user.id,
                TimeRange::unbounded(),
            )
            .await
            .map_err(|source| MigrationError::api("list target time entries", source))?;
        self.target_fingerprints = existing.iter().map(EntryFingerprint::of_entry).collect();
        info!(
            count = self.target_fingerprints.len(),
            "loaded existing target time entries"
        );
        Ok(())
    }

    async fn process_batches(&mut self, entries: &[TimeEntry], stats: &mut MigrationStats) {
        let batch_size = self.config.batch_size().get();
        let total = entries.len();
        for (index, batch) in entries.chunks(batch_size).enumerate() {
            let first = index * batch_size + 1;
            let last = first + batch.len() - 1;
            info!(first, last, total, "processing batch");

            for entry in batch {
                match self.process_entry(entry, stats).await {
                    Ok(outcome) => stats.record_outcome(entry.id.clone(), outcome),
                    Err(error) => {
                        warn!(entry_id = %entry.id, error = %error, "error processing time entry");
                        stats.record_failure(entry.id.clone(), error);
                    }
                }
            }
        }
    }

    async fn process_entry(
        &mut self,
        entry: &TimeEntry,
        stats: &mut MigrationStats,
    ) -> Result<EntryOutcome, EntryError> {
        let task_id = entry
            .task_id
            .as_ref()
            .ok_or(EntryError::MissingTaskReference)?;
        let source_task_name = self.source_task_name(task_id).await?;
        let mapping = ProjectTaskMapping::derive(&source_task_name, self.config)?;

        let client = tally(
            stats,
            HierarchyKind::Client,
            self.resolver.resolve_client(mapping.client_name()).await?,
        );
        let project = tally(
            stats,
            HierarchyKind::Project,
            self.resolver
                .resolve_project(mapping.project_name(), &client)
                .await?,
        );
        let task = tally(
            stats,
            HierarchyKind::Task,
            self.resolver
                .resolve_task(&project, mapping.new_task_name())
                .await?,
        );

        let request = NewTimeEntry::copy_of(entry, project.id, task.id);
        let fingerprint = EntryFingerprint::of_request(&request);
        if self.config.skip_existing() && self.target_fingerprints.contains(&fingerprint) {
            info!(entry_id = %entry.id, "skipping time entry already present in target");
            return Ok(EntryOutcome::SkippedExisting);
        }

        if self.config.dry_run() {
            info!(
                entry = %entry,
                start = %entry.time_interval.start,
                end = ?entry.time_interval.end,
                "DRY RUN: would create time entry"
            );
            return Ok(EntryOutcome::WouldCreate);
        }

        self.api
            .create_time_entry(&self.target_workspace.id, &self.user.id, &request)
            .await
            .map_err(EntryError::CreateTimeEntry)?;
        if self.config.skip_existing() {
            self.target_fingerprints.insert(fingerprint);
        }
        Ok(EntryOutcome::Created)
    }

    /// Returns the name of a source task, loading the source project's tasks
    /// on first use. A failed load is retried on the next call.
    async fn source_task_name(&mut self, task_id: &TaskId) -> Result<String, EntryError> {
        if self.source_tasks.is_none() {
            let tasks = self
                .api
                .all_tasks(&self.source_workspace.id, &self.source_project.id)
                .await
                .map_err(EntryError::SourceTasks)?;
            self.source_tasks = Some(
                tasks
                    .into_iter()
                    .map(|task| (task.id.clone(), task))
                    .collect(),
            );
        }
        self.source_tasks
            .as_ref()
            .and_then(|tasks| tasks.get(task_id))
            .map(|task| task.name.clone())
            .ok_or_else(|| EntryError::SourceTaskNotFound(task_id.clone()))
    }
}

fn tally<T>(stats: &mut MigrationStats, kind: HierarchyKind, resolution: Resolution<T>) -> T {
    if resolution.is_created() {
        stats.record_created(kind);
    }
    resolution.into_inner()
}

fn log_summary(stats: &MigrationStats) {
    let duration_ms = stats.duration().map(|duration| duration.num_milliseconds());
    info!(
        duration_ms,
        found = stats.time_entries_found(),
        processed = stats.time_entries_processed(),
        created = stats.time_entries_created(),
        skipped = stats.time_entries_skipped(),
        projects_created = stats.projects_created(),
        tasks_created = stats.tasks_created(),
        clients_created = stats.clients_created(),
        errors = stats.failures().len(),
        "migration completed"
    );
    for failure in stats.failures() {
        warn!(entry_id = %failure.id, error = %failure.cause, "migration error detail");
    }
}
