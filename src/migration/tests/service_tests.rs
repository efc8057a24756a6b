//! Unit tests for migration orchestration against the in-memory API.

use std::sync::Arc;

use crate::clockify::{
    adapters::{ApiOperation, InMemoryClockifyApi},
    domain::{NewProject, NewTimeEntry, Project, TagId, Task, TimeEntry, User, Workspace},
};
use crate::migration::{
    domain::{
        EntryError, EntryOutcome, MigrationConfig, MigrationDomainError, MigrationError,
        MigrationPhase, MigrationStats,
    },
    services::MigrationService,
};
use chrono::{TimeDelta, TimeZone, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = MigrationService<InMemoryClockifyApi, DefaultClock>;

struct Seeded {
    api: Arc<InMemoryClockifyApi>,
    user: User,
    source: Workspace,
    target: Workspace,
    tickets: Project,
}

impl Seeded {
    fn service(&self) -> TestService {
        MigrationService::new(Arc::clone(&self.api), Arc::new(DefaultClock))
    }

    fn legacy_task(&self, name: &str) -> Task {
        self.api
            .add_task(&self.tickets.id, name)
            .expect("seed source task")
    }

    fn log(&self, task: Option<&Task>, hour: u32, description: &str) -> TimeEntry {
        let start = Utc
            .with_ymd_and_hms(2024, 3, 4, hour, 0, 0)
            .single()
            .expect("valid start");
        let request = NewTimeEntry {
            start,
            end: Some(start + TimeDelta::minutes(45)),
            billable: hour >= 11,
            description: description.to_owned(),
            project_id: Some(self.tickets.id.clone()),
            task_id: task.map(|legacy| legacy.id.clone()),
            tag_ids: vec![TagId::new("tag-review")],
        };
        self.api
            .add_time_entry(&self.source.id, &self.user.id, &request)
            .expect("seed source entry")
    }

    fn target_entries(&self) -> Vec<TimeEntry> {
        self.api
            .time_entries(&self.target.id)
            .expect("list target entries")
    }
}

fn seed_with(api: InMemoryClockifyApi) -> Seeded {
    let user = api.user().expect("current user");
    let source = api.add_workspace("Legacy").expect("seed source workspace");
    let target = api.add_workspace("Clients").expect("seed target workspace");
    let tickets = api
        .add_project(&source.id, &NewProject::new("Tickets"))
        .expect("seed source project");
    Seeded {
        api: Arc::new(api),
        user,
        source,
        target,
        tickets,
    }
}

#[fixture]
fn seeded() -> Seeded {
    seed_with(InMemoryClockifyApi::new())
}

/// Four entries over three legacy tasks in two legacy projects.
fn log_standard_entries(seeded: &Seeded) -> Vec<TimeEntry> {
    let acme_42 = seeded.legacy_task("Acme/TASK42");
    let acme_7 = seeded.legacy_task("Acme/TASK7");
    let globex_1 = seeded.legacy_task("Globex/TASK1");
    vec![
        seeded.log(Some(&acme_42), 9, "triage"),
        seeded.log(Some(&acme_7), 10, "review"),
        seeded.log(Some(&acme_42), 11, "follow-up"),
        seeded.log(Some(&globex_1), 12, "deploy"),
    ]
}

fn config() -> MigrationConfig {
    MigrationConfig::new("Legacy", "Tickets", "Clients").with_create_clients(true)
}

fn counters(stats: &MigrationStats) -> [usize; 7] {
    [
        stats.time_entries_found(),
        stats.time_entries_processed(),
        stats.time_entries_created(),
        stats.time_entries_skipped(),
        stats.projects_created(),
        stats.tasks_created(),
        stats.clients_created(),
    ]
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrates_entries_into_client_project_task_hierarchy(seeded: Seeded) {
    let sources = log_standard_entries(&seeded);

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(counters(&stats), [4, 4, 4, 0, 2, 3, 2]);
    assert!(stats.failures().is_empty());
    assert!(stats.errors().is_none());
    assert_eq!(stats.phase(), MigrationPhase::Finalized);
    assert!(stats.finished_at().is_some());

    let clients = seeded.api.clients(&seeded.target.id).expect("clients");
    let mut client_names: Vec<_> = clients.iter().map(|client| client.name.as_str()).collect();
    client_names.sort_unstable();
    assert_eq!(client_names, vec!["Acme Client", "Globex Client"]);

    let projects = seeded.api.projects(&seeded.target.id).expect("projects");
    let acme = projects
        .iter()
        .find(|project| project.name == "Acme")
        .expect("Acme project created");
    assert_eq!(acme.client_name.as_deref(), Some("Acme Client"));
    let acme_tasks: Vec<_> = seeded
        .api
        .tasks(&acme.id)
        .expect("tasks")
        .into_iter()
        .map(|task| task.name)
        .collect();
    assert_eq!(acme_tasks, vec!["TASK 42", "TASK 7"]);

    let created = seeded.target_entries();
    assert_eq!(created.len(), 4);
    for (source, copy) in sources.iter().zip(&created) {
        assert_eq!(copy.description, source.description);
        assert_eq!(copy.time_interval.start, source.time_interval.start);
        assert_eq!(copy.time_interval.end, source.time_interval.end);
        assert_eq!(copy.billable, source.billable);
        assert_eq!(copy.tag_ids, source.tag_ids);
        assert_eq!(copy.user_id, seeded.user.id);
    }
    assert!(
        created
            .iter()
            .take(3)
            .all(|entry| entry.project_id.as_ref() == Some(&acme.id))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outcomes_follow_source_order_across_batches(seeded: Seeded) {
    let sources = log_standard_entries(&seeded);

    let stats = seeded
        .service()
        .execute_migration(&config().with_batch_size(3))
        .await
        .expect("migration succeeds");

    let order: Vec<_> = stats.outcomes().iter().map(|(id, _)| id.clone()).collect();
    let expected: Vec<_> = sources.iter().map(|entry| entry.id.clone()).collect();
    assert_eq!(order, expected);
    assert!(
        stats
            .outcomes()
            .iter()
            .all(|(_, outcome)| *outcome == EntryOutcome::Created)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entries_of_other_projects_are_not_migrated(seeded: Seeded) {
    log_standard_entries(&seeded);
    let other = seeded
        .api
        .add_project(&seeded.source.id, &NewProject::new("Internal"))
        .expect("seed other project");
    let request = NewTimeEntry {
        start: Utc::now(),
        end: None,
        billable: false,
        description: "standup".to_owned(),
        project_id: Some(other.id),
        task_id: None,
        tag_ids: Vec::new(),
    };
    seeded
        .api
        .add_time_entry(&seeded.source.id, &seeded.user.id, &request)
        .expect("seed unrelated entry");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(stats.time_entries_found(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dry_run_makes_no_mutations_but_counts_like_live_run() {
    let dry = seed_with(InMemoryClockifyApi::new());
    log_standard_entries(&dry);
    let live = seed_with(InMemoryClockifyApi::new());
    log_standard_entries(&live);

    let dry_stats = dry
        .service()
        .execute_migration(&config().with_dry_run(true))
        .await
        .expect("dry run succeeds");
    let live_stats = live
        .service()
        .execute_migration(&config())
        .await
        .expect("live run succeeds");

    assert_eq!(dry.api.mutation_count().expect("journal"), 0);
    assert!(dry.target_entries().is_empty());
    assert_eq!(counters(&dry_stats), counters(&live_stats));
    assert!(dry_stats.dry_run());
    assert!(
        dry_stats
            .outcomes()
            .iter()
            .all(|(_, outcome)| *outcome == EntryOutcome::WouldCreate)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_unparsable_task_name_does_not_abort_the_run(seeded: Seeded) {
    log_standard_entries(&seeded);
    let broken = seeded.legacy_task("Acme TASK 99");
    let misfiled = seeded.log(Some(&broken), 13, "misfiled");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(stats.time_entries_found(), 5);
    assert_eq!(stats.time_entries_processed(), 4);
    assert_eq!(stats.time_entries_created(), 4);
    let failures = stats.failures();
    assert_eq!(failures.len(), 1);
    let failure = failures.first().expect("one failure");
    assert_eq!(failure.id, misfiled.id);
    assert!(matches!(
        &failure.cause,
        EntryError::Parse(MigrationDomainError::FormatMismatch(name)) if name == "Acme TASK 99"
    ));
    assert_eq!(seeded.target_entries().len(), 4);
    assert_eq!(stats.summary().errors.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn entry_without_task_is_recorded_as_failure(seeded: Seeded) {
    let entry = seeded.log(None, 9, "untracked");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    let errors = stats.errors().expect("one failure");
    assert_eq!(errors.ids().collect::<Vec<_>>(), vec![&entry.id]);
    assert!(matches!(
        errors.failures().first().map(|failure| &failure.cause),
        Some(EntryError::MissingTaskReference)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_entry_creation_is_isolated(seeded: Seeded) {
    log_standard_entries(&seeded);
    seeded
        .api
        .fail_on_subject(ApiOperation::CreateTimeEntry, "review")
        .expect("inject failure");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(stats.time_entries_processed(), 3);
    assert_eq!(stats.tasks_created(), 3);
    assert!(matches!(
        stats.failures().first().map(|failure| &failure.cause),
        Some(EntryError::CreateTimeEntry(_))
    ));
    let descriptions: Vec<_> = seeded
        .target_entries()
        .into_iter()
        .map(|entry| entry.description)
        .collect();
    assert_eq!(descriptions, vec!["triage", "follow-up", "deploy"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_source_task_load_is_retried_per_entry(seeded: Seeded) {
    log_standard_entries(&seeded);
    seeded
        .api
        .fail_on_subject(ApiOperation::ListTasks, seeded.tickets.id.as_str())
        .expect("inject failure");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(stats.failures().len(), 4);
    assert!(
        stats
            .failures()
            .iter()
            .all(|failure| matches!(failure.cause, EntryError::SourceTasks(_)))
    );
    assert_eq!(
        seeded
            .api
            .call_count(ApiOperation::ListTasks)
            .expect("journal"),
        4
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn existing_default_client_is_used_when_creation_disabled(seeded: Seeded) {
    log_standard_entries(&seeded);
    let default_client = seeded
        .api
        .add_client(&seeded.target.id, "Default Client")
        .expect("seed default client");
    let config = MigrationConfig::new("Legacy", "Tickets", "Clients");

    let stats = seeded
        .service()
        .execute_migration(&config)
        .await
        .expect("migration succeeds");

    assert_eq!(stats.clients_created(), 0);
    assert_eq!(stats.time_entries_created(), 4);
    let projects = seeded.api.projects(&seeded.target.id).expect("projects");
    assert!(
        projects
            .iter()
            .all(|project| project.client_id.as_ref() == Some(&default_client.id))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_client_fails_each_entry_when_creation_disabled(seeded: Seeded) {
    log_standard_entries(&seeded);
    let config = MigrationConfig::new("Legacy", "Tickets", "Clients");

    let stats = seeded
        .service()
        .execute_migration(&config)
        .await
        .expect("run still succeeds");

    assert_eq!(stats.time_entries_processed(), 0);
    assert!(
        stats
            .failures()
            .iter()
            .all(|failure| matches!(failure.cause, EntryError::ClientCreationDisabled(_)))
    );
    assert_eq!(seeded.api.mutation_count().expect("journal"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn existing_target_project_is_reused(seeded: Seeded) {
    log_standard_entries(&seeded);
    let existing = seeded
        .api
        .add_project(&seeded.target.id, &NewProject::new("Acme"))
        .expect("seed target project");

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(stats.projects_created(), 1);
    assert_eq!(
        seeded
            .api
            .call_count(ApiOperation::CreateProject)
            .expect("journal"),
        1
    );
    let into_acme = seeded
        .target_entries()
        .into_iter()
        .filter(|entry| entry.project_id.as_ref() == Some(&existing.id))
        .count();
    assert_eq!(into_acme, 3);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_run_with_skip_existing_creates_nothing(seeded: Seeded) {
    log_standard_entries(&seeded);
    let config = config().with_skip_existing(true);
    let service = seeded.service();
    service
        .execute_migration(&config)
        .await
        .expect("first run succeeds");

    let rerun = service
        .execute_migration(&config)
        .await
        .expect("second run succeeds");

    assert_eq!(counters(&rerun), [4, 4, 0, 4, 0, 0, 0]);
    assert!(
        rerun
            .outcomes()
            .iter()
            .all(|(_, outcome)| *outcome == EntryOutcome::SkippedExisting)
    );
    assert_eq!(seeded.target_entries().len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn paging_is_followed_to_the_last_page() {
    let seeded = seed_with(InMemoryClockifyApi::new().with_page_size(2));
    log_standard_entries(&seeded);
    for index in 0..3 {
        seeded
            .api
            .add_client(&seeded.target.id, &format!("Existing {index}"))
            .expect("seed client");
    }

    let stats = seeded
        .service()
        .execute_migration(&config())
        .await
        .expect("migration succeeds");

    assert_eq!(counters(&stats), [4, 4, 4, 0, 2, 3, 2]);
}

#[rstest]
#[case::source_workspace(MigrationConfig::new("Nowhere", "Tickets", "Clients"))]
#[case::source_project(MigrationConfig::new("Legacy", "Nothing", "Clients"))]
#[case::target_workspace(MigrationConfig::new("Legacy", "Tickets", "Elsewhere"))]
#[tokio::test(flavor = "multi_thread")]
async fn unresolvable_names_abort_before_processing(
    seeded: Seeded,
    #[case] config: MigrationConfig,
) {
    log_standard_entries(&seeded);

    let result = seeded.service().execute_migration(&config).await;

    match result {
        Err(MigrationError::WorkspaceNotFound(name)) => assert_eq!(name, "Nowhere"),
        Err(MigrationError::ProjectNotFound { project, .. }) => assert_eq!(project, "Nothing"),
        Err(MigrationError::TargetWorkspaceMissing(name)) => assert_eq!(name, "Elsewhere"),
        other => panic!("expected a run-fatal lookup error, got {other:?}"),
    }
    assert_eq!(seeded.api.mutation_count().expect("journal"), 0);
    assert_eq!(
        seeded
            .api
            .call_count(ApiOperation::ListTimeEntries)
            .expect("journal"),
        0
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failing_entry_fetch_is_fatal(seeded: Seeded) {
    log_standard_entries(&seeded);
    seeded
        .api
        .fail_on(ApiOperation::ListTimeEntries)
        .expect("inject failure");

    let result = seeded.service().execute_migration(&config()).await;

    assert!(matches!(result, Err(MigrationError::Api { .. })));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_configuration_is_rejected(seeded: Seeded) {
    let result = seeded
        .service()
        .execute_migration(&MigrationConfig::new("Legacy", "", "Clients"))
        .await;

    assert!(matches!(result, Err(MigrationError::Config(_))));
    assert!(seeded.api.journal().expect("journal").is_empty());
}
