//! End-to-end migration runs against the in-memory Clockify API.
#![expect(
    clippy::panic_in_result_fn,
    reason = "Tests use assertions for verification while returning Result for error propagation"
)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use clocksync::clockify::{
    adapters::InMemoryClockifyApi,
    domain::{NewProject, NewTimeEntry, Project, TagId, User, Workspace},
};
use clocksync::migration::{
    domain::{MigrationConfig, MigrationPhase},
    services::MigrationService,
};
use eyre::Result;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

struct Accounts {
    api: Arc<InMemoryClockifyApi>,
    user: User,
    source: Workspace,
    target: Workspace,
    tickets: Project,
}

impl Accounts {
    fn log(&self, task_name: &str, start: DateTime<Utc>, description: &str) -> Result<()> {
        let task = self.api.add_task(&self.tickets.id, task_name)?;
        let request = NewTimeEntry {
            start,
            end: Some(start + TimeDelta::hours(1)),
            billable: true,
            description: description.to_owned(),
            project_id: Some(self.tickets.id.clone()),
            task_id: Some(task.id),
            tag_ids: vec![TagId::new("tag-onsite")],
        };
        self.api
            .add_time_entry(&self.source.id, &self.user.id, &request)?;
        Ok(())
    }
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn accounts() -> Accounts {
    let api = InMemoryClockifyApi::new();
    let user = api.user().expect("current user");
    let source = api.add_workspace("Legacy").expect("source workspace");
    let target = api.add_workspace("Clients").expect("target workspace");
    let tickets = api
        .add_project(&source.id, &NewProject::new("Tickets"))
        .expect("source project");
    let seeded = Accounts {
        api: Arc::new(api),
        user,
        source,
        target,
        tickets,
    };
    seeded
        .log("Acme/TASK42", at(6, 9), "site survey")
        .expect("seed entry");
    seeded
        .log("Acme/TASK42", at(7, 9), "follow-up")
        .expect("seed entry");
    seeded
        .log("Globex/TASK7", at(8, 14), "kickoff")
        .expect("seed entry");
    seeded
}

fn config() -> MigrationConfig {
    MigrationConfig::new("Legacy", "Tickets", "Clients")
        .with_client_mapping("Acme", "Acme Holdings")
        .with_create_clients(true)
        .with_skip_existing(true)
}

fn service(accounts: &Accounts) -> MigrationService<InMemoryClockifyApi, DefaultClock> {
    MigrationService::new(Arc::clone(&accounts.api), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migration_builds_client_project_task_hierarchy(accounts: Accounts) -> Result<()> {
    let stats = service(&accounts).execute_migration(&config()).await?;

    assert_eq!(stats.phase(), MigrationPhase::Finalized);
    assert_eq!(stats.time_entries_created(), 3);
    assert!(stats.errors().is_none());

    let mut clients: Vec<_> = accounts
        .api
        .clients(&accounts.target.id)?
        .into_iter()
        .map(|client| client.name)
        .collect();
    clients.sort();
    assert_eq!(clients, ["Acme Holdings", "Globex Client"]);

    let projects = accounts.api.projects(&accounts.target.id)?;
    let acme = projects
        .iter()
        .find(|project| project.name == "Acme")
        .expect("Acme project exists");
    let holdings = accounts
        .api
        .clients(&accounts.target.id)?
        .into_iter()
        .find(|client| client.name == "Acme Holdings")
        .expect("mapped client exists");
    assert_eq!(acme.client_id, Some(holdings.id));

    let acme_tasks: Vec<_> = accounts
        .api
        .tasks(&acme.id)?
        .into_iter()
        .map(|task| task.name)
        .collect();
    assert_eq!(acme_tasks, ["TASK 42"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn migrated_entries_keep_their_attributes(accounts: Accounts) -> Result<()> {
    service(&accounts).execute_migration(&config()).await?;

    let migrated = accounts.api.time_entries(&accounts.target.id)?;
    let kickoff = migrated
        .iter()
        .find(|entry| entry.description == "kickoff")
        .expect("kickoff entry migrated");

    assert_eq!(migrated.len(), 3);
    assert_eq!(kickoff.time_interval.start, at(8, 14));
    assert_eq!(kickoff.time_interval.end, Some(at(8, 15)));
    assert!(kickoff.billable);
    assert_eq!(kickoff.tag_ids, vec![TagId::new("tag-onsite")]);
    assert!(kickoff.task_id.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rerun_with_skip_existing_creates_nothing(accounts: Accounts) -> Result<()> {
    let migration = service(&accounts);
    migration.execute_migration(&config()).await?;
    let before = accounts.api.mutation_count()?;

    let second = migration.execute_migration(&config()).await?;

    assert_eq!(second.time_entries_found(), 3);
    assert_eq!(second.time_entries_skipped(), 3);
    assert_eq!(second.time_entries_created(), 0);
    assert_eq!(accounts.api.mutation_count()?, before);
    assert_eq!(accounts.api.time_entries(&accounts.target.id)?.len(), 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dry_run_previews_the_live_run(accounts: Accounts) -> Result<()> {
    let migration = service(&accounts);

    let preview = migration
        .execute_migration(&config().with_dry_run(true))
        .await?;
    assert_eq!(accounts.api.mutation_count()?, 0);
    let live = migration.execute_migration(&config()).await?;

    let planned = preview.summary();
    let applied = live.summary();
    assert!(planned.dry_run);
    assert_eq!(planned.time_entries_created, applied.time_entries_created);
    assert_eq!(planned.projects_created, applied.projects_created);
    assert_eq!(planned.tasks_created, applied.tasks_created);
    assert_eq!(planned.clients_created, applied.clients_created);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn summary_serializes_in_camel_case(accounts: Accounts) -> Result<()> {
    let stats = service(&accounts).execute_migration(&config()).await?;

    let json = serde_json::to_value(stats.summary())?;

    assert_eq!(json["timeEntriesFound"], 3);
    assert_eq!(json["timeEntriesCreated"], 3);
    assert_eq!(json["clientsCreated"], 2);
    assert_eq!(json["projectsCreated"], 2);
    assert_eq!(json["tasksCreated"], 2);
    assert_eq!(json["dryRun"], false);
    assert!(json["errors"].as_array().is_some_and(Vec::is_empty));
    Ok(())
}
