//! Get-or-create resolution of the client, project and task hierarchy.
//!
//! Every level follows the same protocol: cache, then a paged remote search
//! by exact name, then creation (or a dry-run sentinel). Whatever is found
//! or made is cached at once, so a name is searched for and created at most
//! once per run.

use crate::clockify::{
    domain::{Client, NewProject, Project, ProjectId, Task, WorkspaceId},
    ports::{ClockifyApi, ClockifyApiError, ClockifyApiExt, ClockifyApiResult},
};
use crate::migration::domain::{EntryError, HierarchyKind, MigrationConfig};
use std::collections::HashMap;
use tracing::{debug, info};

/// How a hierarchy entity was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Served from the run cache.
    Cached(T),
    /// Found by a remote search.
    Found(T),
    /// Created remotely.
    Created(T),
    /// Dry run: a sentinel stands in for an entity that would be created.
    Simulated(T),
}

impl<T> Resolution<T> {
    /// Returns whether the entity was created or would have been.
    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_) | Self::Simulated(_))
    }

    /// Returns the resolved entity.
    #[must_use]
    pub const fn value(&self) -> &T {
        match self {
            Self::Cached(value)
            | Self::Found(value)
            | Self::Created(value)
            | Self::Simulated(value) => value,
        }
    }

    /// Consumes the resolution and returns the entity.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Cached(value)
            | Self::Found(value)
            | Self::Created(value)
            | Self::Simulated(value) => value,
        }
    }
}

/// Scope of a cached task.
///
/// Dry-run sentinel projects all share one identifier, so their tasks are
/// scoped by project name instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TaskScope {
    Project(ProjectId),
    SimulatedProject(String),
}

impl TaskScope {
    fn of(project: &Project) -> Self {
        if project.id.is_dry_run() {
            Self::SimulatedProject(project.name.clone())
        } else {
            Self::Project(project.id.clone())
        }
    }
}

/// Per-run cache of resolved hierarchy entities.
#[derive(Debug, Default)]
pub struct HierarchyCache {
    clients: HashMap<String, Client>,
    projects: HashMap<String, Project>,
    tasks: HashMap<(TaskScope, String), Task>,
}

impl HierarchyCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached client with `name`.
    #[must_use]
    pub fn client(&self, name: &str) -> Option<&Client> {
        self.clients.get(name)
    }

    /// Returns the cached project with `name`.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.get(name)
    }

    /// Returns the cached task with `name` in `project`.
    #[must_use]
    pub fn task(&self, project: &Project, name: &str) -> Option<&Task> {
        self.tasks.get(&(TaskScope::of(project), name.to_owned()))
    }

    /// Returns the number of cached clients.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Returns the number of cached projects.
    #[must_use]
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Returns the number of cached tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    fn insert_client(&mut self, client: Client) {
        self.clients.insert(client.name.clone(), client);
    }

    fn insert_project(&mut self, project: Project) {
        self.projects.insert(project.name.clone(), project);
    }

    fn insert_task(&mut self, project: &Project, task: Task) {
        self.tasks
            .insert((TaskScope::of(project), task.name.clone()), task);
    }
}

/// Resolves hierarchy entities in the target workspace for one run.
pub struct HierarchyResolver<'a, A: ClockifyApi + ?Sized> {
    api: &'a A,
    workspace_id: WorkspaceId,
    dry_run: bool,
    create_clients: bool,
    cache: HierarchyCache,
}

impl<'a, A: ClockifyApi + ?Sized> HierarchyResolver<'a, A> {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new(api: &'a A, workspace_id: WorkspaceId, config: &MigrationConfig) -> Self {
        Self {
            api,
            workspace_id,
            dry_run: config.dry_run(),
            create_clients: config.create_clients(),
            cache: HierarchyCache::new(),
        }
    }

    /// Returns the run cache.
    #[must_use]
    pub const fn cache(&self) -> &HierarchyCache {
        &self.cache
    }

    /// Loads every existing client of the target workspace into the cache
    /// and returns how many are cached.
    ///
    /// # Errors
    ///
    /// Returns the API error when the client listing fails.
    pub async fn seed_clients(&mut self) -> ClockifyApiResult<usize> {
        for client in self.api.all_clients(&self.workspace_id).await? {
            self.cache.insert_client(client);
        }
        Ok(self.cache.client_count())
    }

    /// Resolves the client called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ClientCreationDisabled`] when the client does
    /// not exist and client creation is off, or [`EntryError::Resolve`] when
    /// the search or creation fails.
    pub async fn resolve_client(&mut self, name: &str) -> Result<Resolution<Client>, EntryError> {
        if let Some(cached) = self.cache.client(name) {
            return Ok(Resolution::Cached(cached.clone()));
        }

        let found = self
            .api
            .find_client_named(&self.workspace_id, name)
            .await
            .map_err(|source| resolve_error(HierarchyKind::Client, name, source))?;
        if let Some(client) = found {
            debug!(client = name, "found existing client");
            self.cache.insert_client(client.clone());
            return Ok(Resolution::Found(client));
        }

        if !self.create_clients {
            return Err(EntryError::ClientCreationDisabled(name.to_owned()));
        }

        if self.dry_run {
            info!(client = name, "DRY RUN: would create client");
            let sentinel = Client::dry_run(name);
            self.cache.insert_client(sentinel.clone());
            return Ok(Resolution::Simulated(sentinel));
        }

        let created = self
            .api
            .create_client(&self.workspace_id, name)
            .await
            .map_err(|source| resolve_error(HierarchyKind::Client, name, source))?;
        info!(client = name, client_id = %created.id, "created client");
        self.cache.insert_client(created.clone());
        Ok(Resolution::Created(created))
    }

    /// Resolves the project called `name`, owned by `client` when created.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Resolve`] when the search or creation fails.
    pub async fn resolve_project(
        &mut self,
        name: &str,
        client: &Client,
    ) -> Result<Resolution<Project>, EntryError> {
        if let Some(cached) = self.cache.project(name) {
            return Ok(Resolution::Cached(cached.clone()));
        }

        let found = self
            .api
            .find_project_named(&self.workspace_id, name)
            .await
            .map_err(|source| resolve_error(HierarchyKind::Project, name, source))?;
        if let Some(project) = found {
            debug!(project = name, "found existing project");
            self.cache.insert_project(project.clone());
            return Ok(Resolution::Found(project));
        }

        let client_id = (!client.id.is_dry_run()).then(|| client.id.clone());

        if self.dry_run {
            info!(project = name, client = %client.name, "DRY RUN: would create project");
            let sentinel = Project::dry_run(name, client_id);
            self.cache.insert_project(sentinel.clone());
            return Ok(Resolution::Simulated(sentinel));
        }

        let request = client_id.map_or_else(
            || NewProject::new(name),
            |id| NewProject::new(name).with_client(id),
        );
        let created = self
            .api
            .create_project(&self.workspace_id, &request)
            .await
            .map_err(|source| resolve_error(HierarchyKind::Project, name, source))?;
        info!(project = name, project_id = %created.id, client = %client.name, "created project");
        self.cache.insert_project(created.clone());
        Ok(Resolution::Created(created))
    }

    /// Resolves the task called `name` in `project`.
    ///
    /// Tasks of a dry-run sentinel project are never searched remotely.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::Resolve`] when the search or creation fails.
    pub async fn resolve_task(
        &mut self,
        project: &Project,
        name: &str,
    ) -> Result<Resolution<Task>, EntryError> {
        if let Some(cached) = self.cache.task(project, name) {
            return Ok(Resolution::Cached(cached.clone()));
        }

        if !project.id.is_dry_run() {
            let found = self
                .api
                .find_task_named(&self.workspace_id, &project.id, name)
                .await
                .map_err(|source| resolve_error(HierarchyKind::Task, name, source))?;
            if let Some(task) = found {
                debug!(task = name, project = %project.name, "found existing task");
                self.cache.insert_task(project, task.clone());
                return Ok(Resolution::Found(task));
            }
        }

        if self.dry_run {
            info!(task = name, project = %project.name, "DRY RUN: would create task");
            let sentinel = Task::dry_run(name, project.id.clone());
            self.cache.insert_task(project, sentinel.clone());
            return Ok(Resolution::Simulated(sentinel));
        }

        let created = self
            .api
            .create_task(&self.workspace_id, &project.id, name)
            .await
            .map_err(|source| resolve_error(HierarchyKind::Task, name, source))?;
        info!(task = name, project = %project.name, task_id = %created.id, "created task");
        self.cache.insert_task(project, created.clone());
        Ok(Resolution::Created(created))
    }
}

fn resolve_error(
    kind: HierarchyKind,
    name: &str,
    source: ClockifyApiError,
) -> EntryError {
    EntryError::Resolve {
        kind,
        name: name.to_owned(),
        source,
    }
}
