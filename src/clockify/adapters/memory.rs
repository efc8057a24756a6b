//! In-memory Clockify fake for tests.
//!
//! The fake pages its listings, records every call in a journal and can be
//! told to fail selected operations, which is enough to exercise the
//! migration and webhook services without a network.

use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use crate::clockify::{
    domain::{
        Client, ClientId, NewProject, NewTimeEntry, NewWebhook, Project, ProjectId, Task, TaskId,
        TimeEntry, TimeEntryId, TimeInterval, TimeRange, User, UserId, Webhook, WebhookId,
        Workspace, WorkspaceId,
    },
    ports::{ClockifyApi, ClockifyApiError, ClockifyApiResult, Page},
};

/// Longest webhook name the service accepts.
const WEBHOOK_NAME_LIMIT: usize = 30;

/// Kind of call made against the fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    /// `current_user`.
    CurrentUser,
    /// `list_workspaces`.
    ListWorkspaces,
    /// `list_clients`.
    ListClients,
    /// `list_projects`.
    ListProjects,
    /// `list_tasks`.
    ListTasks,
    /// `list_time_entries`.
    ListTimeEntries,
    /// `create_client`.
    CreateClient,
    /// `create_project`.
    CreateProject,
    /// `create_task`.
    CreateTask,
    /// `create_time_entry`.
    CreateTimeEntry,
    /// `create_webhook`.
    CreateWebhook,
    /// `delete_webhook`.
    DeleteWebhook,
}

impl ApiOperation {
    /// Returns the port method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "current_user",
            Self::ListWorkspaces => "list_workspaces",
            Self::ListClients => "list_clients",
            Self::ListProjects => "list_projects",
            Self::ListTasks => "list_tasks",
            Self::ListTimeEntries => "list_time_entries",
            Self::CreateClient => "create_client",
            Self::CreateProject => "create_project",
            Self::CreateTask => "create_task",
            Self::CreateTimeEntry => "create_time_entry",
            Self::CreateWebhook => "create_webhook",
            Self::DeleteWebhook => "delete_webhook",
        }
    }

    /// Returns whether the operation changes remote state.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreateClient
                | Self::CreateProject
                | Self::CreateTask
                | Self::CreateTimeEntry
                | Self::CreateWebhook
                | Self::DeleteWebhook
        )
    }
}

/// One journaled call.
///
/// `subject` is the entity name for client, project and task creation, the
/// description for time entries, the event for webhook creation, the
/// webhook id for deletion and the scoping id for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    /// Operation invoked.
    pub operation: ApiOperation,
    /// Operation-specific subject.
    pub subject: String,
}

#[derive(Debug, Clone)]
struct FailureRule {
    operation: ApiOperation,
    subject: Option<String>,
}

impl FailureRule {
    fn matches(&self, call: &ApiCall) -> bool {
        self.operation == call.operation
            && self
                .subject
                .as_ref()
                .is_none_or(|subject| *subject == call.subject)
    }
}

#[derive(Debug)]
struct InMemoryState {
    user: User,
    page_size: usize,
    next_id: u64,
    workspaces: Vec<Workspace>,
    clients: Vec<Client>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    time_entries: Vec<TimeEntry>,
    webhooks: Vec<Webhook>,
    journal: Vec<ApiCall>,
    failures: Vec<FailureRule>,
}

impl Default for InMemoryState {
    fn default() -> Self {
        Self {
            user: User {
                id: UserId::new("user-1"),
                email: "migrator@example.com".to_owned(),
                name: "Migration User".to_owned(),
                active_workspace: None,
                default_workspace: None,
            },
            page_size: InMemoryClockifyApi::DEFAULT_PAGE_SIZE,
            next_id: 1,
            workspaces: Vec::new(),
            clients: Vec::new(),
            projects: Vec::new(),
            tasks: Vec::new(),
            time_entries: Vec::new(),
            webhooks: Vec::new(),
            journal: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl InMemoryState {
    fn allocate(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Journals a call and applies any matching failure rule.
    fn record(&mut self, operation: ApiOperation, subject: &str) -> ClockifyApiResult<()> {
        let call = ApiCall {
            operation,
            subject: subject.to_owned(),
        };
        let injected = self.failures.iter().any(|rule| rule.matches(&call));
        self.journal.push(call);
        if injected {
            return Err(ClockifyApiError::Status {
                status: 500,
                endpoint: operation.as_str().to_owned(),
                body: format!("injected failure for '{subject}'"),
            });
        }
        Ok(())
    }

    fn page<'a, T, I>(&self, items: I, page: Page) -> Vec<T>
    where
        T: Clone + 'a,
        I: Iterator<Item = &'a T>,
    {
        let index = usize::try_from(page.number().saturating_sub(1)).unwrap_or(usize::MAX);
        items
            .skip(index.saturating_mul(self.page_size))
            .take(self.page_size)
            .cloned()
            .collect()
    }

    fn insert_client(&mut self, workspace_id: &WorkspaceId, name: &str) -> Client {
        let client = Client {
            id: ClientId::new(self.allocate("client")),
            name: name.to_owned(),
            workspace_id: Some(workspace_id.clone()),
            archived: false,
            note: None,
        };
        self.clients.push(client.clone());
        client
    }

    fn insert_project(&mut self, workspace_id: &WorkspaceId, request: &NewProject) -> Project {
        let client_name = request.client_id.as_ref().and_then(|client_id| {
            self.clients
                .iter()
                .find(|client| client.id == *client_id)
                .map(|client| client.name.clone())
        });
        let project = Project {
            id: ProjectId::new(self.allocate("project")),
            name: request.name.clone(),
            client_id: request.client_id.clone(),
            client_name,
            workspace_id: Some(workspace_id.clone()),
            billable: request.billable,
            public: request.public,
            archived: false,
            color: None,
            note: None,
        };
        self.projects.push(project.clone());
        project
    }

    fn insert_task(&mut self, project_id: &ProjectId, name: &str) -> Task {
        let task = Task {
            id: TaskId::new(self.allocate("task")),
            name: name.to_owned(),
            project_id: project_id.clone(),
            status: Some("ACTIVE".to_owned()),
            estimate: None,
        };
        self.tasks.push(task.clone());
        task
    }

    fn insert_time_entry(
        &mut self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        request: &NewTimeEntry,
    ) -> TimeEntry {
        let entry = TimeEntry {
            id: TimeEntryId::new(self.allocate("entry")),
            description: request.description.clone(),
            tag_ids: request.tag_ids.clone(),
            user_id: user_id.clone(),
            billable: request.billable,
            task_id: request.task_id.clone(),
            project_id: request.project_id.clone(),
            time_interval: TimeInterval {
                start: request.start,
                end: request.end,
                duration: None,
            },
            workspace_id: workspace_id.clone(),
            is_locked: false,
        };
        self.time_entries.push(entry.clone());
        entry
    }
}

/// Thread-safe in-memory stand-in for the Clockify service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryClockifyApi {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryClockifyApi {
    /// Page size used unless overridden.
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    /// Creates an empty fake with a default current user.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the listing page size. Zero is treated as one.
    #[must_use]
    pub fn with_page_size(self, page_size: usize) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.page_size = page_size.max(1);
        }
        self
    }

    fn write(&self) -> ClockifyApiResult<RwLockWriteGuard<'_, InMemoryState>> {
        self.state
            .write()
            .map_err(|err| ClockifyApiError::transport(std::io::Error::other(err.to_string())))
    }

    fn snapshot<T>(&self, read: impl FnOnce(&InMemoryState) -> T) -> ClockifyApiResult<T> {
        let state = self
            .state
            .read()
            .map_err(|err| ClockifyApiError::transport(std::io::Error::other(err.to_string())))?;
        Ok(read(&state))
    }

    /// Returns the user reported by `current_user`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn user(&self) -> ClockifyApiResult<User> {
        self.snapshot(|state| state.user.clone())
    }

    /// Seeds a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn add_workspace(&self, name: &str) -> ClockifyApiResult<Workspace> {
        let mut state = self.write()?;
        let workspace = Workspace {
            id: WorkspaceId::new(state.allocate("workspace")),
            name: name.to_owned(),
        };
        state.workspaces.push(workspace.clone());
        Ok(workspace)
    }

    /// Seeds a client without journaling a call.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn add_client(&self, workspace_id: &WorkspaceId, name: &str) -> ClockifyApiResult<Client> {
        Ok(self.write()?.insert_client(workspace_id, name))
    }

    /// Seeds a project without journaling a call.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn add_project(
        &self,
        workspace_id: &WorkspaceId,
        project: &NewProject,
    ) -> ClockifyApiResult<Project> {
        Ok(self.write()?.insert_project(workspace_id, project))
    }

    /// Seeds a task without journaling a call.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn add_task(&self, project_id: &ProjectId, name: &str) -> ClockifyApiResult<Task> {
        Ok(self.write()?.insert_task(project_id, name))
    }

    /// Seeds a time entry without journaling a call.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn add_time_entry(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        entry: &NewTimeEntry,
    ) -> ClockifyApiResult<TimeEntry> {
        Ok(self.write()?.insert_time_entry(workspace_id, user_id, entry))
    }

    /// Makes every later call of `operation` fail with a 500 status.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn fail_on(&self, operation: ApiOperation) -> ClockifyApiResult<()> {
        self.write()?.failures.push(FailureRule {
            operation,
            subject: None,
        });
        Ok(())
    }

    /// Makes later calls of `operation` on `subject` fail with a 500 status.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn fail_on_subject(
        &self,
        operation: ApiOperation,
        subject: impl Into<String>,
    ) -> ClockifyApiResult<()> {
        self.write()?.failures.push(FailureRule {
            operation,
            subject: Some(subject.into()),
        });
        Ok(())
    }

    /// Removes every failure rule.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn clear_failures(&self) -> ClockifyApiResult<()> {
        self.write()?.failures.clear();
        Ok(())
    }

    /// Returns every call made through the port, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn journal(&self) -> ClockifyApiResult<Vec<ApiCall>> {
        self.snapshot(|state| state.journal.clone())
    }

    /// Counts journaled calls that change remote state.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn mutation_count(&self) -> ClockifyApiResult<usize> {
        self.snapshot(|state| {
            state
                .journal
                .iter()
                .filter(|call| call.operation.is_mutation())
                .count()
        })
    }

    /// Counts journaled calls of one operation.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn call_count(&self, operation: ApiOperation) -> ClockifyApiResult<usize> {
        self.snapshot(|state| {
            state
                .journal
                .iter()
                .filter(|call| call.operation == operation)
                .count()
        })
    }

    /// Returns the clients stored in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn clients(&self, workspace_id: &WorkspaceId) -> ClockifyApiResult<Vec<Client>> {
        self.snapshot(|state| {
            state
                .clients
                .iter()
                .filter(|client| client.workspace_id.as_ref() == Some(workspace_id))
                .cloned()
                .collect()
        })
    }

    /// Returns the projects stored in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn projects(&self, workspace_id: &WorkspaceId) -> ClockifyApiResult<Vec<Project>> {
        self.snapshot(|state| {
            state
                .projects
                .iter()
                .filter(|project| project.workspace_id.as_ref() == Some(workspace_id))
                .cloned()
                .collect()
        })
    }

    /// Returns the tasks stored in a project.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn tasks(&self, project_id: &ProjectId) -> ClockifyApiResult<Vec<Task>> {
        self.snapshot(|state| {
            state
                .tasks
                .iter()
                .filter(|task| task.project_id == *project_id)
                .cloned()
                .collect()
        })
    }

    /// Returns the time entries stored in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn time_entries(&self, workspace_id: &WorkspaceId) -> ClockifyApiResult<Vec<TimeEntry>> {
        self.snapshot(|state| {
            state
                .time_entries
                .iter()
                .filter(|entry| entry.workspace_id == *workspace_id)
                .cloned()
                .collect()
        })
    }

    /// Returns the webhooks registered in a workspace.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the state lock is poisoned.
    pub fn webhooks(&self, workspace_id: &WorkspaceId) -> ClockifyApiResult<Vec<Webhook>> {
        self.snapshot(|state| {
            state
                .webhooks
                .iter()
                .filter(|webhook| webhook.workspace_id.as_ref() == Some(workspace_id))
                .cloned()
                .collect()
        })
    }
}

#[async_trait]
impl ClockifyApi for InMemoryClockifyApi {
    async fn current_user(&self) -> ClockifyApiResult<User> {
        let mut state = self.write()?;
        state.record(ApiOperation::CurrentUser, "")?;
        Ok(state.user.clone())
    }

    async fn list_workspaces(&self) -> ClockifyApiResult<Vec<Workspace>> {
        let mut state = self.write()?;
        state.record(ApiOperation::ListWorkspaces, "")?;
        Ok(state.workspaces.clone())
    }

    async fn list_clients(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Client>> {
        let mut state = self.write()?;
        state.record(ApiOperation::ListClients, workspace_id.as_str())?;
        let matching = state
            .clients
            .iter()
            .filter(|client| client.workspace_id.as_ref() == Some(workspace_id));
        Ok(state.page(matching, page))
    }

    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Project>> {
        let mut state = self.write()?;
        state.record(ApiOperation::ListProjects, workspace_id.as_str())?;
        let matching = state
            .projects
            .iter()
            .filter(|project| project.workspace_id.as_ref() == Some(workspace_id));
        Ok(state.page(matching, page))
    }

    async fn list_tasks(
        &self,
        _workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Task>> {
        let mut state = self.write()?;
        state.record(ApiOperation::ListTasks, project_id.as_str())?;
        let matching = state
            .tasks
            .iter()
            .filter(|task| task.project_id == *project_id);
        Ok(state.page(matching, page))
    }

    async fn list_time_entries(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        range: TimeRange,
        page: Page,
    ) -> ClockifyApiResult<Vec<TimeEntry>> {
        let mut state = self.write()?;
        state.record(ApiOperation::ListTimeEntries, workspace_id.as_str())?;
        let matching = state.time_entries.iter().filter(|entry| {
            entry.workspace_id == *workspace_id
                && entry.user_id == *user_id
                && range.contains(entry.time_interval.start)
        });
        Ok(state.page(matching, page))
    }

    async fn create_client(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Client> {
        let mut state = self.write()?;
        state.record(ApiOperation::CreateClient, name)?;
        Ok(state.insert_client(workspace_id, name))
    }

    async fn create_project(
        &self,
        workspace_id: &WorkspaceId,
        project: &NewProject,
    ) -> ClockifyApiResult<Project> {
        let mut state = self.write()?;
        state.record(ApiOperation::CreateProject, &project.name)?;
        Ok(state.insert_project(workspace_id, project))
    }

    async fn create_task(
        &self,
        _workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        name: &str,
    ) -> ClockifyApiResult<Task> {
        let mut state = self.write()?;
        state.record(ApiOperation::CreateTask, name)?;
        Ok(state.insert_task(project_id, name))
    }

    async fn create_time_entry(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        entry: &NewTimeEntry,
    ) -> ClockifyApiResult<TimeEntry> {
        let mut state = self.write()?;
        state.record(ApiOperation::CreateTimeEntry, &entry.description)?;
        Ok(state.insert_time_entry(workspace_id, user_id, entry))
    }

    async fn create_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook: &NewWebhook,
    ) -> ClockifyApiResult<Webhook> {
        let mut state = self.write()?;
        state.record(ApiOperation::CreateWebhook, webhook.webhook_event.as_str())?;
        if webhook.name.chars().count() > WEBHOOK_NAME_LIMIT {
            return Err(ClockifyApiError::Status {
                status: 400,
                endpoint: ApiOperation::CreateWebhook.as_str().to_owned(),
                body: format!("webhook name '{}' is too long", webhook.name),
            });
        }
        let created = Webhook {
            id: WebhookId::new(state.allocate("webhook")),
            name: webhook.name.clone(),
            url: webhook.url.clone(),
            webhook_event: webhook.webhook_event,
            trigger_source: webhook.trigger_source.clone(),
            trigger_source_type: webhook.trigger_source_type,
            workspace_id: Some(workspace_id.clone()),
            enabled: true,
        };
        state.webhooks.push(created.clone());
        Ok(created)
    }

    async fn delete_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook_id: &WebhookId,
    ) -> ClockifyApiResult<()> {
        let mut state = self.write()?;
        state.record(ApiOperation::DeleteWebhook, webhook_id.as_str())?;
        let before = state.webhooks.len();
        state.webhooks.retain(|webhook| {
            !(webhook.id == *webhook_id && webhook.workspace_id.as_ref() == Some(workspace_id))
        });
        if state.webhooks.len() == before {
            return Err(ClockifyApiError::Status {
                status: 404,
                endpoint: ApiOperation::DeleteWebhook.as_str().to_owned(),
                body: format!("webhook {webhook_id} not found"),
            });
        }
        Ok(())
    }
}
