//! Paging and exact-name lookups layered over [`ClockifyApi`].

use super::api::{ClockifyApi, ClockifyApiError, ClockifyApiResult, Page};
use crate::clockify::domain::{
    Client, EntityKind, Project, ProjectId, Task, TimeEntry, TimeRange, UserId, Workspace,
    WorkspaceId,
};
use async_trait::async_trait;
use std::future::Future;

/// Drains a paginated listing until the service returns an empty page.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> ClockifyApiResult<Vec<T>>
where
    F: FnMut(Page) -> Fut + Send,
    Fut: Future<Output = ClockifyApiResult<Vec<T>>> + Send,
    T: Send,
{
    let mut items = Vec::new();
    let mut page = Page::FIRST;
    loop {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            return Ok(items);
        }
        items.extend(batch);
        page = page.next();
    }
}

/// Walks a paginated listing and stops at the first item accepted by
/// `accept`. Later pages are never requested once a match is found.
async fn find_in_pages<T, F, Fut, P>(mut fetch: F, mut accept: P) -> ClockifyApiResult<Option<T>>
where
    F: FnMut(Page) -> Fut + Send,
    Fut: Future<Output = ClockifyApiResult<Vec<T>>> + Send,
    P: FnMut(&T) -> bool + Send,
    T: Send,
{
    let mut page = Page::FIRST;
    loop {
        let batch = fetch(page).await?;
        if batch.is_empty() {
            return Ok(None);
        }
        if let Some(found) = batch.into_iter().find(|item| accept(item)) {
            return Ok(Some(found));
        }
        page = page.next();
    }
}

/// Lookup helpers available on every [`ClockifyApi`] implementation.
///
/// Name matching is exact and case-sensitive; the first match wins.
#[async_trait]
pub trait ClockifyApiExt: ClockifyApi {
    /// Finds a workspace by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::NotFound`] when no workspace carries the
    /// name, or the underlying API error.
    async fn find_workspace_by_name(&self, name: &str) -> ClockifyApiResult<Workspace> {
        self.list_workspaces()
            .await?
            .into_iter()
            .find(|workspace| workspace.name == name)
            .ok_or_else(|| ClockifyApiError::not_found(EntityKind::Workspace, name))
    }

    /// Finds a project by exact name.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::NotFound`] when no project carries the
    /// name, or the underlying API error.
    async fn find_project_by_name(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Project> {
        self.find_project_named(workspace_id, name)
            .await?
            .ok_or_else(|| ClockifyApiError::not_found(EntityKind::Project, name))
    }

    /// Returns the first client with the given name, if any.
    async fn find_client_named(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Option<Client>> {
        find_in_pages(
            |page| self.list_clients(workspace_id, page),
            |client: &Client| client.name == name,
        )
        .await
    }

    /// Returns the first project with the given name, if any.
    async fn find_project_named(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Option<Project>> {
        find_in_pages(
            |page| self.list_projects(workspace_id, page),
            |project: &Project| project.name == name,
        )
        .await
    }

    /// Returns the first task in `project_id` with the given name, if any.
    async fn find_task_named(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        name: &str,
    ) -> ClockifyApiResult<Option<Task>> {
        find_in_pages(
            |page| self.list_tasks(workspace_id, project_id, page),
            |task: &Task| task.name == name,
        )
        .await
    }

    /// Lists every client in a workspace.
    async fn all_clients(&self, workspace_id: &WorkspaceId) -> ClockifyApiResult<Vec<Client>> {
        collect_pages(|page| self.list_clients(workspace_id, page)).await
    }

    /// Lists every task in a project.
    async fn all_tasks(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
    ) -> ClockifyApiResult<Vec<Task>> {
        collect_pages(|page| self.list_tasks(workspace_id, project_id, page)).await
    }

    /// Lists every time entry of a user in a workspace within `range`.
    async fn all_time_entries(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        range: TimeRange,
    ) -> ClockifyApiResult<Vec<TimeEntry>> {
        collect_pages(|page| self.list_time_entries(workspace_id, user_id, range, page)).await
    }

    /// Lists a user's time entries logged against one project.
    ///
    /// The service cannot filter by project, so every entry of the user is
    /// fetched and filtered here.
    async fn project_time_entries(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        project_id: &ProjectId,
        range: TimeRange,
    ) -> ClockifyApiResult<Vec<TimeEntry>> {
        let entries = self.all_time_entries(workspace_id, user_id, range).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.project_id.as_ref() == Some(project_id))
            .collect())
    }
}

impl<T: ClockifyApi + ?Sized> ClockifyApiExt for T {}
