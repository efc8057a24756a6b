//! `reqwest`-backed adapter for the Clockify REST API (v1).

use crate::clockify::{
    domain::{
        Client, NewProject, NewTimeEntry, NewWebhook, Project, ProjectId, Task, TimeEntry,
        TimeRange, User, UserId, Webhook, WebhookId, Workspace, WorkspaceId,
    },
    ports::{ClockifyApi, ClockifyApiError, ClockifyApiResult, Page},
};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Connection settings for [`HttpClockifyApi`].
#[derive(Clone)]
pub struct ClockifyApiSettings {
    api_key: String,
    base_url: String,
    timeout: Duration,
    page_size: u32,
}

impl ClockifyApiSettings {
    /// Public Clockify API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.clockify.me/api/v1";
    /// Largest page the service serves.
    pub const DEFAULT_PAGE_SIZE: u32 = 5000;
    /// Per-request timeout applied by the HTTP client.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates settings for the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the listing page size. Zero keeps the default.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl std::fmt::Debug for ClockifyApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockifyApiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[derive(Serialize)]
struct NewClientBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct NewTaskBody<'a> {
    name: &'a str,
    status: &'static str,
}

/// Clockify API client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpClockifyApi {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl HttpClockifyApi {
    /// Builds a client that authenticates every request with the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ClockifyApiError::Transport`] when the key is not a valid
    /// header value or the HTTP client cannot be constructed.
    pub fn new(settings: &ClockifyApiSettings) -> ClockifyApiResult<Self> {
        let mut api_key =
            HeaderValue::from_str(&settings.api_key).map_err(ClockifyApiError::transport)?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .map_err(ClockifyApiError::transport)?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_owned(),
            page_size: settings.page_size,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn page_query(&self, page: Page) -> Vec<(&'static str, String)> {
        vec![
            ("page", page.number().to_string()),
            ("page-size", self.page_size.to_string()),
        ]
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClockifyApiResult<T> {
        debug!(method = "GET", path, "calling Clockify");
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(ClockifyApiError::transport)?;
        decode(response, "GET", path).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> ClockifyApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method = "POST", path, "calling Clockify");
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(ClockifyApiError::transport)?;
        decode(response, "POST", path).await
    }

    async fn delete(&self, path: &str) -> ClockifyApiResult<()> {
        debug!(method = "DELETE", path, "calling Clockify");
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(ClockifyApiError::transport)?;
        check_status(response, "DELETE", path).await.map(drop)
    }
}

async fn check_status(
    response: reqwest::Response,
    method: &str,
    path: &str,
) -> ClockifyApiResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClockifyApiError::Status {
        status: status.as_u16(),
        endpoint: format!("{method} {path}"),
        body,
    })
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    method: &str,
    path: &str,
) -> ClockifyApiResult<T> {
    let bytes = check_status(response, method, path)
        .await?
        .bytes()
        .await
        .map_err(ClockifyApiError::transport)?;
    serde_json::from_slice(&bytes).map_err(ClockifyApiError::decode)
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl ClockifyApi for HttpClockifyApi {
    async fn current_user(&self) -> ClockifyApiResult<User> {
        self.get("/user", &[]).await
    }

    async fn list_workspaces(&self) -> ClockifyApiResult<Vec<Workspace>> {
        self.get("/workspaces", &[]).await
    }

    async fn list_clients(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Client>> {
        let path = format!("/workspaces/{workspace_id}/clients");
        self.get(&path, &self.page_query(page)).await
    }

    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Project>> {
        let path = format!("/workspaces/{workspace_id}/projects");
        self.get(&path, &self.page_query(page)).await
    }

    async fn list_tasks(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        page: Page,
    ) -> ClockifyApiResult<Vec<Task>> {
        let path = format!("/workspaces/{workspace_id}/projects/{project_id}/tasks");
        self.get(&path, &self.page_query(page)).await
    }

    async fn list_time_entries(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        range: TimeRange,
        page: Page,
    ) -> ClockifyApiResult<Vec<TimeEntry>> {
        let path = format!("/workspaces/{workspace_id}/user/{user_id}/time-entries");
        let mut query = self.page_query(page);
        if let Some(start) = range.start {
            query.push(("start", format_instant(start)));
        }
        if let Some(end) = range.end {
            query.push(("end", format_instant(end)));
        }
        self.get(&path, &query).await
    }

    async fn create_client(
        &self,
        workspace_id: &WorkspaceId,
        name: &str,
    ) -> ClockifyApiResult<Client> {
        let path = format!("/workspaces/{workspace_id}/clients");
        self.post(&path, &NewClientBody { name }).await
    }

    async fn create_project(
        &self,
        workspace_id: &WorkspaceId,
        project: &NewProject,
    ) -> ClockifyApiResult<Project> {
        let path = format!("/workspaces/{workspace_id}/projects");
        self.post(&path, project).await
    }

    async fn create_task(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
        name: &str,
    ) -> ClockifyApiResult<Task> {
        let path = format!("/workspaces/{workspace_id}/projects/{project_id}/tasks");
        let body = NewTaskBody {
            name,
            status: "ACTIVE",
        };
        self.post(&path, &body).await
    }

    async fn create_time_entry(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
        entry: &NewTimeEntry,
    ) -> ClockifyApiResult<TimeEntry> {
        let path = format!("/workspaces/{workspace_id}/user/{user_id}/time-entries");
        self.post(&path, entry).await
    }

    async fn create_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook: &NewWebhook,
    ) -> ClockifyApiResult<Webhook> {
        let path = format!("/workspaces/{workspace_id}/webhooks");
        self.post(&path, webhook).await
    }

    async fn delete_webhook(
        &self,
        workspace_id: &WorkspaceId,
        webhook_id: &WebhookId,
    ) -> ClockifyApiResult<()> {
        let path = format!("/workspaces/{workspace_id}/webhooks/{webhook_id}");
        self.delete(&path).await
    }
}
