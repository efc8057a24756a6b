//! Unit tests for webhook session registration and teardown.

use std::sync::Arc;

use crate::clockify::{
    adapters::{ApiOperation, InMemoryClockifyApi},
    domain::{TriggerSourceType, Webhook, WebhookEvent, WebhookId, Workspace, WorkspaceId},
    ports::{ClockifyApiError, MockClockifyApi},
};
use crate::webhook::{
    domain::MAX_WEBHOOK_NAME_LENGTH,
    services::{WebhookLifecycleError, WorkspaceWebhookService},
};
use rand::{SeedableRng, rngs::StdRng};
use rstest::{fixture, rstest};

const URL: &str = "https://hooks.example.com/clockify";

type MemoryService = WorkspaceWebhookService<InMemoryClockifyApi, StdRng>;

struct Session {
    api: Arc<InMemoryClockifyApi>,
    workspace: Workspace,
    service: MemoryService,
}

#[fixture]
fn session() -> Session {
    let api = Arc::new(InMemoryClockifyApi::new());
    let workspace = api
        .add_workspace("Acme Field Operations")
        .expect("seed workspace");
    let service = WorkspaceWebhookService::with_rng(
        Arc::clone(&api),
        workspace.clone(),
        URL,
        StdRng::seed_from_u64(3),
    );
    Session {
        api,
        workspace,
        service,
    }
}

impl Session {
    fn remote_webhooks(&self) -> Vec<Webhook> {
        self.api.webhooks(&self.workspace.id).expect("list webhooks")
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_registers_one_webhook_per_event(mut session: Session) {
    session.service.create().await.expect("create succeeds");

    let registered = session.service.registered();
    assert!(session.service.is_active());
    assert_eq!(
        registered.keys().copied().collect::<Vec<_>>(),
        WebhookEvent::ALL.to_vec()
    );
    for (event, webhook) in registered {
        assert_eq!(webhook.webhook_event, *event);
        assert_eq!(webhook.url, URL);
        assert_eq!(webhook.trigger_source_type, TriggerSourceType::WorkspaceId);
        assert_eq!(webhook.trigger_source, vec![session.workspace.id.to_string()]);
        assert!(webhook.name.starts_with("acme-field-operation"));
        assert!(webhook.name.chars().count() <= MAX_WEBHOOK_NAME_LENGTH);
    }
    assert_eq!(session.remote_webhooks().len(), 5);
    assert!(session.service.stranded().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_create_is_refused_while_active(mut session: Session) {
    session.service.create().await.expect("create succeeds");

    let result = session.service.create().await;

    assert!(matches!(result, Err(WebhookLifecycleError::SessionActive)));
    assert_eq!(session.remote_webhooks().len(), 5);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_every_webhook(mut session: Session) {
    session.service.create().await.expect("create succeeds");

    session.service.delete().await.expect("delete succeeds");

    assert!(!session.service.is_active());
    assert!(session.remote_webhooks().is_empty());
    assert_eq!(
        session
            .api
            .call_count(ApiOperation::DeleteWebhook)
            .expect("journal"),
        5
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_without_session_is_a_no_op(mut session: Session) {
    session.service.delete().await.expect("nothing to delete");

    assert!(session.api.journal().expect("journal").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_registration_publishes_nothing_and_strands_created(mut session: Session) {
    session
        .api
        .fail_on_subject(ApiOperation::CreateWebhook, WebhookEvent::NewClient.as_str())
        .expect("inject failure");

    let result = session.service.create().await;

    assert!(matches!(
        result,
        Err(WebhookLifecycleError::Registration {
            event: WebhookEvent::NewClient,
            ..
        })
    ));
    assert!(!session.service.is_active());
    assert!(session.service.registered().is_empty());
    let stranded: Vec<_> = session
        .service
        .stranded()
        .iter()
        .map(|webhook| webhook.webhook_event)
        .collect();
    assert_eq!(
        stranded,
        vec![WebhookEvent::NewTimerStarted, WebhookEvent::TimerStopped]
    );
    assert_eq!(session.remote_webhooks().len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_after_partial_create_removes_stranded(mut session: Session) {
    session
        .api
        .fail_on_subject(ApiOperation::CreateWebhook, WebhookEvent::NewTag.as_str())
        .expect("inject failure");
    session
        .service
        .create()
        .await
        .expect_err("registration fails");

    session.service.delete().await.expect("cleanup succeeds");

    assert!(session.service.stranded().is_empty());
    assert!(session.remote_webhooks().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn teardown_reports_only_deletion_failures(mut session: Session) {
    session
        .api
        .fail_on_subject(ApiOperation::CreateWebhook, WebhookEvent::NewProject.as_str())
        .expect("inject failure");
    session
        .service
        .create()
        .await
        .expect_err("registration fails");
    let blocked = session
        .service
        .stranded()
        .first()
        .map(|webhook| webhook.id.clone())
        .expect("a stranded webhook");
    session
        .api
        .fail_on_subject(ApiOperation::DeleteWebhook, blocked.as_str())
        .expect("inject failure");

    let result = session.service.delete().await;

    let errors = match result {
        Err(WebhookLifecycleError::Teardown(errors)) => errors,
        other => panic!("expected a teardown error, got {other:?}"),
    };
    assert_eq!(errors.ids().collect::<Vec<_>>(), vec![&blocked]);
    assert!(matches!(
        errors.failures().first().map(|failure| &failure.cause),
        Some(ClockifyApiError::Status { status: 500, .. })
    ));
    let remaining: Vec<_> = session
        .service
        .stranded()
        .iter()
        .map(|webhook| webhook.id.clone())
        .collect();
    assert_eq!(remaining, vec![blocked]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_deletions_are_retried_by_the_next_delete(mut session: Session) {
    session.service.create().await.expect("create succeeds");
    let timer_stopped = session
        .service
        .registered()
        .get(&WebhookEvent::TimerStopped)
        .map(|webhook| webhook.id.clone())
        .expect("registered webhook");
    session
        .api
        .fail_on_subject(ApiOperation::DeleteWebhook, timer_stopped.as_str())
        .expect("inject failure");

    let first = session.service.delete().await;
    session.api.clear_failures().expect("clear failures");
    let second = session.service.delete().await;

    assert!(matches!(
        first,
        Err(WebhookLifecycleError::Teardown(ref errors)) if errors.len() == 1
    ));
    assert!(second.is_ok());
    assert!(!session.service.is_active());
    assert!(session.remote_webhooks().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn every_deletion_is_attempted_despite_failures() {
    let workspace = Workspace {
        id: WorkspaceId::new("ws-1"),
        name: "Acme".to_owned(),
    };
    let mut api = MockClockifyApi::new();
    api.expect_create_webhook().times(5).returning(|_, request| {
        Ok(Webhook {
            id: WebhookId::new(format!("wh-{}", request.webhook_event.as_str())),
            name: request.name.clone(),
            url: request.url.clone(),
            webhook_event: request.webhook_event,
            trigger_source: request.trigger_source.clone(),
            trigger_source_type: request.trigger_source_type,
            workspace_id: None,
            enabled: true,
        })
    });
    api.expect_delete_webhook().times(5).returning(|_, _| {
        Err(ClockifyApiError::Status {
            status: 503,
            endpoint: "DELETE /webhooks".to_owned(),
            body: String::new(),
        })
    });
    let mut service = WorkspaceWebhookService::with_rng(
        Arc::new(api),
        workspace,
        URL,
        StdRng::seed_from_u64(11),
    );
    service.create().await.expect("create succeeds");

    let result = service.delete().await;

    assert!(matches!(
        result,
        Err(WebhookLifecycleError::Teardown(ref errors)) if errors.len() == 5
    ));
    assert_eq!(service.registered().len(), 5);
}
