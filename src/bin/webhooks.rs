//! Registers webhooks for a Clockify workspace and serves their deliveries.
//!
//! Usage:
//!
//! ```text
//! clocksync-webhooks --workspace <name> --webhook-url <url> [--listen <addr>]
//! ```
//!
//! One webhook is registered per supported event when the listener starts,
//! and all of them are deleted again on `Ctrl-C` or `SIGTERM`. Deliveries
//! are checked against `CLOCKIFY_WEBHOOK_SECRET` when it is set; otherwise
//! every signature is accepted.

use clap::Parser;
use clocksync::clockify::{adapters::HttpClockifyApi, ports::ClockifyApiExt};
use clocksync::config::{ClockifyArgs, load_dotenv};
use clocksync::telemetry::{LogFormat, init_tracing};
use clocksync::webhook::{
    adapters::{DeliveryVerifier, LoggingEventHandler, webhook_router},
    services::{WebhookDispatcher, WorkspaceWebhookService},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "clocksync-webhooks", version, about)]
struct Cli {
    #[command(flatten)]
    clockify: ClockifyArgs,

    /// Name of the workspace to monitor.
    #[arg(long, env = "CLOCKSYNC_WORKSPACE")]
    workspace: String,

    /// Public URL Clockify delivers events to.
    #[arg(long, env = "CLOCKSYNC_WEBHOOK_URL")]
    webhook_url: String,

    /// Address the listener binds to.
    #[arg(long, env = "CLOCKSYNC_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,

    /// Shared secret for delivery signatures.
    #[arg(long, env = "CLOCKIFY_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    /// Log record format.
    #[arg(long, env = "CLOCKSYNC_LOG_FORMAT", value_enum, default_value_t)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    load_dotenv()?;
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;
    let verifier = DeliveryVerifier::from_secret(cli.webhook_secret.as_deref())?;

    let api = Arc::new(HttpClockifyApi::new(&cli.clockify.api_settings())?);
    let workspace = api.find_workspace_by_name(&cli.workspace).await?;
    info!(workspace = %workspace, "found workspace");
    let listener = TcpListener::bind(cli.listen).await?;

    let mut session = WorkspaceWebhookService::new(api, workspace, cli.webhook_url.as_str());
    if let Err(registration) = session.create().await {
        error!(error = %registration, "webhook registration failed");
        if let Err(cleanup) = session.delete().await {
            warn!(error = %cleanup, "some webhooks could not be removed");
        }
        return Err(registration.into());
    }

    let served = serve(listener, verifier).await;

    let teardown = session.delete().await;
    served?;
    teardown?;
    info!("webhook session closed");
    Ok(())
}

async fn serve(listener: TcpListener, verifier: DeliveryVerifier) -> std::io::Result<()> {
    let router = webhook_router(
        Arc::new(WebhookDispatcher::new(verifier)),
        Arc::new(LoggingEventHandler),
    );
    info!(address = ?listener.local_addr().ok(), "listening for webhook deliveries");
    axum::serve(listener, router)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            error!(error = %error, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                error!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl-C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
