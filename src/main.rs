//! Main entry point for the zipmail HTTP server.
//!
//! Configuration comes from command-line flags and environment variables.
//! Flags win over variables; a `.env` file only fills in variables that are
//! not already set. `RUST_LOG` controls log verbosity (default: info).

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zipmail::http::{AppState, create_router};
use zipmail::mail::{MailTransport, Outbox, SmtpMailer};
use zipmail::service::{ArchiveService, MailService};
use zipmail::{Cli, TempStorage};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let env_file = dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(true)
        .init();

    if let Some(path) = env_file {
        info!("Loaded environment from {}", path.display());
    }

    // lettre and rustls may both pull in a crypto backend; pick one explicitly
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    let storage = TempStorage::new(cli.temp_dir());
    storage.ensure_dir().await?;
    info!("Temporary files go to {}", storage.dir().display());

    let transport: Arc<dyn MailTransport> = match cli.smtp_settings()? {
        Some(settings) => {
            info!(
                host = %settings.host,
                port = settings.port,
                tls = ?settings.tls,
                "Using SMTP transport"
            );
            Arc::new(SmtpMailer::new(&settings)?)
        }
        None => {
            warn!("Mail dry run: messages are logged, not sent");
            Arc::new(Outbox::new())
        }
    };

    let mail = MailService::new(storage.clone(), transport, cli.sender()?);
    let state = AppState::new(ArchiveService::new(storage), mail, cli.max_upload_bytes);
    let app = create_router(state);

    let addr = cli.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when Ctrl-C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
