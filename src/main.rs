//! Conference Central - Binary Entry Point
//!
//! Starts the HTTP API with the background email worker and the periodic
//! announcement refresh.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use conference_central::announcements::{spawn_refresh_task, MemoryCache};
use conference_central::api::http::create_router;
use conference_central::api::AppState;
use conference_central::auth::JwtAuth;
use conference_central::config::Config;
use conference_central::notify::{spawn_email_worker, QueueNotifier};
use conference_central::{ConferenceCentral, EntityStore};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run(Config::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &config.data_file {
        Some(path) => EntityStore::open(path)?,
        None => {
            info!("CONFERENCE_DATA_FILE not set, keeping data in memory only");
            EntityStore::new()
        }
    }
    .with_retries(config.transaction_retries);
    if let Some(path) = store.snapshot_path() {
        info!(path = %path.display(), entities = store.len(), "Persisting to snapshot");
    }

    let (notifier, emails) = QueueNotifier::new();
    let email_worker = spawn_email_worker(emails);

    let central = Arc::new(ConferenceCentral::with_collaborators(
        Arc::new(store),
        Arc::new(notifier),
        Arc::new(MemoryCache::new()),
    ));
    let refresher = spawn_refresh_task(
        central.announcements().clone(),
        central.store_handle(),
        config.announcement_refresh,
    );

    let auth = JwtAuth::from_secret_or_generated(config.jwt_secret.as_deref())?;
    let state = Arc::new(AppState::new(Arc::clone(&central), Arc::new(auth)));
    let app = create_router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "Conference Central listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.abort();
    // Dropping the services drops the last notifier, letting the worker finish
    drop(central);
    match email_worker.await {
        Ok(delivered) => info!(delivered, "Email worker stopped"),
        Err(e) => error!(error = %e, "Email worker panicked"),
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
