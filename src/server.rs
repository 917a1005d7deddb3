//! HTTP server initialization and runtime setup.
//!
//! Handles store connections, cache setup, background click processing and
//! the Axum server lifecycle.

use crate::application::services::{ClickRecorder, LinkService};
use crate::config::Config;
use crate::domain::click_worker::{WorkerOptions, run_click_worker, run_reconciler};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache};
use crate::infrastructure::persistence::{MemoryStore, PgClickRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;

/// Opens the PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn open_store(
    config: &Config,
) -> Result<(Arc<dyn LinkRepository>, Arc<dyn ClickRepository>)> {
    if config.uses_memory_store() {
        tracing::warn!("Using in-memory store, data is lost on restart");
        let store = Arc::new(MemoryStore::new());
        return Ok((store.clone(), store));
    }

    let pool = connect_pool(config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    Ok((
        Arc::new(PgLinkRepository::new(pool.clone())),
        Arc::new(PgClickRepository::new(pool)),
    ))
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Store (PostgreSQL with migrations, or in-memory)
/// - Redirect cache (or NullCache when disabled)
/// - Click worker and reconciler
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, the
/// reconciler is stopped and the worker drains the queued increments.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (link_repository, click_repository) = open_store(&config).await?;

    let cache: Arc<dyn CacheService> = if config.cache_enabled {
        tracing::info!("Cache enabled (in-memory)");
        Arc::new(MemoryCache::new())
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);

    let worker = tokio::spawn(run_click_worker(
        click_rx,
        click_repository.clone(),
        WorkerOptions {
            concurrency: config.click_worker_concurrency,
            max_retries: config.click_max_retries,
        },
    ));
    let reconciler = tokio::spawn(run_reconciler(
        click_repository.clone(),
        click_tx.clone(),
        Duration::from_secs(config.click_reconcile_interval_seconds),
    ));
    tracing::info!("Click worker started");

    let link_service = Arc::new(LinkService::new(
        link_repository,
        cache,
        config.base_url.clone(),
    ));
    let click_recorder = Arc::new(ClickRecorder::new(click_repository, click_tx));
    let state = AppState::new(link_service, click_recorder, config.top_referrers_limit);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining click queue");
    reconciler.abort();
    let _ = reconciler.await;
    // The router (and with it the last sender) is gone once serve returns.
    if let Err(e) = worker.await {
        tracing::error!(error = %e, "Click worker terminated abnormally");
    }

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
