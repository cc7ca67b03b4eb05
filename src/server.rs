//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, migrations, worker spawning, index maintenance,
//! and the Axum server lifecycle.

use crate::application::services::{
    ActivityLogger, DefaultTargetService, IndexService, KeyDefaults, RedirectService,
};
use crate::config::{Config, StorageBackend};
use crate::domain::activity_worker::run_activity_worker;
use crate::domain::repositories::{ActivityRepository, ProfileRepository, RedirectRepository};
use crate::infrastructure::memory::{
    MemoryActivityRepository, MemoryProfileRepository, MemoryRedirectRepository,
};
use crate::infrastructure::persistence::{
    PgActivityRepository, PgProfileRepository, PgRedirectRepository,
};
use crate::routes::{RateLimit, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// The three stores the service works against.
struct Repositories {
    redirects: Arc<dyn RedirectRepository>,
    profiles: Arc<dyn ProfileRepository>,
    activity: Arc<dyn ActivityRepository>,
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory store)
/// - Key index check, at startup and periodically
/// - Background activity worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repositories = match config.storage_backend {
        StorageBackend::Postgres => postgres_repositories(&config).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on shutdown");
            Repositories {
                redirects: Arc::new(MemoryRedirectRepository::new()),
                profiles: Arc::new(MemoryProfileRepository::new()),
                activity: Arc::new(MemoryActivityRepository::new()),
            }
        }
    };

    let index_service = IndexService::new(repositories.redirects.clone());
    index_service.ensure_index().await;
    if config.index_check_interval_seconds > 0 {
        tokio::spawn(
            index_service
                .run_periodic(Duration::from_secs(config.index_check_interval_seconds)),
        );
    }

    let (activity_tx, activity_rx) = mpsc::channel(config.activity_queue_capacity);
    let activity_worker = tokio::spawn(run_activity_worker(
        activity_rx,
        repositories.activity.clone(),
        config.activity_worker_concurrency,
    ));
    tracing::info!("Activity worker started");

    let default_targets =
        DefaultTargetService::new(repositories.redirects.clone(), repositories.profiles);
    let redirect_service = RedirectService::new(
        repositories.redirects,
        default_targets,
        KeyDefaults {
            user: config.default_user.clone(),
            company: config.default_company.clone(),
        },
    );

    let state = AppState::new(
        Arc::new(redirect_service),
        ActivityLogger::new(activity_tx),
        config.behind_proxy,
    );

    let app = app_router(
        state,
        RateLimit {
            per_second: config.rate_limit_per_second,
            burst: config.rate_limit_burst,
        },
    );

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and with it the last activity sender) is gone now, so the
    // worker drains the queue and exits.
    if let Err(e) = activity_worker.await {
        tracing::error!("Activity worker panicked: {}", e);
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn postgres_repositories(config: &Config) -> Result<Repositories> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    migrate(&pool).await?;

    let pool = Arc::new(pool);
    Ok(Repositories {
        redirects: Arc::new(PgRedirectRepository::new(pool.clone())),
        profiles: Arc::new(PgProfileRepository::new(pool.clone())),
        activity: Arc::new(PgActivityRepository::new(pool)),
    })
}

/// Applies pending schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
