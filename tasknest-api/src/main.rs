//! # TaskNest API Server
//!
//! Multi-user task API. Users register and log in with a username and
//! password, receive a signed session token, and manage their own tasks.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/tasknest \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p tasknest-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured logs.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tasknest_api::{app, config::Config};
use tasknest_shared::auth::throttle::LoginThrottle;
use tasknest_shared::db::{migrations, pool};
use tasknest_shared::store::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often expired throttle windows are dropped
const THROTTLE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("TaskNest API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;
    tracing::info!("Database migrations applied");

    let bind_address = config.bind_address();
    let state = app::AppState::new(Arc::new(PgStore::new(db.clone())), config);

    tokio::spawn(sweep_throttle(state.throttle.clone()));

    let router = app::build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    // ConnectInfo feeds the client IP into the login throttle
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tasknest_api=debug,tasknest_shared=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn sweep_throttle(throttle: Arc<LoginThrottle>) {
    let mut interval = tokio::time::interval(THROTTLE_SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        let removed = throttle.sweep();
        if removed > 0 {
            tracing::debug!(removed, remaining = throttle.tracked_keys(), "Swept throttle windows");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
