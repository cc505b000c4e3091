//! Crosslink Atlas server - Main entry point

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use xlink_common::logging::{init_logging, LogConfig};
use xlink_server::{
    config::Config,
    db::{self, PgStore, SharedStore, Store},
    features::{self, organelles::commands::seed as seed_organelles, AppState},
    ingest::ImporterSettings,
    middleware,
    uniprot::UniProtClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::for_service(
        "xlink-server",
        "xlink_server=debug,tower_http=debug,sqlx=warn",
    )
    .apply_env()?;
    let _log_guard = init_logging(&log_config)?;

    info!("Starting Crosslink Atlas server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        uniprot = %config.uniprot.base_url,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    db::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;
    info!("Database migrations completed");

    let store: SharedStore = Arc::new(PgStore::new(pool));

    if config.ingest.seed_organelles {
        let organelles = seed_organelles::handle(store.as_ref()).await?;
        info!(count = organelles.len(), "Organelle catalog seeded");
    }

    let lookup = UniProtClient::new(
        config.uniprot.base_url.clone(),
        Duration::from_secs(config.uniprot.timeout_secs),
    )?;
    let state = AppState::new(
        store,
        Arc::new(lookup),
        ImporterSettings::from_config(&config),
        &config.auth.jwt_secret,
    )?;

    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state.clone())
        .nest("/api/v1", features::router(state))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> Result<Response, StatusCode> {
    match state.store.ping().await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
