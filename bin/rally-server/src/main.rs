//! Rally Platform Server
//!
//! Production server for the event registration REST API:
//! - Events: create, upcoming list, details, stats, register, cancel
//! - Users: create, list, details, registered events
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RALLY_API_PORT` | `8080` | HTTP API port |
//! | `RALLY_DATABASE_URL` | - | PostgreSQL connection URL (required) |
//! | `RALLY_DB_MAX_CONNECTIONS` | `20` | Connection pool size |
//! | `RALLY_DB_ACQUIRE_TIMEOUT_MS` | `2000` | Pool checkout timeout |
//! | `RALLY_LOCK_TIMEOUT_MS` | `5000` | Event row lock wait bound |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use rally_platform::api::{
    events_router, not_found_handler, users_router, EventsState, PlatformApiDoc, UsersState,
};
use rally_platform::repository::{self, EventRepository, UserRepository};
use rally_platform::service::RegistrationService;

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting Rally Platform Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("RALLY_API_PORT", 8080);
    let database_url = env_required("RALLY_DATABASE_URL")?;
    let max_connections: u32 = env_or_parse("RALLY_DB_MAX_CONNECTIONS", 20);
    let acquire_timeout_ms: u64 = env_or_parse("RALLY_DB_ACQUIRE_TIMEOUT_MS", 2000);
    let lock_timeout_ms: u64 = env_or_parse("RALLY_LOCK_TIMEOUT_MS", 5000);

    // Connect to PostgreSQL
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_millis(acquire_timeout_ms))
        .connect(&database_url)
        .await?;

    // Fail fast if the database is unreachable
    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Database connection successful");

    repository::init_schema(&pool).await?;
    info!("Schema initialized");

    // Initialize repositories and services
    let event_repo = Arc::new(EventRepository::new(pool.clone()));
    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let registration_service = Arc::new(RegistrationService::with_lock_timeout(
        pool.clone(),
        Duration::from_millis(lock_timeout_ms),
    ));

    let events_state = EventsState {
        event_repo,
        registration_service,
    };
    let users_state = UsersState { user_repo };

    // Build API router
    let app = Router::new()
        .nest("/api/events", events_router(events_state))
        .nest("/api/users", users_router(users_state))
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", PlatformApiDoc::openapi()))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, closing connection pool...");
    pool.close().await;

    info!("Rally Platform Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Event Management API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Welcome to the Rally Platform API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "events": "/api/events",
            "users": "/api/users",
            "health": "/health",
            "docs": "/swagger-ui",
        },
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
