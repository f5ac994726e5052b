//! Orders API Server
//!
//! Accepts orders for users and stores each order together with its line items.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    http::{Response, StatusCode},
    routing::{get, post},
    Router,
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, OnResponse, TraceLayer};
use tracing::{Level, Span};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{PostgresOrderRepository, TracingEventSink};
use app::OrderService;
use config::{Config, Environment};

/// How long startup waits for the first successful database ping
const STARTUP_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub order_service: Arc<OrderService<PostgresOrderRepository>>,
    pub db: Arc<DatabaseConnection>,
}

fn init_tracing(environment: Environment) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,orders_api=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        Environment::Development => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Access log level for a response: 5xx at error, 4xx at warn, the rest at info
fn access_log_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

/// One access log line per response, leveled by status
#[derive(Clone, Copy, Debug)]
struct AccessLog;

impl<B> OnResponse<B> for AccessLog {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status().as_u16();
        let latency_ms = latency.as_millis() as u64;
        let level = access_log_level(response.status());

        if level == Level::ERROR {
            tracing::error!(status, latency_ms, "request failed");
        } else if level == Level::WARN {
            tracing::warn!(status, latency_ms, "request rejected");
        } else {
            tracing::info!(status, latency_ms, "request completed");
        }
    }
}

/// Wrap a router in the request timeout, panic recovery and tracing layers
pub fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(AccessLog)
        // 5xx responses are already logged by AccessLog
        .on_failure(());

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::new())
        .layer(trace)
}

fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let app = Router::new()
        // Health checks
        .route("/health", get(handlers::liveness))
        .route("/ready", get(handlers::readiness))
        // Orders
        .route("/orders", post(handlers::create_order))
        .route("/orders/:id", get(handlers::get_order))
        .with_state(state);

    with_middleware(app, request_timeout)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing
    init_tracing(config.environment);
    tracing::info!(env = %config.environment, "Starting Orders API...");

    // Connect to PostgreSQL
    let mut options = ConnectOptions::new(config.database.url.clone());
    options
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .max_lifetime(config.database.max_lifetime)
        .sqlx_logging(false);

    tracing::info!(
        max_connections = config.database.max_connections,
        min_connections = config.database.min_connections,
        "Connecting to database..."
    );
    let db = Arc::new(
        Database::connect(options)
            .await
            .context("Failed to connect to database")?,
    );

    tokio::time::timeout(STARTUP_PING_TIMEOUT, db.ping())
        .await
        .context("Database ping timed out")?
        .context("Database is not ready")?;
    tracing::info!("Database is ready");

    // Create adapters and services
    let order_repo = Arc::new(PostgresOrderRepository::new(
        db.clone(),
        Arc::new(TracingEventSink::new("repository")),
    ));
    let order_service = Arc::new(OrderService::new(
        order_repo,
        Arc::new(TracingEventSink::new("service")),
        config.id_assignment,
    ));
    tracing::info!(id_assignment = %config.id_assignment, "Order service ready");

    let state = AppState {
        order_service,
        db: db.clone(),
    };
    let app = build_router(state, config.server.request_timeout);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    tracing::info!("Listening on {}", config.server.addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .into_future(),
    );

    tokio::select! {
        _ = shutdown_signal() => {}
        result = &mut server => {
            result.context("Server task panicked")?.context("Server failed")?;
            return Ok(());
        }
    }

    tracing::info!("Shutting down server...");
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(config.server.shutdown_timeout, server).await {
        Ok(result) => result
            .context("Server task panicked")?
            .context("Server failed")?,
        Err(_) => tracing::warn!(
            timeout_secs = config.server.shutdown_timeout.as_secs(),
            "Graceful shutdown timed out, dropping open connections"
        ),
    }

    // The router and its handlers are gone once the server task finished
    match Arc::try_unwrap(db) {
        Ok(db) => db.close().await.context("Failed to close database pool")?,
        Err(_) => tracing::warn!("Database pool still in use, leaving it to process exit"),
    }
    tracing::info!("Server stopped");

    Ok(())
}
