//! Health handlers
//!
//! Liveness says the process is up. Readiness also checks the database pool.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::AppState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<BTreeMap<&'static str, &'static str>>,
}

impl HealthResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            checks: None,
        }
    }

    fn with_check(mut self, name: &'static str, result: &'static str) -> Self {
        self.checks.get_or_insert_with(BTreeMap::new).insert(name, result);
        self
    }
}

/// GET /health
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse::new("alive"))
}

/// GET /ready
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    check_database(&state.db).await
}

async fn check_database(db: &DatabaseConnection) -> (StatusCode, Json<HealthResponse>) {
    let error = match tokio::time::timeout(READINESS_TIMEOUT, db.ping()).await {
        Ok(Ok(())) => {
            tracing::debug!(database = "ok", "readiness check passed");
            return (
                StatusCode::OK,
                Json(HealthResponse::new("ready").with_check("database", "ok")),
            );
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => "ping timed out".to_string(),
    };

    tracing::error!(%error, "database not ready");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse::new("unhealthy").with_check("database", "failed")),
    )
}
