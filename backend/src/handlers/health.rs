//! Liveness and readiness report

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{AppState, Config};

pub const SERVICE_NAME: &str = "dairyflow";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub service: &'static str,
    pub version: &'static str,
    /// `ok`, or `degraded` when the database is unreachable
    pub status: &'static str,
    pub database: &'static str,
    pub environment: String,
    pub retention_enabled: bool,
    pub checked_at: DateTime<Utc>,
}

impl HealthResponse {
    pub fn new(database_reachable: bool, config: &Config, now: DateTime<Utc>) -> Self {
        let (status, database) = if database_reachable {
            ("ok", "connected")
        } else {
            ("degraded", "disconnected")
        };

        Self {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            status,
            database,
            environment: config.environment.clone(),
            retention_enabled: config.retention.enabled,
            checked_at: now,
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthResponse::new(reachable, &state.config, Utc::now()))
}
