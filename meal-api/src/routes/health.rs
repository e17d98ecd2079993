//! Health check endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        database: "unchecked".to_string(),
    })
}

/// Ready check endpoint (verifies database connectivity)
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = match state.database.health_check().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::error!(error = %e, "database health check failed");
            false
        }
    };

    let (status, code, database) = if database_ok {
        ("ready", StatusCode::OK, "ok")
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: state.version.clone(),
            database: database.to_string(),
        }),
    )
}
