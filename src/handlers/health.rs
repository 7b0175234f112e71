use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, warn};

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint, answers once the store responds
pub async fn ready_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    debug!("Readiness check requested");
    match state.store.count_users().await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                message: "Service is ready".to_string(),
            }),
        ),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    message: "Data store is not reachable".to_string(),
                }),
            )
        }
    }
}
