use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn health_check_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthStatus>) {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(HealthStatus { status: "healthy" })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unhealthy",
                }),
            )
        }
    }
}
