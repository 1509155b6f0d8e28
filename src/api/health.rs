use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

/// GET /health
/// A failed database ping is reported as a 500.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthStatus>>, ApiError> {
    state
        .storage()
        .ping()
        .await
        .map_err(|e| ApiError::DatabaseError(format!("Health check failed: {e:#}")))?;

    Ok(Json(ApiResponse::success(
        "Service is healthy",
        HealthStatus {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        },
    )))
}
