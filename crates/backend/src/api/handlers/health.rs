use axum::Json;
use contracts::shared::health::HealthResponse;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok(chrono::Utc::now()))
}
