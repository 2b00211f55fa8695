use serde::{Deserialize, Serialize};

/// Liveness probe payload for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

impl HealthResponse {
    pub fn ok(now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}
