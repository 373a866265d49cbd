//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// "ok" when every dependency probe passes, otherwise "degraded"
    pub status: String,
    pub service: String,
    pub version: String,
    pub database: String,
}

/// Liveness probe: reports the service identity and whether the store
/// database answers a trivial query
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_up = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();

    Json(HealthResponse {
        status: overall_status(database_up).to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if database_up {
            "connected".to_string()
        } else {
            "disconnected".to_string()
        },
    })
}

fn overall_status(database_up: bool) -> &'static str {
    if database_up {
        "ok"
    } else {
        "degraded"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_degrades_without_database() {
        assert_eq!(overall_status(true), "ok");
        assert_eq!(overall_status(false), "degraded");
    }
}
