// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub database: bool,
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "API e banco respondendo", body = HealthResponse),
        (status = 503, description = "Banco indisponível", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    let database = sqlx::query("SELECT 1")
        .execute(&app_state.db_pool)
        .await
        .is_ok();

    if !database {
        tracing::warn!("Health check: banco indisponível");
    }

    let status = if database { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    let body = HealthResponse { status: if database { "ok" } else { "degraded" }.to_string(), database };

    (status, Json(body))
}
