// src/handlers/leads.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::lead::{CreateLeadPayload, Lead},
};

// POST /api/leads (público: formulário da lista de espera)
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Inscrição registrada", body = Lead),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lead = app_state
        .lead_service
        .capture_lead(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}
