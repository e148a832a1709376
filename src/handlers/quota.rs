// src/handlers/quota.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::quota::QuotaStatus,
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillingPreferencePayload {
    /// "blocked" | "upgrade_pending" | "per_material"
    #[schema(example = "per_material")]
    pub billing_preference: String,
}

// GET /api/quota
#[utoipa::path(
    get,
    path = "/api/quota",
    tag = "Quota",
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Cota do mês corrente (já reconciliada)", body = QuotaStatus),
        (status = 404, description = "Estúdio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .quota_service
        .get_status(studio.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

// PUT /api/quota/billing-preference
#[utoipa::path(
    put,
    path = "/api/quota/billing-preference",
    tag = "Quota",
    request_body = BillingPreferencePayload,
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Preferência gravada", body = QuotaStatus),
        (status = 400, description = "Preferência inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_billing_preference(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Json(payload): Json<BillingPreferencePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .quota_service
        .set_billing_preference(studio.0, &payload.billing_preference)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/quota/upgrade-request
#[utoipa::path(
    post,
    path = "/api/quota/upgrade-request",
    tag = "Quota",
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Upgrade solicitado; preferência passa a upgrade_pending", body = QuotaStatus)
    ),
    security(("api_jwt" = []))
)]
pub async fn request_upgrade(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .quota_service
        .request_upgrade(studio.0, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}
