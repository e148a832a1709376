// src/handlers/manufacturers.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, tenancy::StudioContext},
    models::manufacturer::{Manufacturer, ManufacturerPayload},
};

// GET /api/manufacturers
#[utoipa::path(
    get,
    path = "/api/manufacturers",
    tag = "Manufacturers",
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Fabricantes do estúdio", body = Vec<Manufacturer>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_manufacturers(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let manufacturers = app_state
        .manufacturer_repo
        .list_manufacturers(studio.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(manufacturers)))
}

// POST /api/manufacturers
#[utoipa::path(
    post,
    path = "/api/manufacturers",
    tag = "Manufacturers",
    request_body = ManufacturerPayload,
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 201, description = "Fabricante criado", body = Manufacturer),
        (status = 409, description = "Já existe fabricante com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_manufacturer(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Json(payload): Json<ManufacturerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let manufacturer = app_state
        .manufacturer_repo
        .create_manufacturer(studio.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(manufacturer)))
}

// PUT /api/manufacturers/{id}
#[utoipa::path(
    put,
    path = "/api/manufacturers/{id}",
    tag = "Manufacturers",
    request_body = ManufacturerPayload,
    params(
        ("id" = Uuid, Path, description = "ID do fabricante"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Fabricante atualizado", body = Manufacturer),
        (status = 404, description = "Fabricante não encontrado"),
        (status = 409, description = "Já existe fabricante com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_manufacturer(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ManufacturerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let manufacturer = app_state
        .manufacturer_repo
        .update_manufacturer(studio.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(manufacturer)))
}

// DELETE /api/manufacturers/{id}
#[utoipa::path(
    delete,
    path = "/api/manufacturers/{id}",
    tag = "Manufacturers",
    params(
        ("id" = Uuid, Path, description = "ID do fabricante"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 204, description = "Fabricante removido; materiais ficam sem fabricante"),
        (status = 404, description = "Fabricante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_manufacturer(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .manufacturer_repo
        .delete_manufacturer(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
