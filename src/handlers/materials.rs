// src/handlers/materials.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, tenancy::StudioContext},
    models::{
        material::{Material, MaterialCreated, MaterialCreation, MaterialPayload},
        quota::QuotaStatus,
    },
};

// Validação padrão + regra de consistência (preço por unidade exige unidade)
fn validate_payload(
    payload: &MaterialPayload,
    locale: &Locale,
    app_state: &AppState,
) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(locale, &app_state.i18n_store))?;

    payload.validate_consistency().map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        errors.add("unitType", e);
        AppError::ValidationError(errors).to_api_error(locale, &app_state.i18n_store)
    })
}

// POST /api/materials
#[utoipa::path(
    post,
    path = "/api/materials",
    tag = "Materials",
    request_body = MaterialPayload,
    responses(
        (status = 201, description = "Material criado e contado na cota do mês", body = MaterialCreated),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Limite mensal atingido; `details.quota` traz o estado para a escolha de upgrade/cobrança por material")
    ),
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_material(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    studio: StudioContext,
    Json(payload): Json<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;

    let outcome = app_state
        .material_service
        .create_material(studio.0, user.0.id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    match outcome {
        MaterialCreation::Created(created) => Ok((StatusCode::CREATED, Json(created))),
        // Não é falha: a tela precisa oferecer "pedir upgrade" ou "cobrar por material"
        MaterialCreation::LimitReached(state) => Err(ApiError {
            status: StatusCode::CONFLICT,
            error: app_state.i18n_store.translate(&locale.0, "quota.limit_reached"),
            details: Some(json!({
                "quota": QuotaStatus::new(state, None),
                "options": ["upgrade_pending", "per_material"],
            })),
        }),
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMaterialsQuery {
    /// Categoria exata
    pub category: Option<String>,
    /// Busca parcial pelo nome
    pub search: Option<String>,
}

// GET /api/materials
#[utoipa::path(
    get,
    path = "/api/materials",
    tag = "Materials",
    params(
        ListMaterialsQuery,
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Materiais do estúdio", body = Vec<Material>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Query(query): Query<ListMaterialsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let materials = app_state
        .material_service
        .list_materials(
            studio.0,
            query.category.as_deref().filter(|c| !c.is_empty()),
            query.search.as_deref().filter(|s| !s.is_empty()),
        )
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(materials)))
}

// GET /api/materials/{id}
#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(
        ("id" = Uuid, Path, description = "ID do material"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Material", body = Material),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_material(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let material = app_state
        .material_service
        .get_material(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// PUT /api/materials/{id}
#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    tag = "Materials",
    request_body = MaterialPayload,
    params(
        ("id" = Uuid, Path, description = "ID do material"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Material atualizado", body = Material),
        (status = 404, description = "Material ou fabricante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_material(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate_payload(&payload, &locale, &app_state)?;

    let material = app_state
        .material_service
        .update_material(studio.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(material)))
}

// DELETE /api/materials/{id}
#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    tag = "Materials",
    params(
        ("id" = Uuid, Path, description = "ID do material"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 204, description = "Material removido"),
        (status = 404, description = "Material não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_material(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .material_service
        .delete_material(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
