// src/handlers/projects.rs

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
    models::project::{
        LinkMaterialPayload, Project, ProjectMaterial, ProjectMaterialEntry, ProjectPayload,
    },
};

// GET /api/projects
#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Projetos do estúdio", body = Vec<Project>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
) -> Result<impl IntoResponse, ApiError> {
    let projects = app_state
        .project_service
        .list_projects(studio.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(projects)))
}

// POST /api/projects
#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = ProjectPayload,
    params(
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 201, description = "Projeto criado", body = Project),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Json(payload): Json<ProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state
        .project_service
        .create_project(studio.0, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(project)))
}

// GET /api/projects/{id}
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Projeto", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let project = app_state
        .project_service
        .get_project(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// PUT /api/projects/{id}
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    request_body = ProjectPayload,
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Projeto atualizado", body = Project),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProjectPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let project = app_state
        .project_service
        .update_project(studio.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(project)))
}

// DELETE /api/projects/{id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 204, description = "Projeto removido"),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .project_service
        .delete_project(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/projects/{id}/materials
#[utoipa::path(
    get,
    path = "/api/projects/{id}/materials",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 200, description = "Materiais especificados no projeto", body = Vec<ProjectMaterialEntry>),
        (status = 404, description = "Projeto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_project_materials(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entries = app_state
        .project_service
        .list_project_materials(studio.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/projects/{id}/materials
#[utoipa::path(
    post,
    path = "/api/projects/{id}/materials",
    tag = "Projects",
    request_body = LinkMaterialPayload,
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 201, description = "Material vinculado", body = ProjectMaterial),
        (status = 404, description = "Projeto ou material não encontrado"),
        (status = 409, description = "Material já vinculado a este projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn link_material(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkMaterialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let link = app_state
        .project_service
        .link_material(studio.0, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(link)))
}

// DELETE /api/projects/{id}/materials/{material_id}
#[utoipa::path(
    delete,
    path = "/api/projects/{id}/materials/{material_id}",
    tag = "Projects",
    params(
        ("id" = Uuid, Path, description = "ID do projeto"),
        ("material_id" = Uuid, Path, description = "ID do material"),
        ("x-studio-id" = Option<Uuid>, Header, description = "ID do Estúdio (obrigatório para admin)")
    ),
    responses(
        (status = 204, description = "Vínculo removido"),
        (status = 404, description = "Vínculo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn unlink_material(
    State(app_state): State<AppState>,
    locale: Locale,
    studio: StudioContext,
    Path((id, material_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .project_service
        .unlink_material(studio.0, id, material_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
