// src/handlers/admin.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        auth::{CreateUserPayload, UpdateUserPayload, User},
        notification::Notification,
        studio::{CreateStudioPayload, Studio, UpdateStudioPayload},
    },
};

const NOTIFICATIONS_PAGE: i64 = 100;

// ---
// Estúdios
// ---

// GET /api/admin/studios
#[utoipa::path(
    get,
    path = "/api/admin/studios",
    tag = "Admin",
    responses(
        (status = 200, description = "Todos os estúdios, com o contador do mês", body = Vec<Studio>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_studios(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let studios = app_state
        .studio_service
        .list_studios()
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(studios)))
}

// POST /api/admin/studios
#[utoipa::path(
    post,
    path = "/api/admin/studios",
    tag = "Admin",
    request_body = CreateStudioPayload,
    responses(
        (status = 201, description = "Estúdio criado", body = Studio),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateStudioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let studio = app_state
        .studio_service
        .create_studio(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(studio)))
}

// GET /api/admin/studios/{id}
#[utoipa::path(
    get,
    path = "/api/admin/studios/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do estúdio")),
    responses(
        (status = 200, description = "Estúdio", body = Studio),
        (status = 404, description = "Estúdio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let studio = app_state
        .studio_service
        .get_studio(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(studio)))
}

// PUT /api/admin/studios/{id}
#[utoipa::path(
    put,
    path = "/api/admin/studios/{id}",
    tag = "Admin",
    request_body = UpdateStudioPayload,
    params(("id" = Uuid, Path, description = "ID do estúdio")),
    responses(
        (status = 200, description = "Estúdio atualizado", body = Studio),
        (status = 400, description = "Preferência de cobrança inválida"),
        (status = 404, description = "Estúdio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStudioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let studio = app_state
        .studio_service
        .update_studio(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(studio)))
}

// DELETE /api/admin/studios/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/studios/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do estúdio")),
    responses(
        (status = 204, description = "Estúdio e todos os seus dados removidos"),
        (status = 404, description = "Estúdio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .studio_service
        .delete_studio(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Usuários
// ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    /// Filtra pelos usuários de um estúdio
    pub studio_id: Option<Uuid>,
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Usuários", body = Vec<User>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .user_repo
        .list_users(query.studio_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 404, description = "Estúdio não encontrado"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .auth_service
        .create_user(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/admin/users/{id}
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 404, description = "Usuário ou estúdio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .auth_service
        .update_user(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/admin/users/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_repo
        .delete_user(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Notificações (pedidos de upgrade, novos leads)
// ---

// GET /api/admin/notifications
#[utoipa::path(
    get,
    path = "/api/admin/notifications",
    tag = "Admin",
    responses(
        (status = 200, description = "Notificações mais recentes primeiro", body = Vec<Notification>),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let notifications = app_state
        .notification_repo
        .list_notifications(NOTIFICATIONS_PAGE)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(notifications)))
}
