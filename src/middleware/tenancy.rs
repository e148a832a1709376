// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// Cabeçalho usado pelo admin para escolher o estúdio
const STUDIO_ID_HEADER: &str = "x-studio-id";

// O estúdio em que a requisição opera
#[derive(Debug, Clone, Copy)]
pub struct StudioContext(pub Uuid);

fn header_studio_id(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    match headers.get(STUDIO_ID_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Some)
            .ok_or(AppError::StudioContextRequired),
    }
}

/// Regra de acesso:
/// - studio_user: sempre o próprio estúdio (o cabeçalho, se vier, tem que bater);
/// - admin: o estúdio do cabeçalho X-Studio-ID.
pub fn resolve_studio(user: &User, requested: Option<Uuid>) -> Result<Uuid, AppError> {
    if user.is_admin() {
        return requested.ok_or(AppError::StudioContextRequired);
    }

    let own = user.studio_id.ok_or(AppError::StudioAccessDenied)?;
    match requested {
        Some(id) if id != own => Err(AppError::StudioAccessDenied),
        _ => Ok(own),
    }
}

// Middleware: roda depois do auth_guard
pub async fn studio_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let to_api = |e: AppError| e.to_api_error(&locale, &app_state.i18n_store);

    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or(AppError::InvalidToken)
        .map_err(to_api)?;

    let requested = header_studio_id(request.headers()).map_err(to_api)?;
    let studio_id = resolve_studio(&user, requested).map_err(to_api)?;

    // O admin pode digitar qualquer UUID: confere se existe
    if user.is_admin() && !app_state.studio_repo.exists(studio_id).await.map_err(to_api)? {
        return Err(to_api(AppError::StudioNotFound));
    }

    request.extensions_mut().insert(StudioContext(studio_id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for StudioContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<StudioContext>()
            .copied()
            .ok_or(AppError::StudioContextRequired)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Utc;

    use super::*;
    use crate::models::auth::UserRole;

    fn user(role: UserRole, studio_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@estudioluz.com".into(),
            password_hash: String::new(),
            full_name: None,
            role,
            studio_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn studio_user_is_pinned_to_own_studio() {
        let own = Uuid::new_v4();
        let member = user(UserRole::StudioUser, Some(own));

        assert_eq!(resolve_studio(&member, None).unwrap(), own);
        assert_eq!(resolve_studio(&member, Some(own)).unwrap(), own);
        assert!(matches!(
            resolve_studio(&member, Some(Uuid::new_v4())),
            Err(AppError::StudioAccessDenied)
        ));
    }

    #[test]
    fn studio_user_without_studio_is_denied() {
        let orphan = user(UserRole::StudioUser, None);
        assert!(matches!(resolve_studio(&orphan, None), Err(AppError::StudioAccessDenied)));
    }

    #[test]
    fn admin_must_pick_a_studio() {
        let admin = user(UserRole::Admin, None);
        let target = Uuid::new_v4();

        assert!(matches!(resolve_studio(&admin, None), Err(AppError::StudioContextRequired)));
        assert_eq!(resolve_studio(&admin, Some(target)).unwrap(), target);
    }

    #[test]
    fn malformed_header_is_rejected() {
        let mut headers = HeaderMap::new();
        assert!(header_studio_id(&headers).unwrap().is_none());

        headers.insert(STUDIO_ID_HEADER, HeaderValue::from_static("loja-1"));
        assert!(header_studio_id(&headers).is_err());

        let id = Uuid::new_v4();
        headers.insert(STUDIO_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(header_studio_id(&headers).unwrap(), Some(id));
    }
}
