// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
};

/// 1. O Trait que define quais papéis passam
pub trait RoleDef: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<User>()
            .ok_or(AppError::InvalidToken)?;

        if !T::allowed().contains(&user.role) {
            tracing::warn!(user_id = %user.id, role = ?user.role, "Acesso negado por papel");
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS (TIPOS)
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allowed() -> &'static [UserRole] { &[UserRole::Admin] }
}
