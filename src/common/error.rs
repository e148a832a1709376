// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::{I18nStore, DEFAULT_STORE},
    middleware::i18n::Locale,
};

// Erro de domínio. Os services e repositórios só conhecem este tipo.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Estúdio não encontrado")]
    StudioNotFound,

    #[error("Contexto de estúdio ausente")]
    StudioContextRequired,

    #[error("Sem acesso ao estúdio")]
    StudioAccessDenied,

    #[error("Material não encontrado")]
    MaterialNotFound,

    #[error("Material já vinculado ao projeto")]
    MaterialAlreadyLinked,

    #[error("Fabricante não encontrado")]
    ManufacturerNotFound,

    #[error("Fabricante '{0}' já existe")]
    ManufacturerNameAlreadyExists(String),

    #[error("Projeto não encontrado")]
    ProjectNotFound,

    #[error("Preferência de cobrança inválida: {0}")]
    InvalidBillingPreference(String),

    // Falha de leitura/escrita no banco. Nunca engolir: pode desalinhar a cota.
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro "HTTP": status + mensagem já traduzida + detalhes opcionais.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidBillingPreference(_) => StatusCode::BAD_REQUEST,
            AppError::StudioContextRequired => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::StudioAccessDenied => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::StudioNotFound
            | AppError::MaterialNotFound
            | AppError::ManufacturerNotFound
            | AppError::ProjectNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::ManufacturerNameAlreadyExists(_)
            | AppError::MaterialAlreadyLinked => StatusCode::CONFLICT,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio em resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let status = self.status_code();

        let message = match self {
            AppError::ValidationError(errors) => {
                return ApiError {
                    status,
                    error: store.translate(lang, "validation.failed"),
                    details: Some(validation_details(errors)),
                };
            }
            AppError::EmailAlreadyExists => store.translate(lang, "auth.email_exists"),
            AppError::InvalidCredentials => store.translate(lang, "auth.invalid_credentials"),
            AppError::InvalidToken => store.translate(lang, "auth.invalid_token"),
            AppError::Forbidden => store.translate(lang, "auth.forbidden"),
            AppError::UserNotFound => store.translate(lang, "user.not_found"),
            AppError::StudioNotFound => store.translate(lang, "studio.not_found"),
            AppError::StudioContextRequired => store.translate(lang, "studio.context_required"),
            AppError::StudioAccessDenied => store.translate(lang, "studio.access_denied"),
            AppError::MaterialNotFound => store.translate(lang, "material.not_found"),
            AppError::MaterialAlreadyLinked => store.translate(lang, "material.already_linked"),
            AppError::ManufacturerNotFound => store.translate(lang, "manufacturer.not_found"),
            AppError::ManufacturerNameAlreadyExists(name) => {
                store.translate_with(lang, "manufacturer.name_exists", name)
            }
            AppError::ProjectNotFound => store.translate(lang, "project.not_found"),
            AppError::InvalidBillingPreference(value) => {
                store.translate_with(lang, "quota.invalid_preference", value)
            }
            // Todos os outros viram 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                store.translate(lang, "internal")
            }
        };

        ApiError::new(status, message)
    }
}

// Usado pelos handlers que devolvem AppError direto (ex: middleware de auth).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), &DEFAULT_STORE).into_response()
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| match &e.message {
                Some(m) => m.to_string(),
                None => e.code.to_string(),
            })
            .collect();
        details.insert(field.to_string(), json!(messages));
    }
    Value::Object(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn maps_domain_errors_to_status() {
        assert_eq!(AppError::MaterialNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::StudioAccessDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::InvalidBillingPreference("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn translates_messages_with_arguments() {
        let err = AppError::ManufacturerNameAlreadyExists("Dekton".into());
        let api = err.to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "Já existe um fabricante chamado 'Dekton'.");
    }

    #[test]
    fn hides_internal_details() {
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão recusada em 10.0.0.3"));
        let api = err.to_api_error(&Locale::default(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("10.0.0.3"));
    }

    #[test]
    fn validation_errors_keep_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("O nome é obrigatório.".into());
        errors.add("name", err);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["name"][0], "O nome é obrigatório.");
    }
}
