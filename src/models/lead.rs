// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Inscrição na lista de espera (formulário público do site)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "ana@estudioluz.com")]
    pub email: String,

    #[validate(length(max = 200, message = "O nome é longo demais."))]
    pub full_name: Option<String>,

    #[schema(example = "Estúdio Luz")]
    pub company: Option<String>,

    #[schema(example = "checklist")]
    pub source: Option<String>,

    #[validate(length(max = 2000, message = "A mensagem é longa demais."))]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_a_valid_email() {
        let payload = CreateLeadPayload {
            email: "nao-e-email".into(),
            full_name: None,
            company: None,
            source: None,
            message: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
