// src/models/manufacturer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Cosentino")]
    pub name: String,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Serve para criar e para editar (PUT substitui o registro)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(url(message = "O site deve ser uma URL válida."))]
    #[schema(example = "https://www.cosentino.com")]
    pub website: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub contact_email: Option<String>,

    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_contact_fields_are_checked_when_present() {
        let mut payload = ManufacturerPayload {
            name: "Cosentino".into(),
            website: None,
            contact_email: None,
            notes: None,
        };
        assert!(payload.validate().is_ok());

        payload.website = Some("cosentino".into());
        payload.contact_email = Some("vendas@".into());
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("website"));
        assert_eq!(errors.field_errors().len(), 2);
    }
}
