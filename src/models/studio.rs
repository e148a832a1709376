// src/models/studio.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::quota::{BillingPreference, SubscriptionTier};

// ---
// Studio (o "Tenant")
// ---
// O escritório de design dono dos materiais, projetos e usuários.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    pub id: Uuid,

    #[schema(example = "Estúdio Luz")]
    pub name: String,

    // Texto livre no banco; valores desconhecidos caem no limite padrão
    #[schema(example = "starter")]
    pub subscription_tier: String,

    #[schema(example = "2024-06")]
    pub current_month: Option<String>,
    pub current_month_materials: i64,
    pub billing_preference: BillingPreference,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudioPayload {
    #[validate(length(min = 1, message = "O nome do estúdio é obrigatório."))]
    pub name: String,

    // Padrão: starter
    pub subscription_tier: Option<SubscriptionTier>,
}

// Formulário de edição do admin. Campos ausentes ficam como estão.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudioPayload {
    #[validate(length(min = 1, message = "O nome do estúdio não pode ficar vazio."))]
    pub name: Option<String>,

    pub subscription_tier: Option<SubscriptionTier>,

    // Validado contra BillingPreference no service
    #[schema(example = "per_material")]
    pub billing_preference: Option<String>,
}
