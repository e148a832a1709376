// src/models/material.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::quota::{MaterialOverage, QuotaState};

// --- Material (o item do catálogo do estúdio) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    pub manufacturer_id: Option<Uuid>,

    #[schema(example = "Dekton Entzo")]
    pub name: String,
    #[schema(example = "Bancadas")]
    pub category: String,
    #[schema(example = "Porcelanato")]
    pub subcategory: Option<String>,
    pub notes: Option<String>,

    // Preço
    #[schema(value_type = Option<f64>, example = 42.5)]
    pub price_per_sqft: Option<Decimal>,
    #[schema(value_type = Option<f64>)]
    pub price_per_unit: Option<Decimal>,
    #[schema(example = "placa")]
    pub unit_type: Option<String>,
    pub last_price_update: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// Formulário de material (criação e edição)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(length(min = 1, message = "A categoria é obrigatória."))]
    pub category: String,

    pub subcategory: Option<String>,
    pub manufacturer_id: Option<Uuid>,
    pub notes: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>)]
    pub price_per_sqft: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(value_type = Option<f64>)]
    pub price_per_unit: Option<Decimal>,

    pub unit_type: Option<String>,
}

impl MaterialPayload {
    /// Regra: preço por unidade precisa dizer qual é a unidade.
    pub fn validate_consistency(&self) -> Result<(), ValidationError> {
        let has_unit = self.unit_type.as_deref().is_some_and(|u| !u.trim().is_empty());
        if self.price_per_unit.is_some() && !has_unit {
            let mut err = ValidationError::new("UnitTypeRequiredForUnitPrice");
            err.message = Some("Informe a unidade quando houver preço por unidade.".into());
            return Err(err);
        }
        Ok(())
    }

    pub fn has_price(&self) -> bool {
        self.price_per_sqft.is_some() || self.price_per_unit.is_some()
    }
}

// Resposta do POST /api/materials
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCreated {
    pub material: Material,
    pub quota: QuotaState,
    pub overage: Option<MaterialOverage>,
}

/// Resultado da criação: o limite atingido é um desfecho normal, não um erro.
#[derive(Debug)]
pub enum MaterialCreation {
    Created(MaterialCreated),
    LimitReached(QuotaState),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> MaterialPayload {
        MaterialPayload {
            name: "Dekton Entzo".into(),
            category: "Bancadas".into(),
            subcategory: None,
            manufacturer_id: None,
            notes: None,
            price_per_sqft: None,
            price_per_unit: None,
            unit_type: None,
        }
    }

    #[test]
    fn rejects_negative_prices() {
        let mut p = payload();
        p.price_per_sqft = Some(Decimal::new(-1, 0));
        assert!(p.validate().is_err());

        p.price_per_sqft = Some(Decimal::new(4250, 2));
        assert!(p.validate().is_ok());
        assert!(p.has_price());
    }

    #[test]
    fn unit_price_requires_unit_type() {
        let mut p = payload();
        p.price_per_unit = Some(Decimal::new(120, 0));
        assert!(p.validate_consistency().is_err());

        p.unit_type = Some("  ".into());
        assert!(p.validate_consistency().is_err());

        p.unit_type = Some("placa".into());
        assert!(p.validate_consistency().is_ok());
    }
}
