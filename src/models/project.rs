// src/models/project.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    #[schema(ignore)]
    pub studio_id: Uuid,
    #[schema(example = "Apartamento Vila Madalena")]
    pub name: String,
    pub client_name: Option<String>,
    pub status: ProjectStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    #[validate(length(min = 1, message = "O nome do projeto é obrigatório."))]
    pub name: String,
    pub client_name: Option<String>,
    // Padrão: planning
    pub status: Option<ProjectStatus>,
    pub notes: Option<String>,
}

// --- Ponte Projeto x Material ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMaterial {
    pub project_id: Uuid,
    pub material_id: Uuid,
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Linha da listagem de materiais de um projeto (JOIN)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMaterialEntry {
    pub material_id: Uuid,
    pub name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub manufacturer_name: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<Decimal>,
    pub notes: Option<String>,
    pub linked_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LinkMaterialPayload {
    pub material_id: Uuid,
    #[validate(custom(function = "crate::models::material::validate_not_negative"))]
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<Decimal>,
    pub notes: Option<String>,
}
