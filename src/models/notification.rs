// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    UpgradeRequest,
    NewLead,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::UpgradeRequest => "upgrade_request",
            NotificationKind::NewLead => "new_lead",
        }
    }
}

// Caixa de entrada da equipe (pedidos de upgrade, novos leads)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub studio_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    #[schema(example = "upgrade_request")]
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
