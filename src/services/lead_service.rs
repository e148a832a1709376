// src/services/lead_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{LeadRepository, NotificationRepository},
    models::{
        lead::{CreateLeadPayload, Lead},
        notification::NotificationKind,
    },
};

// Lista de espera do site: grava o lead e avisa a equipe
#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    notification_repo: NotificationRepository,
    pool: PgPool,
}

impl LeadService {
    pub fn new(lead_repo: LeadRepository, notification_repo: NotificationRepository, pool: PgPool) -> Self {
        Self { lead_repo, notification_repo, pool }
    }

    pub async fn capture_lead(&self, input: &CreateLeadPayload) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let lead = self.lead_repo.create_lead(&mut *tx, input).await?;

        let message = match &lead.company {
            Some(company) => format!("Novo lead: {} ({})", lead.email, company),
            None => format!("Novo lead: {}", lead.email),
        };
        self.notification_repo
            .create_notification(&mut *tx, None, None, NotificationKind::NewLead, &message)
            .await?;

        tx.commit().await?;

        tracing::info!(
            lead_id = %lead.id,
            email = %lead.email,
            source = lead.source.as_deref().unwrap_or("site"),
            "📨 Novo lead na lista de espera"
        );
        Ok(lead)
    }
}
