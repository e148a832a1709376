// src/services/studio_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{quota_repo::PgQuotaStore, StudioRepository},
    models::{
        quota::SubscriptionTier,
        studio::{CreateStudioPayload, Studio, UpdateStudioPayload},
    },
    services::quota_service::QuotaTracker,
};

// Operações do painel do admin sobre os estúdios
#[derive(Clone)]
pub struct StudioService {
    studio_repo: StudioRepository,
    tracker: QuotaTracker,
    pool: PgPool,
}

impl StudioService {
    pub fn new(studio_repo: StudioRepository, tracker: QuotaTracker, pool: PgPool) -> Self {
        Self { studio_repo, tracker, pool }
    }

    pub async fn list_studios(&self) -> Result<Vec<Studio>, AppError> {
        self.studio_repo.list_studios().await
    }

    pub async fn get_studio(&self, id: Uuid) -> Result<Studio, AppError> {
        self.studio_repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::StudioNotFound)
    }

    pub async fn create_studio(&self, input: &CreateStudioPayload) -> Result<Studio, AppError> {
        let tier = input.subscription_tier.unwrap_or(SubscriptionTier::Starter);
        self.studio_repo
            .create_studio(&self.pool, &input.name, tier.as_str())
            .await
    }

    /// Edição do admin. Nome/plano e preferência de cobrança numa transação só;
    /// a preferência é validada e gravada pelo QuotaTracker.
    pub async fn update_studio(&self, id: Uuid, input: &UpdateStudioPayload) -> Result<Studio, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut studio = self.studio_repo
            .update_studio(
                &mut *tx,
                id,
                input.name.as_deref(),
                input.subscription_tier.map(|t| t.as_str()),
            )
            .await?;

        if let Some(raw) = input.billing_preference.as_deref() {
            let mut store = PgQuotaStore::new(&mut tx);
            studio.billing_preference = self.tracker.set_billing_preference(&mut store, id, raw).await?;
        }

        tx.commit().await?;

        tracing::info!(
            studio_id = %id,
            tier = %studio.subscription_tier,
            billing_preference = %studio.billing_preference,
            "Estúdio atualizado pelo admin"
        );
        Ok(studio)
    }

    pub async fn delete_studio(&self, id: Uuid) -> Result<(), AppError> {
        self.studio_repo.delete_studio(id).await?;
        tracing::warn!(studio_id = %id, "Estúdio removido pelo admin");
        Ok(())
    }
}
