// src/db/studio_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{common::error::AppError, models::studio::Studio};

#[derive(Clone)]
pub struct StudioRepository {
    pool: PgPool,
}

impl StudioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Studio>, AppError> {
        let studio = sqlx::query_as::<_, Studio>("SELECT * FROM studios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(studio)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM studios WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    pub async fn list_studios(&self) -> Result<Vec<Studio>, AppError> {
        let studios = sqlx::query_as::<_, Studio>("SELECT * FROM studios ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(studios)
    }

    /// Cria um estúdio novo. A cota começa zerada e bloqueada no limite.
    pub async fn create_studio<'e, E>(
        &self,
        executor: E,
        name: &str,
        subscription_tier: &str,
    ) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let studio = sqlx::query_as::<_, Studio>(
            r#"
            INSERT INTO studios (name, subscription_tier)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
            .bind(name)
            .bind(subscription_tier)
            .fetch_one(executor)
            .await?;
        Ok(studio)
    }

    // Nome e plano. A preferência de cobrança passa pelo QuotaTracker.
    pub async fn update_studio<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        subscription_tier: Option<&str>,
    ) -> Result<Studio, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Studio>(
            r#"
            UPDATE studios SET
                name = COALESCE($2, name),
                subscription_tier = COALESCE($3, subscription_tier),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
            .bind(id)
            .bind(name)
            .bind(subscription_tier)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::StudioNotFound)
    }

    pub async fn delete_studio(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM studios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::StudioNotFound);
        }
        Ok(())
    }
}
