// src/db/manufacturer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::manufacturer::{Manufacturer, ManufacturerPayload},
};

#[derive(Clone)]
pub struct ManufacturerRepository {
    pool: PgPool,
}

// Nome duplicado dentro do mesmo estúdio vira 409
fn map_unique_name(e: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::ManufacturerNameAlreadyExists(name.to_string());
        }
    }
    e.into()
}

impl ManufacturerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_manufacturers(&self, studio_id: Uuid) -> Result<Vec<Manufacturer>, AppError> {
        let manufacturers = sqlx::query_as::<_, Manufacturer>(
            "SELECT * FROM manufacturers WHERE studio_id = $1 ORDER BY name ASC",
        )
            .bind(studio_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(manufacturers)
    }

    pub async fn find_manufacturer<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Manufacturer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manufacturer = sqlx::query_as::<_, Manufacturer>(
            "SELECT * FROM manufacturers WHERE studio_id = $1 AND id = $2",
        )
            .bind(studio_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(manufacturer)
    }

    pub async fn create_manufacturer(
        &self,
        studio_id: Uuid,
        input: &ManufacturerPayload,
    ) -> Result<Manufacturer, AppError> {
        sqlx::query_as::<_, Manufacturer>(
            r#"
            INSERT INTO manufacturers (studio_id, name, website, contact_email, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(&input.name)
            .bind(input.website.as_deref())
            .bind(input.contact_email.as_deref())
            .bind(input.notes.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_name(e, &input.name))
    }

    pub async fn update_manufacturer(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: &ManufacturerPayload,
    ) -> Result<Manufacturer, AppError> {
        sqlx::query_as::<_, Manufacturer>(
            r#"
            UPDATE manufacturers SET
                name = $3,
                website = $4,
                contact_email = $5,
                notes = $6,
                updated_at = NOW()
            WHERE studio_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(id)
            .bind(&input.name)
            .bind(input.website.as_deref())
            .bind(input.contact_email.as_deref())
            .bind(input.notes.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_unique_name(e, &input.name))?
            .ok_or(AppError::ManufacturerNotFound)
    }

    // Materiais que apontavam para ele ficam sem fabricante (ON DELETE SET NULL)
    pub async fn delete_manufacturer(&self, studio_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM manufacturers WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ManufacturerNotFound);
        }
        Ok(())
    }
}
