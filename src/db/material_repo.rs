// src/db/material_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::material::{Material, MaterialPayload},
};

#[derive(Clone)]
pub struct MaterialRepository {
    pool: PgPool,
}

impl MaterialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Leitura
    // ---

    /// Filtros opcionais: categoria exata e busca parcial pelo nome.
    pub async fn list_materials(
        &self,
        studio_id: Uuid,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Material>, AppError> {
        let materials = sqlx::query_as::<_, Material>(
            r#"
            SELECT * FROM materials
            WHERE studio_id = $1
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
            ORDER BY created_at DESC
            "#,
        )
            .bind(studio_id)
            .bind(category)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;
        Ok(materials)
    }

    pub async fn find_material<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Material>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let material = sqlx::query_as::<_, Material>(
            "SELECT * FROM materials WHERE studio_id = $1 AND id = $2",
        )
            .bind(studio_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(material)
    }

    // ---
    // Escrita
    // ---

    /// PUT completo. `last_price_update` só muda quando algum preço muda de fato.
    pub async fn update_material<'e, E>(
        &self,
        executor: E,
        studio_id: Uuid,
        id: Uuid,
        input: &MaterialPayload,
    ) -> Result<Material, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Material>(
            r#"
            UPDATE materials SET
                manufacturer_id = $3,
                name = $4,
                category = $5,
                subcategory = $6,
                notes = $7,
                last_price_update = CASE
                    WHEN price_per_sqft IS DISTINCT FROM $8 OR price_per_unit IS DISTINCT FROM $9
                    THEN NOW()
                    ELSE last_price_update
                END,
                price_per_sqft = $8,
                price_per_unit = $9,
                unit_type = $10,
                updated_at = NOW()
            WHERE studio_id = $1 AND id = $2
            RETURNING *
            "#,
        )
            .bind(studio_id)
            .bind(id)
            .bind(input.manufacturer_id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.subcategory.as_deref())
            .bind(input.notes.as_deref())
            .bind(input.price_per_sqft)
            .bind(input.price_per_unit)
            .bind(input.unit_type.as_deref())
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::MaterialNotFound)
    }

    // O contador mensal não é decrementado aqui: o reconcile recalcula na próxima leitura.
    pub async fn delete_material(&self, studio_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM materials WHERE studio_id = $1 AND id = $2")
            .bind(studio_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::MaterialNotFound);
        }
        Ok(())
    }
}

/// INSERT do material. Quem chama é responsável pela cota (mesma transação).
/// `created_at` vem do relógio da transação para cair no mesmo mês que a cota conta.
pub(crate) async fn insert_material<'e, E>(
    executor: E,
    studio_id: Uuid,
    input: &MaterialPayload,
    created_at: DateTime<Utc>,
) -> Result<Material, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let material = sqlx::query_as::<_, Material>(
        r#"
        INSERT INTO materials (
            studio_id, manufacturer_id, name, category, subcategory, notes,
            price_per_sqft, price_per_unit, unit_type, last_price_update,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, CASE WHEN $10::boolean THEN $11 END, $11, $11)
        RETURNING *
        "#,
    )
        .bind(studio_id)
        .bind(input.manufacturer_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.subcategory.as_deref())
        .bind(input.notes.as_deref())
        .bind(input.price_per_sqft)
        .bind(input.price_per_unit)
        .bind(input.unit_type.as_deref())
        .bind(input.has_price())
        .bind(created_at)
        .fetch_one(executor)
        .await?;
    Ok(material)
}
