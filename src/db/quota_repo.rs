// src/db/quota_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::material_repo::insert_material,
    models::{
        material::{Material, MaterialPayload},
        quota::{BillingPreference, MaterialOverage, NewOverage, StudioQuotaRow},
    },
};

/// O "armazenamento" que a cota enxerga.
/// Cada método é UMA instrução no banco; a atomicidade do conjunto fica
/// por conta de quem abriu a transação.
#[async_trait]
pub trait QuotaStore: Send {
    /// Instante de referência da operação. No Postgres é o `NOW()` da transação,
    /// o mesmo valor que os `DEFAULT NOW()` gravam.
    async fn clock(&mut self) -> Result<DateTime<Utc>, AppError>;

    async fn load_quota(&mut self, studio_id: Uuid) -> Result<Option<StudioQuotaRow>, AppError>;

    async fn count_materials_between(
        &mut self,
        studio_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, AppError>;

    async fn store_month_count(
        &mut self,
        studio_id: Uuid,
        month: &str,
        count: i64,
    ) -> Result<(), AppError>;

    /// Incremento atômico. Se o mês gravado não for `month`, o contador recomeça em 1.
    /// Retorna o valor já incrementado.
    async fn increment_month_count(&mut self, studio_id: Uuid, month: &str) -> Result<i64, AppError>;

    /// Retorna `false` se o estúdio não existe.
    async fn store_billing_preference(
        &mut self,
        studio_id: Uuid,
        preference: BillingPreference,
    ) -> Result<bool, AppError>;

    async fn upsert_overage(&mut self, overage: &NewOverage) -> Result<MaterialOverage, AppError>;

    async fn find_overage(
        &mut self,
        studio_id: Uuid,
        month: &str,
    ) -> Result<Option<MaterialOverage>, AppError>;
}

/// O que a criação de material precisa além da cota, na mesma transação.
#[async_trait]
pub trait MaterialStore: QuotaStore {
    async fn manufacturer_in_studio(&mut self, studio_id: Uuid, manufacturer_id: Uuid) -> Result<bool, AppError>;

    async fn insert_material(
        &mut self,
        studio_id: Uuid,
        input: &MaterialPayload,
        created_at: DateTime<Utc>,
    ) -> Result<Material, AppError>;
}

// ---
// Implementação Postgres
// ---
// Empresta uma conexão (ou `&mut *tx`) para participar da transação do chamador.
pub struct PgQuotaStore<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> PgQuotaStore<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl QuotaStore for PgQuotaStore<'_> {
    async fn clock(&mut self) -> Result<DateTime<Utc>, AppError> {
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(now)
    }

    async fn load_quota(&mut self, studio_id: Uuid) -> Result<Option<StudioQuotaRow>, AppError> {
        // FOR UPDATE: dentro de uma transação serializa as criações concorrentes
        // do mesmo estúdio. Fora de transação o lock dura só a instrução.
        let row = sqlx::query_as::<_, StudioQuotaRow>(
            r#"
            SELECT id, subscription_tier, current_month, current_month_materials, billing_preference
            FROM studios
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(studio_id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row)
    }

    async fn count_materials_between(
        &mut self,
        studio_id: Uuid,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM materials
            WHERE studio_id = $1 AND created_at >= $2 AND created_at < $3
            "#,
        )
            .bind(studio_id)
            .bind(from)
            .bind(until)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }

    async fn store_month_count(
        &mut self,
        studio_id: Uuid,
        month: &str,
        count: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE studios
            SET current_month = $2, current_month_materials = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
            .bind(studio_id)
            .bind(month)
            .bind(count)
            .execute(&mut *self.conn)
            .await?;

        Ok(())
    }

    async fn increment_month_count(&mut self, studio_id: Uuid, month: &str) -> Result<i64, AppError> {
        // Um único UPDATE condicional: sem ler-e-depois-escrever,
        // então duas inserções simultâneas não perdem incremento.
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE studios
            SET current_month_materials = CASE
                    WHEN current_month = $2 THEN current_month_materials + 1
                    ELSE 1
                END,
                current_month = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING current_month_materials
            "#,
        )
            .bind(studio_id)
            .bind(month)
            .fetch_optional(&mut *self.conn)
            .await?;

        count.ok_or(AppError::StudioNotFound)
    }

    async fn store_billing_preference(
        &mut self,
        studio_id: Uuid,
        preference: BillingPreference,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE studios SET billing_preference = $2, updated_at = NOW() WHERE id = $1",
        )
            .bind(studio_id)
            .bind(preference)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_overage(&mut self, overage: &NewOverage) -> Result<MaterialOverage, AppError> {
        // Uma linha por estúdio/mês: recalcular o mesmo mês sobrescreve.
        let row = sqlx::query_as::<_, MaterialOverage>(
            r#"
            INSERT INTO material_overages (studio_id, user_id, month_year, overage_count, total_charge)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (studio_id, month_year)
            DO UPDATE SET
                user_id = EXCLUDED.user_id,
                overage_count = EXCLUDED.overage_count,
                total_charge = EXCLUDED.total_charge,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(overage.studio_id)
            .bind(overage.user_id)
            .bind(&overage.month_year)
            .bind(overage.overage_count)
            .bind(overage.total_charge)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(row)
    }

    async fn find_overage(
        &mut self,
        studio_id: Uuid,
        month: &str,
    ) -> Result<Option<MaterialOverage>, AppError> {
        let row = sqlx::query_as::<_, MaterialOverage>(
            "SELECT * FROM material_overages WHERE studio_id = $1 AND month_year = $2",
        )
            .bind(studio_id)
            .bind(month)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl MaterialStore for PgQuotaStore<'_> {
    async fn manufacturer_in_studio(&mut self, studio_id: Uuid, manufacturer_id: Uuid) -> Result<bool, AppError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM manufacturers WHERE studio_id = $1 AND id = $2)",
        )
            .bind(studio_id)
            .bind(manufacturer_id)
            .fetch_one(&mut *self.conn)
            .await?;
        Ok(found)
    }

    async fn insert_material(
        &mut self,
        studio_id: Uuid,
        input: &MaterialPayload,
        created_at: DateTime<Utc>,
    ) -> Result<Material, AppError> {
        insert_material(&mut *self.conn, studio_id, input, created_at).await
    }
}

// ---
// Implementação em memória (apenas testes)
// ---
#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;

    use super::*;

    #[derive(Default, Clone)]
    pub struct MemoryQuotaStore {
        /// Devolvido por `clock()`
        pub now: DateTime<Utc>,
        pub studios: HashMap<Uuid, StudioQuotaRow>,
        /// (studio_id, manufacturer_id)
        pub manufacturers: Vec<(Uuid, Uuid)>,
        pub inserted: Vec<Material>,
        /// (studio_id, created_at) de cada material
        pub materials: Vec<(Uuid, DateTime<Utc>)>,
        pub overages: HashMap<(Uuid, String), MaterialOverage>,
        pub writes: usize,
        /// Quando ligado, toda escrita falha como se o banco tivesse caído.
        pub fail_writes: bool,
        /// Só o incremento do contador falha.
        pub fail_increment: bool,
    }

    impl MemoryQuotaStore {
        pub fn with_studio(tier: &str, month: Option<&str>, count: i64, pref: BillingPreference) -> (Self, Uuid) {
            let id = Uuid::new_v4();
            let mut store = Self::default();
            store.studios.insert(
                id,
                StudioQuotaRow {
                    id,
                    subscription_tier: tier.to_string(),
                    current_month: month.map(str::to_string),
                    current_month_materials: count,
                    billing_preference: pref,
                },
            );
            (store, id)
        }

        pub fn add_materials(&mut self, studio_id: Uuid, at: DateTime<Utc>, n: usize) {
            self.materials.extend(std::iter::repeat_n((studio_id, at), n));
        }

        pub fn row(&self, studio_id: Uuid) -> &StudioQuotaRow {
            &self.studios[&studio_id]
        }

        fn check_write(&mut self) -> Result<(), AppError> {
            if self.fail_writes {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            self.writes += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl QuotaStore for MemoryQuotaStore {
        async fn clock(&mut self) -> Result<DateTime<Utc>, AppError> {
            Ok(self.now)
        }

        async fn load_quota(&mut self, studio_id: Uuid) -> Result<Option<StudioQuotaRow>, AppError> {
            Ok(self.studios.get(&studio_id).cloned())
        }

        async fn count_materials_between(
            &mut self,
            studio_id: Uuid,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<i64, AppError> {
            let count = self
                .materials
                .iter()
                .filter(|(id, at)| *id == studio_id && *at >= from && *at < until)
                .count();
            Ok(count as i64)
        }

        async fn store_month_count(&mut self, studio_id: Uuid, month: &str, count: i64) -> Result<(), AppError> {
            self.check_write()?;
            if let Some(row) = self.studios.get_mut(&studio_id) {
                row.current_month = Some(month.to_string());
                row.current_month_materials = count;
            }
            Ok(())
        }

        async fn increment_month_count(&mut self, studio_id: Uuid, month: &str) -> Result<i64, AppError> {
            if self.fail_increment {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            self.check_write()?;
            let row = self.studios.get_mut(&studio_id).ok_or(AppError::StudioNotFound)?;
            row.current_month_materials = if row.current_month.as_deref() == Some(month) {
                row.current_month_materials + 1
            } else {
                1
            };
            row.current_month = Some(month.to_string());
            Ok(row.current_month_materials)
        }

        async fn store_billing_preference(
            &mut self,
            studio_id: Uuid,
            preference: BillingPreference,
        ) -> Result<bool, AppError> {
            self.check_write()?;
            match self.studios.get_mut(&studio_id) {
                Some(row) => {
                    row.billing_preference = preference;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn upsert_overage(&mut self, overage: &NewOverage) -> Result<MaterialOverage, AppError> {
            self.check_write()?;
            let now = Utc::now();
            let key = (overage.studio_id, overage.month_year.clone());
            let entry = self.overages.entry(key).or_insert_with(|| MaterialOverage {
                id: Uuid::new_v4(),
                studio_id: overage.studio_id,
                user_id: None,
                month_year: overage.month_year.clone(),
                overage_count: 0,
                total_charge: Default::default(),
                created_at: now,
                updated_at: now,
            });
            entry.user_id = Some(overage.user_id);
            entry.overage_count = overage.overage_count;
            entry.total_charge = overage.total_charge;
            entry.updated_at = now;
            Ok(entry.clone())
        }

        async fn find_overage(&mut self, studio_id: Uuid, month: &str) -> Result<Option<MaterialOverage>, AppError> {
            Ok(self.overages.get(&(studio_id, month.to_string())).cloned())
        }
    }

    #[async_trait]
    impl MaterialStore for MemoryQuotaStore {
        async fn manufacturer_in_studio(&mut self, studio_id: Uuid, manufacturer_id: Uuid) -> Result<bool, AppError> {
            Ok(self.manufacturers.contains(&(studio_id, manufacturer_id)))
        }

        async fn insert_material(
            &mut self,
            studio_id: Uuid,
            input: &MaterialPayload,
            created_at: DateTime<Utc>,
        ) -> Result<Material, AppError> {
            self.check_write()?;
            let material = Material {
                id: Uuid::new_v4(),
                studio_id,
                manufacturer_id: input.manufacturer_id,
                name: input.name.clone(),
                category: input.category.clone(),
                subcategory: input.subcategory.clone(),
                notes: input.notes.clone(),
                price_per_sqft: input.price_per_sqft,
                price_per_unit: input.price_per_unit,
                unit_type: input.unit_type.clone(),
                last_price_update: input.has_price().then_some(created_at),
                created_at,
                updated_at: created_at,
            };
            self.materials.push((studio_id, created_at));
            self.inserted.push(material.clone());
            Ok(material)
        }
    }
}
