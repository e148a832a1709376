// src/services/material_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        quota_repo::{MaterialStore, PgQuotaStore},
        ManufacturerRepository, MaterialRepository,
    },
    models::material::{Material, MaterialCreated, MaterialCreation, MaterialPayload},
    services::quota_service::QuotaTracker,
};

/// Os passos da criação, sobre qualquer `MaterialStore`:
/// relógio da transação, reconcile, `can_add`, fabricante, INSERT e contagem.
/// A data do mês e o `created_at` do material saem do mesmo instante.
pub(crate) async fn create_in_store<S>(
    tracker: &QuotaTracker,
    store: &mut S,
    studio_id: Uuid,
    user_id: Uuid,
    input: &MaterialPayload,
) -> Result<MaterialCreation, AppError>
where
    S: MaterialStore + ?Sized,
{
    let now = store.clock().await?;
    let today = now.date_naive();

    // 1. Reconcile (no Postgres o SELECT ... FOR UPDATE segura outras criações do estúdio)
    let state = tracker.reconcile(&mut *store, studio_id, today).await?;

    // 2. Limite atingido: devolve o estado para a tela de escolha, sem inserir
    if !state.can_add() {
        tracing::info!(
            %studio_id,
            count = state.monthly_count,
            limit = state.monthly_limit,
            "Limite mensal de materiais atingido"
        );
        return Ok(MaterialCreation::LimitReached(state));
    }

    // 3. O fabricante precisa ser do mesmo estúdio
    if let Some(manufacturer_id) = input.manufacturer_id {
        if !store.manufacturer_in_studio(studio_id, manufacturer_id).await? {
            return Err(AppError::ManufacturerNotFound);
        }
    }

    // 4. INSERT com o mesmo instante usado para o mês
    let material = store.insert_material(studio_id, input, now).await?;

    // 5. Incremento atômico + excedente, se houver
    let recorded = tracker.record_addition(&mut *store, &state, user_id, today).await?;

    Ok(MaterialCreation::Created(MaterialCreated {
        material,
        quota: recorded.state,
        overage: recorded.overage,
    }))
}

#[derive(Clone)]
pub struct MaterialService {
    material_repo: MaterialRepository,
    manufacturer_repo: ManufacturerRepository,
    tracker: QuotaTracker,
    pool: PgPool,
}

impl MaterialService {
    pub fn new(
        material_repo: MaterialRepository,
        manufacturer_repo: ManufacturerRepository,
        tracker: QuotaTracker,
        pool: PgPool,
    ) -> Self {
        Self { material_repo, manufacturer_repo, tracker, pool }
    }

    /// Cria um material respeitando a cota mensal do estúdio.
    ///
    /// Tudo numa transação. Qualquer erro sai pelo `?` antes do commit
    /// e o drop da transação desfaz o INSERT do material.
    pub async fn create_material(
        &self,
        studio_id: Uuid,
        user_id: Uuid,
        input: &MaterialPayload,
    ) -> Result<MaterialCreation, AppError> {
        let mut tx = self.pool.begin().await?;

        let outcome = {
            let mut store = PgQuotaStore::new(&mut tx);
            create_in_store(&self.tracker, &mut store, studio_id, user_id, input).await?
        };

        // LimitReached também confirma: a correção feita pelo reconcile é válida
        tx.commit().await?;
        Ok(outcome)
    }

    pub async fn list_materials(
        &self,
        studio_id: Uuid,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Material>, AppError> {
        self.material_repo.list_materials(studio_id, category, search).await
    }

    pub async fn get_material(&self, studio_id: Uuid, id: Uuid) -> Result<Material, AppError> {
        self.material_repo
            .find_material(&self.pool, studio_id, id)
            .await?
            .ok_or(AppError::MaterialNotFound)
    }

    // Edição não mexe na cota
    pub async fn update_material(
        &self,
        studio_id: Uuid,
        id: Uuid,
        input: &MaterialPayload,
    ) -> Result<Material, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(manufacturer_id) = input.manufacturer_id {
            self.manufacturer_repo
                .find_manufacturer(&mut *tx, studio_id, manufacturer_id)
                .await?
                .ok_or(AppError::ManufacturerNotFound)?;
        }

        let material = self.material_repo
            .update_material(&mut *tx, studio_id, id, input)
            .await?;

        tx.commit().await?;
        Ok(material)
    }

    pub async fn delete_material(&self, studio_id: Uuid, id: Uuid) -> Result<(), AppError> {
        self.material_repo.delete_material(studio_id, id).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::{
        db::quota_repo::memory::MemoryQuotaStore,
        models::quota::BillingPreference,
    };

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn payload() -> MaterialPayload {
        MaterialPayload {
            name: "Calacatta Oro".into(),
            category: "Pedras".into(),
            subcategory: None,
            manufacturer_id: None,
            notes: None,
            price_per_sqft: None,
            price_per_unit: None,
            unit_type: None,
        }
    }

    // Estúdio starter (limite 100) já com `count` materiais em junho
    fn studio_in_june(count: usize, pref: BillingPreference) -> (MemoryQuotaStore, Uuid) {
        let (mut store, id) = MemoryQuotaStore::with_studio("starter", Some("2024-06"), count as i64, pref);
        store.add_materials(id, at(2024, 6, 2, 10, 0, 0), count);
        store.now = at(2024, 6, 15, 12, 0, 0);
        (store, id)
    }

    // Igual ao service: só "confirma" a cópia de trabalho quando tudo deu certo
    async fn create_committed(
        store: &mut MemoryQuotaStore,
        studio_id: Uuid,
        input: &MaterialPayload,
    ) -> Result<MaterialCreation, AppError> {
        let mut tx = store.clone();
        let outcome = create_in_store(&QuotaTracker::default(), &mut tx, studio_id, Uuid::new_v4(), input).await?;
        *store = tx;
        Ok(outcome)
    }

    #[tokio::test]
    async fn blocked_studio_at_limit_inserts_nothing() {
        let (mut store, id) = studio_in_june(100, BillingPreference::Blocked);

        let outcome = create_committed(&mut store, id, &payload()).await.unwrap();

        let MaterialCreation::LimitReached(state) = outcome else {
            panic!("esperava LimitReached");
        };
        assert_eq!(state.monthly_count, 100);
        assert!(store.inserted.is_empty());
        assert_eq!(store.row(id).current_month_materials, 100);
    }

    #[tokio::test]
    async fn per_material_inserts_counts_and_bills() {
        let (mut store, id) = studio_in_june(100, BillingPreference::PerMaterial);

        let outcome = create_committed(&mut store, id, &payload()).await.unwrap();

        let MaterialCreation::Created(created) = outcome else {
            panic!("esperava Created");
        };
        assert_eq!(created.quota.monthly_count, 101);
        assert_eq!(store.inserted.len(), 1);
        assert_eq!(store.row(id).current_month_materials, 101);
        let overage = created.overage.expect("deveria haver excedente");
        assert_eq!(overage.month_year, "2024-06");
        assert_eq!(overage.overage_count, 1);
    }

    #[tokio::test]
    async fn failed_increment_leaves_no_material_behind() {
        let (mut store, id) = studio_in_june(10, BillingPreference::Blocked);
        store.fail_increment = true;

        let result = create_committed(&mut store, id, &payload()).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
        assert!(store.inserted.is_empty());
        assert_eq!(store.materials.len(), 10);
        assert_eq!(store.row(id).current_month_materials, 10);
    }

    #[tokio::test]
    async fn manufacturer_from_other_studio_is_rejected_before_insert() {
        let (mut store, id) = studio_in_june(0, BillingPreference::Blocked);
        let foreign = Uuid::new_v4();
        store.manufacturers.push((Uuid::new_v4(), foreign));

        let input = MaterialPayload { manufacturer_id: Some(foreign), ..payload() };
        let result = create_committed(&mut store, id, &input).await;

        assert!(matches!(result, Err(AppError::ManufacturerNotFound)));
        assert!(store.inserted.is_empty());
    }

    #[tokio::test]
    async fn month_and_created_at_come_from_the_same_instant() {
        // Maio cheio (limite atingido), relógio da transação já em 1º de junho
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-05"), 100, BillingPreference::PerMaterial);
        store.add_materials(id, at(2024, 5, 20, 9, 0, 0), 100);
        store.now = at(2024, 6, 1, 0, 0, 0);

        let outcome = create_committed(&mut store, id, &payload()).await.unwrap();

        let MaterialCreation::Created(created) = outcome else {
            panic!("esperava Created");
        };
        assert_eq!(created.material.created_at, store.now);
        assert_eq!(created.quota.current_month, "2024-06");
        assert_eq!(created.quota.monthly_count, 1);
        assert!(created.overage.is_none());
        assert!(store.overages.is_empty());

        // O reconcile seguinte concorda com o contador gravado
        let june = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let state = QuotaTracker::default().reconcile(&mut store, id, june).await.unwrap();
        assert_eq!(state.monthly_count, 1);
    }
}
