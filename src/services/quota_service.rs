// src/services/quota_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{calendar::YearMonth, error::AppError},
    db::{
        quota_repo::{PgQuotaStore, QuotaStore},
        NotificationRepository,
    },
    models::{
        notification::NotificationKind,
        quota::{BillingPreference, MaterialOverage, NewOverage, QuotaConfig, QuotaState, QuotaStatus},
    },
};

/// Resultado de `record_addition`.
#[derive(Debug, Clone)]
pub struct RecordedAddition {
    pub state: QuotaState,
    pub overage: Option<MaterialOverage>,
}

// ---
// Regras da cota mensal (independente de banco)
// ---
#[derive(Clone, Default)]
pub struct QuotaTracker {
    config: QuotaConfig,
}

impl QuotaTracker {
    pub fn new(config: QuotaConfig) -> Self {
        Self { config }
    }

    pub fn monthly_limit(&self, raw_tier: &str) -> i64 {
        self.config.limits.monthly_limit(raw_tier)
    }

    /// Recalcula o contador a partir das linhas reais de `materials` do mês corrente
    /// e corrige o cache do estúdio se o mês ou a contagem estiverem diferentes.
    pub async fn reconcile<S>(
        &self,
        store: &mut S,
        studio_id: Uuid,
        today: NaiveDate,
    ) -> Result<QuotaState, AppError>
    where
        S: QuotaStore + ?Sized,
    {
        let row = store
            .load_quota(studio_id)
            .await?
            .ok_or(AppError::StudioNotFound)?;

        let month = YearMonth::from_date(today);
        let month_key = month.to_string();
        let (from, until) = month.bounds();

        // A contagem real sempre vence o valor em cache
        let actual = store.count_materials_between(studio_id, from, until).await?;

        let stale_month = row.current_month.as_deref() != Some(month_key.as_str());
        if stale_month || row.current_month_materials != actual {
            tracing::info!(
                %studio_id,
                stored_month = ?row.current_month,
                stored_count = row.current_month_materials,
                month = %month_key,
                actual,
                "Corrigindo contador mensal de materiais"
            );
            store.store_month_count(studio_id, &month_key, actual).await?;
        }

        Ok(QuotaState {
            studio_id,
            current_month: month_key,
            monthly_count: actual,
            monthly_limit: self.monthly_limit(&row.subscription_tier),
            billing_preference: row.billing_preference,
        })
    }

    /// Conta mais um material no mês. Deve ser chamado depois do INSERT do material,
    /// dentro da mesma transação.
    pub async fn record_addition<S>(
        &self,
        store: &mut S,
        state: &QuotaState,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<RecordedAddition, AppError>
    where
        S: QuotaStore + ?Sized,
    {
        let month_key = YearMonth::from_date(today).to_string();
        let count = store.increment_month_count(state.studio_id, &month_key).await?;

        let new_state = QuotaState {
            current_month: month_key.clone(),
            monthly_count: count,
            ..state.clone()
        };

        let mut overage = None;
        if new_state.billing_preference == BillingPreference::PerMaterial
            && count > new_state.monthly_limit
        {
            let overage_count = new_state.overage_count();
            let total_charge = Decimal::from(overage_count) * self.config.overage_unit_price;

            let row = store
                .upsert_overage(&NewOverage {
                    studio_id: state.studio_id,
                    user_id,
                    month_year: month_key,
                    overage_count,
                    total_charge,
                })
                .await?;

            tracing::info!(
                studio_id = %state.studio_id,
                overage_count,
                %total_charge,
                "Excedente de materiais registrado"
            );
            overage = Some(row);
        }

        Ok(RecordedAddition { state: new_state, overage })
    }

    /// Única forma de liberar um estúdio bloqueado sem mudar o plano.
    pub async fn set_billing_preference<S>(
        &self,
        store: &mut S,
        studio_id: Uuid,
        raw_preference: &str,
    ) -> Result<BillingPreference, AppError>
    where
        S: QuotaStore + ?Sized,
    {
        let preference: BillingPreference = raw_preference.parse()?;

        if !store.store_billing_preference(studio_id, preference).await? {
            return Err(AppError::StudioNotFound);
        }

        Ok(preference)
    }

    pub async fn status<S>(
        &self,
        store: &mut S,
        studio_id: Uuid,
        today: NaiveDate,
    ) -> Result<QuotaStatus, AppError>
    where
        S: QuotaStore + ?Sized,
    {
        let state = self.reconcile(store, studio_id, today).await?;
        let overage = store.find_overage(studio_id, &state.current_month).await?;
        Ok(QuotaStatus::new(state, overage))
    }
}

// ---
// Serviço (lado Postgres)
// ---
#[derive(Clone)]
pub struct QuotaService {
    tracker: QuotaTracker,
    notification_repo: NotificationRepository,
    pool: PgPool,
}

impl QuotaService {
    pub fn new(tracker: QuotaTracker, notification_repo: NotificationRepository, pool: PgPool) -> Self {
        Self { tracker, notification_repo, pool }
    }

    pub async fn get_status(&self, studio_id: Uuid) -> Result<QuotaStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        let status = {
            let mut store = PgQuotaStore::new(&mut tx);
            let today = store.clock().await?.date_naive();
            self.tracker.status(&mut store, studio_id, today).await?
        };

        tx.commit().await?;
        Ok(status)
    }

    pub async fn set_billing_preference(
        &self,
        studio_id: Uuid,
        raw_preference: &str,
    ) -> Result<QuotaStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        let (preference, status) = {
            let mut store = PgQuotaStore::new(&mut tx);
            let today = store.clock().await?.date_naive();
            let preference = self
                .tracker
                .set_billing_preference(&mut store, studio_id, raw_preference)
                .await?;
            (preference, self.tracker.status(&mut store, studio_id, today).await?)
        };

        tx.commit().await?;

        tracing::info!(%studio_id, %preference, "Preferência de cobrança alterada");
        Ok(status)
    }

    /// Opção "pedir upgrade" do aviso de limite: marca `upgrade_pending`
    /// e deixa uma notificação para a equipe comercial.
    pub async fn request_upgrade(
        &self,
        studio_id: Uuid,
        user_id: Uuid,
    ) -> Result<QuotaStatus, AppError> {
        let mut tx = self.pool.begin().await?;

        let status = {
            let mut store = PgQuotaStore::new(&mut tx);
            let today = store.clock().await?.date_naive();
            self.tracker
                .set_billing_preference(&mut store, studio_id, BillingPreference::UpgradePending.as_str())
                .await?;
            self.tracker.status(&mut store, studio_id, today).await?
        };

        let message = format!(
            "Estúdio {} pediu upgrade de plano ({} de {} materiais em {}).",
            studio_id, status.state.monthly_count, status.state.monthly_limit, status.state.current_month
        );
        self.notification_repo
            .create_notification(
                &mut *tx,
                Some(studio_id),
                Some(user_id),
                NotificationKind::UpgradeRequest,
                &message,
            )
            .await?;

        tx.commit().await?;

        tracing::info!(%studio_id, %user_id, "Pedido de upgrade registrado");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone, Utc};

    use super::*;
    use crate::db::quota_repo::memory::MemoryQuotaStore;

    fn june_15() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        Utc.from_utc_datetime(&NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN))
    }

    #[tokio::test]
    async fn professional_tier_has_500_slots() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("professional", Some("2024-06"), 0, BillingPreference::Blocked);
        let state = QuotaTracker::default().reconcile(&mut store, id, june_15()).await.unwrap();
        assert_eq!(state.monthly_limit, 500);
    }

    #[tokio::test]
    async fn reconcile_fixes_drifted_counter() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 42, BillingPreference::Blocked);
        store.add_materials(id, at(2024, 6, 2), 7);
        // Fora da janela: mês anterior e outro estúdio
        store.add_materials(id, at(2024, 5, 31), 3);
        store.add_materials(Uuid::new_v4(), at(2024, 6, 3), 5);

        let state = QuotaTracker::default().reconcile(&mut store, id, june_15()).await.unwrap();

        assert_eq!(state.monthly_count, 7);
        assert_eq!(store.row(id).current_month_materials, 7);
        assert_eq!(store.writes, 1);
    }

    #[tokio::test]
    async fn reconcile_skips_write_when_in_sync() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 2, BillingPreference::Blocked);
        store.add_materials(id, at(2024, 6, 10), 2);

        QuotaTracker::default().reconcile(&mut store, id, june_15()).await.unwrap();

        assert_eq!(store.writes, 0);
    }

    #[tokio::test]
    async fn month_rollover_resets_to_fresh_count() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-05"), 88, BillingPreference::Blocked);
        store.add_materials(id, at(2024, 5, 20), 88);

        let june_first = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let state = QuotaTracker::default().reconcile(&mut store, id, june_first).await.unwrap();

        assert_eq!(state.current_month, "2024-06");
        assert_eq!(state.monthly_count, 0);
        assert_eq!(store.row(id).current_month.as_deref(), Some("2024-06"));
        assert_eq!(store.row(id).current_month_materials, 0);
    }

    #[tokio::test]
    async fn never_initialised_studio_gets_a_month() {
        let (mut store, id) = MemoryQuotaStore::with_studio("starter", None, 0, BillingPreference::Blocked);

        let state = QuotaTracker::default().reconcile(&mut store, id, june_15()).await.unwrap();

        assert_eq!(state.monthly_count, 0);
        assert_eq!(store.row(id).current_month.as_deref(), Some("2024-06"));
    }

    #[tokio::test]
    async fn blocked_starter_at_limit_then_per_material() {
        let tracker = QuotaTracker::default();
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 100, BillingPreference::Blocked);
        store.add_materials(id, at(2024, 6, 1), 100);

        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        assert_eq!(state.monthly_limit, 100);
        assert!(!state.can_add());

        let pref = tracker.set_billing_preference(&mut store, id, "per_material").await.unwrap();
        assert_eq!(pref, BillingPreference::PerMaterial);

        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        assert!(state.can_add());

        // O material entra, depois a cota é registrada
        store.add_materials(id, at(2024, 6, 15), 1);
        let user_id = Uuid::new_v4();
        let added = tracker.record_addition(&mut store, &state, user_id, june_15()).await.unwrap();

        assert_eq!(added.state.monthly_count, 101);
        let overage = added.overage.expect("deveria haver excedente");
        assert_eq!(overage.overage_count, 1);
        assert_eq!(overage.total_charge, Decimal::new(500, 2));
        assert_eq!(overage.month_year, "2024-06");
        assert_eq!(overage.user_id, Some(user_id));
    }

    #[tokio::test]
    async fn record_then_reconcile_is_stable() {
        let tracker = QuotaTracker::default();
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 10, BillingPreference::Blocked);
        store.add_materials(id, at(2024, 6, 3), 10);

        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        store.add_materials(id, at(2024, 6, 15), 1);
        let added = tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap();
        let writes_before = store.writes;

        let again = tracker.reconcile(&mut store, id, june_15()).await.unwrap();

        assert_eq!(again.monthly_count, added.state.monthly_count);
        assert_eq!(again.monthly_count, 11);
        assert_eq!(store.writes, writes_before);
    }

    #[tokio::test]
    async fn overage_row_is_overwritten_per_month() {
        let tracker = QuotaTracker::default();
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 100, BillingPreference::PerMaterial);
        store.add_materials(id, at(2024, 6, 1), 100);
        let user_id = Uuid::new_v4();

        let mut state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        for _ in 0..3 {
            store.add_materials(id, at(2024, 6, 15), 1);
            state = tracker.record_addition(&mut store, &state, user_id, june_15()).await.unwrap().state;
        }

        assert_eq!(store.overages.len(), 1);
        let overage = store.overages.values().next().unwrap();
        assert_eq!(overage.overage_count, 3);
        assert_eq!(overage.total_charge, Decimal::new(1500, 2));
    }

    #[tokio::test]
    async fn no_overage_below_limit_or_without_per_material() {
        let tracker = QuotaTracker::default();

        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 100, BillingPreference::UpgradePending);
        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        store.add_materials(id, at(2024, 6, 15), 1);
        let added = tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap();
        assert!(added.overage.is_none());
        assert!(store.overages.is_empty());

        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 0, BillingPreference::PerMaterial);
        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        let added = tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap();
        assert_eq!(added.state.monthly_count, 1);
        assert!(added.overage.is_none());
    }

    #[tokio::test]
    async fn rejects_unknown_preference_without_writing() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 0, BillingPreference::Blocked);

        let err = QuotaTracker::default()
            .set_billing_preference(&mut store, id, "free_forever")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidBillingPreference(_)));
        assert_eq!(store.writes, 0);
        assert_eq!(store.row(id).billing_preference, BillingPreference::Blocked);
    }

    #[tokio::test]
    async fn unknown_studio_is_reported() {
        let mut store = MemoryQuotaStore::default();
        let tracker = QuotaTracker::default();

        let err = tracker.reconcile(&mut store, Uuid::new_v4(), june_15()).await.unwrap_err();
        assert!(matches!(err, AppError::StudioNotFound));

        let err = tracker
            .set_billing_preference(&mut store, Uuid::new_v4(), "blocked")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StudioNotFound));
    }

    #[tokio::test]
    async fn store_failures_propagate() {
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-05"), 3, BillingPreference::Blocked);
        store.fail_writes = true;
        let tracker = QuotaTracker::default();

        let err = tracker.reconcile(&mut store, id, june_15()).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));

        let state = QuotaState {
            studio_id: id,
            current_month: "2024-06".into(),
            monthly_count: 0,
            monthly_limit: 100,
            billing_preference: BillingPreference::Blocked,
        };
        let err = tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }

    #[tokio::test]
    async fn status_includes_current_overage() {
        let tracker = QuotaTracker::default();
        let (mut store, id) =
            MemoryQuotaStore::with_studio("starter", Some("2024-06"), 100, BillingPreference::PerMaterial);
        store.add_materials(id, at(2024, 6, 1), 100);
        let state = tracker.reconcile(&mut store, id, june_15()).await.unwrap();
        store.add_materials(id, at(2024, 6, 15), 2);
        let state = tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap().state;
        tracker.record_addition(&mut store, &state, Uuid::new_v4(), june_15()).await.unwrap();

        let status = tracker.status(&mut store, id, june_15()).await.unwrap();

        assert_eq!(status.state.monthly_count, 102);
        assert!(status.can_add);
        assert_eq!(status.remaining, 0);
        assert_eq!(status.overage.map(|o| o.overage_count), Some(2));
    }
}
