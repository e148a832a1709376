// src/models/quota.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// 1. Plano de Assinatura
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Starter,
    Professional,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Starter => "starter",
            SubscriptionTier::Professional => "professional",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starter" => Ok(SubscriptionTier::Starter),
            "professional" => Ok(SubscriptionTier::Professional),
            "enterprise" => Ok(SubscriptionTier::Enterprise),
            _ => Err(()),
        }
    }
}

/// Tabela plano -> limite mensal de materiais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    pub starter: i64,
    pub professional: i64,
    pub enterprise: i64,
    /// Aplicado quando o plano gravado no estúdio não é reconhecido.
    pub fallback: i64,
}

impl Default for TierLimits {
    fn default() -> Self {
        Self { starter: 100, professional: 500, enterprise: 1500, fallback: 100 }
    }
}

impl TierLimits {
    pub fn limit_for(&self, tier: SubscriptionTier) -> i64 {
        match tier {
            SubscriptionTier::Starter => self.starter,
            SubscriptionTier::Professional => self.professional,
            SubscriptionTier::Enterprise => self.enterprise,
        }
    }

    /// Recebe o valor cru da coluna `studios.subscription_tier`.
    pub fn monthly_limit(&self, raw_tier: &str) -> i64 {
        raw_tier
            .parse::<SubscriptionTier>()
            .map(|tier| self.limit_for(tier))
            .unwrap_or(self.fallback)
    }
}

// ---
// 2. Preferência de Cobrança
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "billing_preference", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillingPreference {
    Blocked,
    UpgradePending,
    PerMaterial,
}

impl BillingPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPreference::Blocked => "blocked",
            BillingPreference::UpgradePending => "upgrade_pending",
            BillingPreference::PerMaterial => "per_material",
        }
    }
}

impl fmt::Display for BillingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingPreference {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocked" => Ok(BillingPreference::Blocked),
            "upgrade_pending" => Ok(BillingPreference::UpgradePending),
            "per_material" => Ok(BillingPreference::PerMaterial),
            other => Err(AppError::InvalidBillingPreference(other.to_string())),
        }
    }
}

// ---
// 3. Configuração da Cota
// ---
#[derive(Debug, Clone)]
pub struct QuotaConfig {
    pub limits: TierLimits,
    /// Preço fixo (USD) por material acima do limite.
    pub overage_unit_price: Decimal,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            limits: TierLimits::default(),
            overage_unit_price: Decimal::new(500, 2),
        }
    }
}

// ---
// 4. Estado da Cota
// ---

// As colunas de `studios` que a cota lê.
#[derive(Debug, Clone, FromRow)]
pub struct StudioQuotaRow {
    pub id: Uuid,
    pub subscription_tier: String,
    pub current_month: Option<String>,
    pub current_month_materials: i64,
    pub billing_preference: BillingPreference,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaState {
    pub studio_id: Uuid,
    #[schema(example = "2024-06")]
    pub current_month: String,
    pub monthly_count: i64,
    pub monthly_limit: i64,
    pub billing_preference: BillingPreference,
}

impl QuotaState {
    /// Bloqueia somente quando a preferência é `blocked` E o limite já foi atingido.
    pub fn can_add(&self) -> bool {
        self.billing_preference != BillingPreference::Blocked
            || self.monthly_count < self.monthly_limit
    }

    pub fn overage_count(&self) -> i64 {
        (self.monthly_count - self.monthly_limit).max(0)
    }
}

// ---
// 5. Excedente (material_overages)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOverage {
    pub id: Uuid,
    pub studio_id: Uuid,
    pub user_id: Option<Uuid>,
    #[schema(example = "2024-06")]
    pub month_year: String,
    pub overage_count: i64,
    #[schema(value_type = f64, example = 5.0)]
    pub total_charge: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOverage {
    pub studio_id: Uuid,
    pub user_id: Uuid,
    pub month_year: String,
    pub overage_count: i64,
    pub total_charge: Decimal,
}

// Resposta do GET /api/quota
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStatus {
    #[serde(flatten)]
    pub state: QuotaState,
    pub can_add: bool,
    pub remaining: i64,
    pub overage: Option<MaterialOverage>,
}

impl QuotaStatus {
    pub fn new(state: QuotaState, overage: Option<MaterialOverage>) -> Self {
        Self {
            can_add: state.can_add(),
            remaining: (state.monthly_limit - state.monthly_count).max(0),
            state,
            overage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(count: i64, limit: i64, pref: BillingPreference) -> QuotaState {
        QuotaState {
            studio_id: Uuid::new_v4(),
            current_month: "2024-06".into(),
            monthly_count: count,
            monthly_limit: limit,
            billing_preference: pref,
        }
    }

    #[test]
    fn tier_table_matches_plans() {
        let limits = TierLimits::default();
        assert_eq!(limits.monthly_limit("starter"), 100);
        assert_eq!(limits.monthly_limit("professional"), 500);
        assert_eq!(limits.monthly_limit("enterprise"), 1500);
    }

    #[test]
    fn unknown_tier_uses_fallback() {
        let limits = TierLimits::default();
        assert_eq!(limits.monthly_limit("platinum"), 100);
        assert_eq!(limits.monthly_limit(""), 100);
    }

    #[test]
    fn can_add_is_false_only_when_blocked_and_at_limit() {
        use BillingPreference::*;
        for pref in [Blocked, UpgradePending, PerMaterial] {
            for count in [0, 99, 100, 150] {
                let expected = !(pref == Blocked && count >= 100);
                assert_eq!(state(count, 100, pref).can_add(), expected, "{pref} / {count}");
            }
        }
    }

    #[test]
    fn overage_never_goes_negative() {
        assert_eq!(state(40, 100, BillingPreference::PerMaterial).overage_count(), 0);
        assert_eq!(state(103, 100, BillingPreference::PerMaterial).overage_count(), 3);
    }

    #[test]
    fn parses_billing_preferences() {
        assert_eq!("per_material".parse::<BillingPreference>().unwrap(), BillingPreference::PerMaterial);
        assert!(matches!(
            "free".parse::<BillingPreference>(),
            Err(AppError::InvalidBillingPreference(v)) if v == "free"
        ));
    }

    #[test]
    fn status_reports_remaining_slots() {
        let status = QuotaStatus::new(state(97, 100, BillingPreference::Blocked), None);
        assert!(status.can_add);
        assert_eq!(status.remaining, 3);

        let full = QuotaStatus::new(state(120, 100, BillingPreference::Blocked), None);
        assert!(!full.can_add);
        assert_eq!(full.remaining, 0);
    }
}
