// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        LeadRepository, ManufacturerRepository, MaterialRepository, NotificationRepository,
        ProjectRepository, StudioRepository, UserRepository,
    },
    models::quota::QuotaConfig,
    services::{
        auth::AuthService, lead_service::LeadService, material_service::MaterialService,
        project_service::ProjectService, quota_service::{QuotaService, QuotaTracker},
        studio_service::StudioService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

// Configurações lidas do ambiente (.env)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| DEFAULT_SERVER_ADDR.to_string());
        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS inválido: {raw}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self { database_url, jwt_secret, server_addr, max_connections })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub studio_repo: StudioRepository,
    pub user_repo: UserRepository,
    pub manufacturer_repo: ManufacturerRepository,
    pub notification_repo: NotificationRepository,

    pub auth_service: AuthService,
    pub studio_service: StudioService,
    pub material_service: MaterialService,
    pub project_service: ProjectService,
    pub quota_service: QuotaService,
    pub lead_service: LeadService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, config.jwt_secret.clone()))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let studio_repo = StudioRepository::new(db_pool.clone());
        let user_repo = UserRepository::new(db_pool.clone());
        let material_repo = MaterialRepository::new(db_pool.clone());
        let manufacturer_repo = ManufacturerRepository::new(db_pool.clone());
        let project_repo = ProjectRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let tracker = QuotaTracker::new(QuotaConfig::default());

        let auth_service = AuthService::new(
            user_repo.clone(),
            studio_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let studio_service = StudioService::new(studio_repo.clone(), tracker.clone(), db_pool.clone());
        let material_service = MaterialService::new(
            material_repo.clone(),
            manufacturer_repo.clone(),
            tracker.clone(),
            db_pool.clone(),
        );
        let project_service = ProjectService::new(project_repo, material_repo, db_pool.clone());
        let quota_service = QuotaService::new(tracker, notification_repo.clone(), db_pool.clone());
        let lead_service = LeadService::new(LeadRepository::new(), notification_repo.clone(), db_pool.clone());

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            studio_repo,
            user_repo,
            manufacturer_repo,
            notification_repo,
            auth_service,
            studio_service,
            material_service,
            project_service,
            quota_service,
            lead_service,
        }
    }
}
