// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, tenancy::studio_guard};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Sem configuração válida a aplicação não sobe
    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Só autenticação
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Autenticação + estúdio resolvido (o último layer roda primeiro)
    let studio_routes = Router::new()
        .route(
            "/api/materials",
            post(handlers::materials::create_material).get(handlers::materials::list_materials),
        )
        .route(
            "/api/materials/{id}",
            get(handlers::materials::get_material)
                .put(handlers::materials::update_material)
                .delete(handlers::materials::delete_material),
        )
        .route(
            "/api/manufacturers",
            post(handlers::manufacturers::create_manufacturer)
                .get(handlers::manufacturers::list_manufacturers),
        )
        .route(
            "/api/manufacturers/{id}",
            put(handlers::manufacturers::update_manufacturer)
                .delete(handlers::manufacturers::delete_manufacturer),
        )
        .route(
            "/api/projects",
            post(handlers::projects::create_project).get(handlers::projects::list_projects),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/materials",
            get(handlers::projects::list_project_materials).post(handlers::projects::link_material),
        )
        .route(
            "/api/projects/{id}/materials/{material_id}",
            delete(handlers::projects::unlink_material),
        )
        .route("/api/quota", get(handlers::quota::get_quota))
        .route("/api/quota/billing-preference", put(handlers::quota::set_billing_preference))
        .route("/api/quota/upgrade-request", post(handlers::quota::request_upgrade))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), studio_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Autenticação; o papel é conferido em cada handler (RequireRole<AdminOnly>)
    let admin_routes = Router::new()
        .route(
            "/studios",
            get(handlers::admin::list_studios).post(handlers::admin::create_studio),
        )
        .route(
            "/studios/{id}",
            get(handlers::admin::get_studio)
                .put(handlers::admin::update_studio)
                .delete(handlers::admin::delete_studio),
        )
        .route(
            "/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/users/{id}",
            put(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        .route("/notifications", get(handlers::admin::list_notifications))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(handlers::health::health))
        .route("/api/leads", post(handlers::leads::create_lead))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .merge(studio_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
