// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,

        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Leads ---
        handlers::leads::create_lead,

        // --- Materials ---
        handlers::materials::create_material,
        handlers::materials::list_materials,
        handlers::materials::get_material,
        handlers::materials::update_material,
        handlers::materials::delete_material,

        // --- Manufacturers ---
        handlers::manufacturers::list_manufacturers,
        handlers::manufacturers::create_manufacturer,
        handlers::manufacturers::update_manufacturer,
        handlers::manufacturers::delete_manufacturer,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::list_project_materials,
        handlers::projects::link_material,
        handlers::projects::unlink_material,

        // --- Quota ---
        handlers::quota::get_quota,
        handlers::quota::set_billing_preference,
        handlers::quota::request_upgrade,

        // --- Admin ---
        handlers::admin::list_studios,
        handlers::admin::create_studio,
        handlers::admin::get_studio,
        handlers::admin::update_studio,
        handlers::admin::delete_studio,
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::update_user,
        handlers::admin::delete_user,
        handlers::admin::list_notifications,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,

            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,

            // --- Studios / Quota ---
            models::studio::Studio,
            models::studio::CreateStudioPayload,
            models::studio::UpdateStudioPayload,
            models::quota::SubscriptionTier,
            models::quota::BillingPreference,
            models::quota::QuotaState,
            models::quota::QuotaStatus,
            models::quota::MaterialOverage,
            handlers::quota::BillingPreferencePayload,

            // --- Catálogo ---
            models::material::Material,
            models::material::MaterialPayload,
            models::material::MaterialCreated,
            models::manufacturer::Manufacturer,
            models::manufacturer::ManufacturerPayload,

            // --- Projects ---
            models::project::ProjectStatus,
            models::project::Project,
            models::project::ProjectPayload,
            models::project::ProjectMaterial,
            models::project::ProjectMaterialEntry,
            models::project::LinkMaterialPayload,

            // --- Leads / Notificações ---
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            models::notification::Notification,
        )
    ),
    tags(
        (name = "Health", description = "Status da API"),
        (name = "Auth", description = "Autenticação e Cadastro de Estúdio"),
        (name = "Users", description = "Dados do Usuário"),
        (name = "Leads", description = "Lista de Espera do Site"),
        (name = "Materials", description = "Biblioteca de Materiais do Estúdio"),
        (name = "Manufacturers", description = "Fabricantes e Fornecedores"),
        (name = "Projects", description = "Projetos e Especificação de Materiais"),
        (name = "Quota", description = "Cota Mensal de Materiais e Cobrança"),
        (name = "Admin", description = "Painel Administrativo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_quota_routes_and_jwt_scheme() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/quota"));
        assert!(doc.paths.paths.contains_key("/api/quota/billing-preference"));
        assert!(doc.paths.paths.contains_key("/api/materials/{id}"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
