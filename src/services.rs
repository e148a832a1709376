pub mod auth;
pub mod lead_service;
pub mod material_service;
pub mod project_service;
pub mod quota_service;
pub mod studio_service;
