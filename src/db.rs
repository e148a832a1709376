pub mod user_repo;
pub use user_repo::UserRepository;
pub mod studio_repo;
pub use studio_repo::StudioRepository;
pub mod material_repo;
pub use material_repo::MaterialRepository;
pub mod manufacturer_repo;
pub use manufacturer_repo::ManufacturerRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod quota_repo;
