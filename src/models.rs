pub mod auth;
pub mod lead;
pub mod manufacturer;
pub mod material;
pub mod notification;
pub mod project;
pub mod quota;
pub mod studio;
