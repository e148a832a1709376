// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod health;
pub mod leads;
pub mod manufacturers;
pub mod materials;
pub mod projects;
pub mod quota;
