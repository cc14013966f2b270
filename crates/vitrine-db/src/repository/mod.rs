//! # Repositories
//!
//! One repository per entity family. Every method takes the tenant as an
//! explicit [`vitrine_core::CompanyId`] parameter; there is no ambient
//! "current company" anywhere in this crate.

pub mod brand;
pub mod company;
pub mod customer;
pub mod fee;
pub mod model;
pub mod product;
pub mod sale;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
