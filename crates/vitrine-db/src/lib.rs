//! # vitrine-db: Database Layer
//!
//! SQLite persistence for Vitrine through sqlx.
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per entity family
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./vitrine.db")).await?;
//! let company = db.companies().ensure("loja-central", "Loja Central").await?;
//! let products = db.products().search(&company.company_id(), "iphone", 20).await?;
//! ```
//!
//! Every repository method takes the tenant as an explicit `CompanyId`
//! parameter; nothing in this crate holds a current company.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::brand::BrandRepository;
pub use repository::company::CompanyRepository;
pub use repository::customer::CustomerRepository;
pub use repository::fee::PaymentFeeRepository;
pub use repository::model::ModelRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{generate_receipt_number, SaleRepository};
pub use repository::generate_id;
