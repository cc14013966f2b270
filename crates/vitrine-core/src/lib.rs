//! # vitrine-core: Pure Business Logic
//!
//! The heart of Vitrine: every business calculation as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/server (axum API)                   │
//! │   catalog CRUD · POS checkout · fees · catalog export    │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼──────────────────────────────┐
//! │              ★ vitrine-core (THIS CRATE) ★               │
//! │                                                          │
//! │   types · money · checkout · fees · delivery · export    │
//! │                                                          │
//! │   NO I/O · NO DATABASE · NO NETWORK · PURE FUNCTIONS     │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//! ┌───────────────────────────▼──────────────────────────────┐
//! │              vitrine-db (SQLite repositories)            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Brand, Product, Sale, PaymentFee, ...)
//! - [`money`] - Integer-centavo money and BRL formatting
//! - [`checkout`] - The unified sale-calculation engine
//! - [`fees`] - Fee table and installment calculator
//! - [`delivery`] - Delivery-cost splitting
//! - [`export`] - WhatsApp catalog and receipt text rendering
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output
//! 2. **Integer money**: all monetary values are centavos (i64)
//! 3. **Explicit errors**: typed errors, never strings or panics
//! 4. **One engine**: all sale arithmetic goes through [`checkout`]

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod delivery;
pub mod error;
pub mod export;
pub mod fees;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{reconcile, Reconciliation, SaleLine, SaleTotals};
pub use delivery::{DeliveryMode, DeliverySplit, DEFAULT_DELIVERY_COST_CENTS};
pub use error::{CoreError, CoreResult, ValidationError};
pub use fees::{FeeTable, InstallmentQuote};
pub use money::{format_brl, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line in a sale.
/// Prevents accidental over-entry (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum installment count accepted by the fee table.
pub const MAX_INSTALLMENTS: i64 = 24;
