//! # Domain Types
//!
//! Core domain types for the catalog and the POS.
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - a business key where one exists (slug, receipt_number, EAN/IMEI)
//!
//! ## Tenant Context
//! Persistent entities carry a `company_id`. The tenant is never a global;
//! it is resolved once at startup and threaded through calls as a
//! [`CompanyId`] parameter.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryMode;

// =============================================================================
// Company (tenant context)
// =============================================================================

/// Resolved tenant identifier, passed explicitly to every repository call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyId(String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Self {
        CompanyId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store account. Single-store deployments have exactly one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Company {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// The typed tenant handle repositories expect.
    pub fn company_id(&self) -> CompanyId {
        CompanyId::new(self.id.clone())
    }
}

// =============================================================================
// Brand / Model
// =============================================================================

/// A phone brand (Apple, Samsung, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Brand {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub slug: String,
    /// Soft-delete flag; inactive brands are hidden from the catalog.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phone model under a brand.
///
/// `template_specs` holds a JSON object of default field values that are
/// copied onto new products created from this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PhoneModel {
    pub id: String,
    pub company_id: String,
    pub brand_id: String,
    pub name: String,
    pub slug: String,
    pub template_specs: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhoneModel {
    /// Parses the template-spec JSON. A malformed template behaves as empty.
    pub fn template_map(&self) -> HashMap<String, String> {
        serde_json::from_str(&self.template_specs).unwrap_or_default()
    }
}

/// Merges model template values under a product's own specs.
/// Product values always win; template only fills the gaps.
pub fn merge_template_specs(
    own: &HashMap<String, String>,
    template: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = template.clone();
    for (k, v) in own {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

// =============================================================================
// Product
// =============================================================================

/// Product condition. Controls image sharing: new (sealed) units share
/// images by (model, color); used units carry their own image list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    Used,
}

impl Condition {
    /// Label used in the catalog export ("lacrado" = sealed).
    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "lacrado",
            Condition::Used => "seminovo",
        }
    }
}

/// A sellable unit in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,
    pub company_id: String,
    pub brand_id: String,
    pub model_id: String,
    /// Display name shown in the console and on receipts.
    pub name: String,
    /// Barcode (EAN-13), used for scanner lookup and auto-fill.
    pub ean: Option<String>,
    /// Device identifier, unique per unit.
    pub imei: Option<String>,
    pub serial_number: Option<String>,
    pub color: Option<String>,
    /// Storage capacity label ("128GB").
    pub storage: Option<String>,
    pub condition: Condition,
    /// Acquisition cost in centavos (for profit calculations).
    pub cost_cents: i64,
    /// Customer-facing price in centavos.
    pub retail_price_cents: i64,
    pub reseller_price_cents: Option<i64>,
    pub wholesale_price_cents: Option<i64>,
    /// Spec map as a JSON object (screen, battery health, ...).
    pub specs: String,
    /// Own image list as a JSON array; authoritative for used units only.
    pub image_urls: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Parses the spec JSON. A malformed value behaves as empty.
    pub fn specs_map(&self) -> HashMap<String, String> {
        serde_json::from_str(&self.specs).unwrap_or_default()
    }

    /// Parses the own image list.
    pub fn own_images(&self) -> Vec<String> {
        serde_json::from_str(&self.image_urls).unwrap_or_default()
    }

    /// Whether this unit's images come from the shared (model, color) set.
    pub fn uses_shared_images(&self) -> bool {
        self.condition == Condition::New
    }
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub company_id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale. Checkout creates sales already completed; voiding
/// flips the flag without deleting history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Voided,
}

/// A persisted sale. Totals are always produced by the checkout engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    pub company_id: String,
    pub receipt_number: String,
    pub customer_id: Option<String>,
    pub status: SaleStatus,
    pub delivery_mode: DeliveryMode,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub delivery_store_cents: i64,
    pub delivery_customer_cents: i64,
    pub total_cents: i64,
    pub cost_cents: i64,
    pub profit_cents: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Unit cost in centavos at time of sale (frozen).
    pub unit_cost_cents: i64,
    /// Per-unit discount in centavos.
    pub discount_cents: i64,
    /// Gift lines total zero regardless of price or discount.
    pub is_gift: bool,
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payments
// =============================================================================

/// Accepted payment methods. `Money` is physical cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Money,
    Pix,
    Debit,
    Credit,
}

impl PaymentMethod {
    /// Label used in receipts and the catalog export.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Money => "Dinheiro",
            PaymentMethod::Pix => "PIX",
            PaymentMethod::Debit => "Débito",
            PaymentMethod::Credit => "Crédito",
        }
    }
}

/// A payment towards a sale. A sale can have multiple payments for split
/// tender; fee columns are populated for installment credit payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalePayment {
    pub id: String,
    pub sale_id: String,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub installments: Option<i64>,
    pub applied_fee_bps: Option<i64>,
    pub fee_cents: Option<i64>,
    pub total_with_fee_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl SalePayment {
    /// The amount this payment settles: total with fee when present,
    /// plain amount otherwise.
    pub fn settled_cents(&self) -> i64 {
        self.total_with_fee_cents.unwrap_or(self.amount_cents)
    }
}

/// A merchant-configured fee row, keyed by (method, installment count).
///
/// `operator_fee_bps` is the real cost charged by the payment processor;
/// `applied_fee_bps` is the customer-facing surcharge. The invariant
/// `applied >= operator` is enforced by validation and by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentFee {
    pub id: String,
    pub company_id: String,
    pub method: PaymentMethod,
    pub installments: i64,
    pub operator_fee_bps: i64,
    pub applied_fee_bps: i64,
    pub updated_at: DateTime<Utc>,
}

impl PaymentFee {
    /// Store margin on the surcharge, in basis points.
    pub fn margin_bps(&self) -> i64 {
        self.applied_fee_bps - self.operator_fee_bps
    }
}

// =============================================================================
// Delivery credit
// =============================================================================

/// One row per delivered sale, recording how the delivery cost was split.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryCredit {
    pub id: String,
    pub company_id: String,
    pub sale_id: String,
    pub mode: DeliveryMode,
    pub store_cents: i64,
    pub customer_cents: i64,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Images / storage options
// =============================================================================

/// Shared image set for new (sealed) units, keyed by (model, color).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ModelColorImages {
    pub id: String,
    pub company_id: String,
    pub model_id: String,
    pub color: String,
    pub image_urls: String,
    pub updated_at: DateTime<Utc>,
}

impl ModelColorImages {
    pub fn images(&self) -> Vec<String> {
        serde_json::from_str(&self.image_urls).unwrap_or_default()
    }
}

/// A storage capacity option offered by the product-entry form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StorageOption {
    pub id: String,
    pub label: String,
    pub sort_order: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_merge_product_wins() {
        let mut own = HashMap::new();
        own.insert("color".to_string(), "blue".to_string());

        let mut template = HashMap::new();
        template.insert("color".to_string(), "black".to_string());
        template.insert("screen".to_string(), "6.1\"".to_string());

        let merged = merge_template_specs(&own, &template);
        assert_eq!(merged.get("color").map(String::as_str), Some("blue"));
        assert_eq!(merged.get("screen").map(String::as_str), Some("6.1\""));
    }

    #[test]
    fn test_malformed_template_behaves_as_empty() {
        let model = PhoneModel {
            id: "m1".to_string(),
            company_id: "c1".to_string(),
            brand_id: "b1".to_string(),
            name: "Galaxy S24".to_string(),
            slug: "galaxy-s24".to_string(),
            template_specs: "not json".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(model.template_map().is_empty());
    }

    #[test]
    fn test_settled_cents_falls_back_to_amount() {
        let payment = SalePayment {
            id: "p1".to_string(),
            sale_id: "s1".to_string(),
            method: PaymentMethod::Pix,
            amount_cents: 20_000,
            installments: None,
            applied_fee_bps: None,
            fee_cents: None,
            total_with_fee_cents: None,
            created_at: Utc::now(),
        };
        assert_eq!(payment.settled_cents(), 20_000);

        let with_fee = SalePayment {
            total_with_fee_cents: Some(20_900),
            ..payment
        };
        assert_eq!(with_fee.settled_cents(), 20_900);
    }

    #[test]
    fn test_fee_margin() {
        let fee = PaymentFee {
            id: "f1".to_string(),
            company_id: "c1".to_string(),
            method: PaymentMethod::Credit,
            installments: 6,
            operator_fee_bps: 550,
            applied_fee_bps: 800,
            updated_at: Utc::now(),
        };
        assert_eq!(fee.margin_bps(), 250);
    }

    #[test]
    fn test_shared_images_only_for_new() {
        let product = Product {
            id: "p1".to_string(),
            company_id: "c1".to_string(),
            brand_id: "b1".to_string(),
            model_id: "m1".to_string(),
            name: "iPhone 13 128GB".to_string(),
            ean: None,
            imei: None,
            serial_number: None,
            color: Some("midnight".to_string()),
            storage: Some("128GB".to_string()),
            condition: Condition::New,
            cost_cents: 250_000,
            retail_price_cents: 320_000,
            reseller_price_cents: None,
            wholesale_price_cents: None,
            specs: "{}".to_string(),
            image_urls: "[]".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.uses_shared_images());

        let used = Product {
            condition: Condition::Used,
            ..product
        };
        assert!(!used.uses_shared_images());
    }
}
